//! Raw-table row shaping
//!
//! Flattens nested keys, stamps ingestion metadata and decides column order.

use super::Record;
use crate::etl::Transformer;

use chrono::{DateTime, SecondsFormat, Utc};
use eyre::Result;
use serde_json::Value;
use std::collections::HashSet;

pub const SOURCE_TAG: &str = "openbrewerydb";
pub const INGESTED_AT_COLUMN: &str = "ingested_at_utc";
pub const SOURCE_COLUMN: &str = "source";

/// Columns placed first in the raw table, when present
pub const PREFERRED_COLUMNS: [&str; 18] = [
    "id",
    "name",
    "brewery_type",
    "address_1",
    "address_2",
    "address_3",
    "city",
    "state_province",
    "postal_code",
    "country",
    "longitude",
    "latitude",
    "phone",
    "website_url",
    // deprecated upstream, still present in some payloads
    "state",
    "street",
    INGESTED_AT_COLUMN,
    SOURCE_COLUMN,
];

/// Flatten nested objects into dotted keys (`{"a": {"b": 1}}` → `a.b`)
///
/// Arrays and scalars are kept as-is. Key order follows the input.
pub fn flatten(record: Record) -> Record {
    let mut out = Record::new();
    flatten_into(&mut out, None, record);
    out
}

fn flatten_into(out: &mut Record, prefix: Option<&str>, record: Record) {
    for (key, value) in record {
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };
        match value {
            Value::Object(inner) => flatten_into(out, Some(&key), inner),
            other => {
                out.insert(key, other);
            }
        }
    }
}

/// Column order for a batch of rows
///
/// Preferred columns that occur in any row come first, in the fixed order
/// above; every other column follows in first-seen order.
pub fn column_order(rows: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let encountered: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.keys())
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect();

    let preferred = PREFERRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| seen.contains(column));
    let rest = encountered
        .iter()
        .copied()
        .filter(|column| !PREFERRED_COLUMNS.contains(column));

    preferred.chain(rest).map(str::to_string).collect()
}

/// Turns fetched records into raw-table rows
///
/// Each row is flattened and gets `ingested_at_utc` (one timestamp for the
/// whole run, second precision) and `source`.
///
/// # Example
/// ```
/// use brewery_etl::breweries::{RawRowBuilder, Record};
/// use brewery_etl::etl::Transformer;
/// use serde_json::json;
///
/// let builder = RawRowBuilder::at("2024-05-01T12:00:00Z".parse().unwrap());
/// let input: Record = json!({"id": "b-1", "geo": {"lat": 1.5}})
///     .as_object()
///     .unwrap()
///     .clone();
///
/// let row = builder.transform(input).unwrap();
/// assert_eq!(row["geo.lat"], 1.5);
/// assert_eq!(row["ingested_at_utc"], "2024-05-01T12:00:00+00:00");
/// assert_eq!(row["source"], "openbrewerydb");
/// ```
pub struct RawRowBuilder {
    ingested_at: String,
    source: String,
}

impl RawRowBuilder {
    /// Stamp rows with the given capture time, truncated to whole seconds
    pub fn at(ingested_at: DateTime<Utc>) -> Self {
        Self {
            ingested_at: ingested_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            source: SOURCE_TAG.to_string(),
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn ingested_at(&self) -> &str {
        &self.ingested_at
    }
}

impl Transformer for RawRowBuilder {
    type Input = Record;
    type Output = Record;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let mut row = flatten(input);
        row.insert(
            INGESTED_AT_COLUMN.to_string(),
            Value::String(self.ingested_at.clone()),
        );
        row.insert(SOURCE_COLUMN.to_string(), Value::String(self.source.clone()));
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flatten_nested_keys() {
        let flat = flatten(record(json!({
            "id": "x",
            "location": {"geo": {"lat": 1.0, "lon": 2.0}, "city": "Bend"},
            "tags": ["ipa", "stout"]
        })));

        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["id", "location.geo.lat", "location.geo.lon", "location.city", "tags"]
        );
        assert_eq!(flat["tags"], json!(["ipa", "stout"]));
    }

    #[test]
    fn test_flatten_leaves_flat_records_alone() {
        let input = record(json!({"id": "1", "name": "Flat", "latitude": null}));
        assert_eq!(flatten(input.clone()), input);
    }

    #[test]
    fn test_builder_adds_metadata() {
        let builder = RawRowBuilder::at("2024-05-01T12:34:56.789Z".parse().unwrap());
        let row = builder.transform(record(json!({"id": "1"}))).unwrap();

        assert_eq!(row["ingested_at_utc"], "2024-05-01T12:34:56+00:00");
        assert_eq!(row["source"], "openbrewerydb");
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_column_order_preferred_first() {
        let rows = vec![
            record(json!({"zeta": 1, "city": "Bend", "id": "1", "source": "s"})),
            record(json!({"name": "Two", "alpha": 2, "ingested_at_utc": "t"})),
        ];

        assert_eq!(
            column_order(&rows),
            vec!["id", "name", "city", "ingested_at_utc", "source", "zeta", "alpha"]
        );
    }

    #[test]
    fn test_column_order_keeps_every_column() {
        let rows = vec![
            record(json!({"b": 1, "a": 2})),
            record(json!({"c": 3, "a": 4})),
        ];
        let columns = column_order(&rows);
        assert_eq!(columns, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_column_order_empty_batch() {
        assert!(column_order(&[]).is_empty());
    }
}
