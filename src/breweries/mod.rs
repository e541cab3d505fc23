//! Brewery records: paging them out of the API and shaping them for the raw
//! table and snapshot files.

mod extractor;
mod record;
pub mod snapshot;

pub use extractor::BreweriesExtractor;
pub use record::{
    INGESTED_AT_COLUMN, PREFERRED_COLUMNS, RawRowBuilder, SOURCE_COLUMN, SOURCE_TAG, column_order,
    flatten,
};

/// One fetched entity as a flat key/value mapping
pub type Record = serde_json::Map<String, serde_json::Value>;
