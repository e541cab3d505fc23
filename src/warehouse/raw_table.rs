//! Raw table loader

use super::{quote_ident, table_exists};
use crate::breweries::{PREFERRED_COLUMNS, Record, column_order};
use crate::error::{EtlError, Result};
use crate::etl::Loader;

use eyre::Context;
use owo_colors::OwoColorize;
use rusqlite::{Connection, params_from_iter, types::Value as SqlValue};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// How a batch merges with an existing raw table
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LoadMode {
    /// Insert after existing rows, creating the table if needed
    Append,
    /// Drop and recreate the table
    Replace,
    /// Refuse to touch an existing table
    Fail,
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Replace => write!(f, "replace"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Loads flattened rows into a single SQLite table
///
/// The database file (and its parent directory) is created if absent. All
/// inserts for one load run in a single transaction.
///
/// # Example
/// ```no_run
/// use brewery_etl::warehouse::{LoadMode, RawTableLoader};
///
/// # fn example(rows: Vec<brewery_etl::breweries::Record>) -> brewery_etl::error::Result<()> {
/// let loader = RawTableLoader::new("data/breweries.db", "raw_breweries", LoadMode::Replace);
/// let inserted = loader.load_rows(&rows)?;
/// # Ok(())
/// # }
/// ```
pub struct RawTableLoader {
    db_path: PathBuf,
    table: String,
    mode: LoadMode,
}

impl RawTableLoader {
    pub fn new(db_path: impl AsRef<Path>, table: impl Into<String>, mode: LoadMode) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            table: table.into(),
            mode,
        }
    }

    /// Write `rows` according to the load mode and return the number inserted
    pub fn load_rows(&self, rows: &[Record]) -> Result<usize> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }

        let columns = table_columns(rows);

        log::info!(
            "Loading {} row(s) into {} (table={}, mode={})",
            rows.len(),
            self.db_path.display().bright_black(),
            self.table.cyan(),
            self.mode
        );

        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;
        let exists = table_exists(&tx, &self.table)?;
        let table = quote_ident(&self.table);

        match (self.mode, exists) {
            (LoadMode::Fail, true) => return Err(EtlError::TableExists(self.table.clone())),
            (LoadMode::Append, true) => add_missing_columns(&tx, &self.table, &columns, rows)?,
            (LoadMode::Replace, true) => {
                log::debug!("Dropping existing table {}", self.table);
                tx.execute_batch(&format!("DROP TABLE {}", table))?;
                create_table(&tx, &self.table, &columns, rows)?;
            }
            (_, false) => create_table(&tx, &self.table, &columns, rows)?,
        }

        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table, column_list, placeholders
        );

        {
            let mut stmt = tx.prepare(&insert)?;
            for row in rows {
                stmt.execute(params_from_iter(
                    columns.iter().map(|c| to_sql_value(row.get(c))),
                ))?;
            }
        }
        tx.commit()?;

        Ok(rows.len())
    }
}

impl Loader for RawTableLoader {
    type Item = Record;

    async fn load(&self, items: Vec<Self::Item>) -> eyre::Result<usize> {
        self.load_rows(&items)
            .with_context(|| format!("Failed to load raw table '{}'", self.table))
    }
}

/// Every preferred column, present in the batch or not, then any other
/// columns in encounter order
///
/// The staging script reads the preferred columns by name, so they exist even
/// when a payload omits them or the batch is empty.
fn table_columns(rows: &[Record]) -> Vec<String> {
    let extras = column_order(rows)
        .into_iter()
        .filter(|column| !PREFERRED_COLUMNS.contains(&column.as_str()));
    PREFERRED_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(extras)
        .collect()
}

fn create_table(conn: &Connection, table: &str, columns: &[String], rows: &[Record]) -> Result<()> {
    let definitions = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c), column_affinity(rows, c)))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute_batch(&format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        definitions
    ))?;
    Ok(())
}

/// Add columns present in the batch but missing from an existing table
fn add_missing_columns(
    conn: &Connection,
    table: &str,
    columns: &[String],
    rows: &[Record],
) -> Result<()> {
    let existing: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")?
        .query_map([table], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    for column in columns.iter().filter(|c| !existing.contains(c)) {
        log::debug!("Adding column {} to {}", column, table);
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(table),
            quote_ident(column),
            column_affinity(rows, column)
        ))?;
    }
    Ok(())
}

/// Best-effort SQL type for a column, judged from every non-null value
fn column_affinity(rows: &[Record], column: &str) -> &'static str {
    let mut any_value = false;
    let mut any_real = false;

    for value in rows.iter().filter_map(|row| row.get(column)) {
        match value {
            Value::Null => continue,
            Value::Bool(_) => {}
            Value::Number(n) if n.is_i64() => {}
            Value::Number(_) => any_real = true,
            _ => return "TEXT",
        }
        any_value = true;
    }

    match (any_value, any_real) {
        (false, _) => "TEXT",
        (true, true) => "REAL",
        (true, false) => "INTEGER",
    }
}

fn to_sql_value(value: Option<&Value>) -> SqlValue {
    match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Some(Value::String(s)) => SqlValue::Text(s.clone()),
        Some(other) => SqlValue::Text(other.to_string()),
    }
}
