//! Flat-file export of warehouse tables

use super::{quote_ident, require_database};
use crate::config::ExportConfig;
use crate::error::{EtlError, Result};

use base64::Engine;
use owo_colors::OwoColorize;
use rusqlite::{Connection, OpenFlags, types::Value as SqlValue};
use std::path::{Path, PathBuf};

/// Output file format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// One written export file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedTable {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// List user tables (and optionally views), ordered by kind then name
///
/// SQLite's internal `sqlite_%` tables are never included.
pub fn list_tables(conn: &Connection, include_views: bool) -> Result<Vec<String>> {
    let kinds = if include_views {
        "'table', 'view'"
    } else {
        "'table'"
    };
    let sql = format!(
        "SELECT name FROM sqlite_master \
         WHERE type IN ({}) AND name NOT LIKE 'sqlite_%' \
         ORDER BY type, name",
        kinds
    );

    let names = conn
        .prepare(&sql)?
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// File-system-safe stem for a table name
pub fn safe_filename(name: &str) -> String {
    name.replace(['/', '\\', ' '], "_")
}

/// Writes one file per table from an existing database
///
/// # Example
/// ```no_run
/// use brewery_etl::config::ExportConfig;
/// use brewery_etl::warehouse::TableExporter;
///
/// # fn example() -> brewery_etl::error::Result<()> {
/// let config = ExportConfig {
///     tables: vec!["dim_brewery".to_string()],
///     ..ExportConfig::default()
/// };
/// for exported in TableExporter::new(config).export()? {
///     println!("{} -> {} ({} rows)", exported.table, exported.path.display(), exported.rows);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TableExporter {
    config: ExportConfig,
}

impl TableExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Export the requested tables, or every table when none were requested
    ///
    /// # Errors
    /// - `NotFound` if the database file is missing
    /// - `Request` if any requested table does not exist; nothing is written
    pub fn export(&self) -> Result<Vec<ExportedTable>> {
        let config = &self.config;
        require_database(&config.db_path)?;

        let conn = Connection::open_with_flags(
            &config.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let available = list_tables(&conn, config.include_views)?;
        let targets = self.resolve_targets(&available)?;

        std::fs::create_dir_all(&config.out_dir)
            .map_err(|e| EtlError::io(&config.out_dir, e))?;

        log::info!("DB: {}", config.db_path.display().bright_black());
        log::info!("Export dir: {}", config.out_dir.display().bright_black());
        log::info!("Tables to export ({}): {:?}", targets.len(), targets);
        log::info!("Format: {}", config.format);

        let mut exported = Vec::with_capacity(targets.len());
        for name in targets {
            let data = read_table(&conn, &name)?;
            let path = config.out_dir.join(format!(
                "{}.{}",
                safe_filename(&name),
                config.format.extension()
            ));

            match config.format {
                ExportFormat::Csv => write_csv(&path, &data)?,
            }

            log::info!(
                "{} {} -> {} ({} rows)",
                config.format.to_string().to_uppercase(),
                name.cyan(),
                path.display(),
                data.rows.len().green()
            );
            exported.push(ExportedTable {
                table: name,
                path,
                rows: data.rows.len(),
            });
        }

        Ok(exported)
    }

    fn resolve_targets(&self, available: &[String]) -> Result<Vec<String>> {
        if self.config.tables.is_empty() {
            return Ok(available.to_vec());
        }

        let missing: Vec<String> = self
            .config
            .tables
            .iter()
            .filter(|t| !available.contains(t))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::Request {
                missing,
                available: available.to_vec(),
            });
        }

        Ok(self.config.tables.clone())
    }
}

struct TableData {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

/// Read an entire table into memory
fn read_table(conn: &Connection, name: &str) -> Result<TableData> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(name)))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, SqlValue>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(TableData { columns, rows })
}

fn write_csv(path: &Path, data: &TableData) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&data.columns)?;
    for row in &data.rows {
        writer.write_record(row.iter().map(format_value))?;
    }
    writer.flush().map_err(|e| EtlError::io(path, e))?;
    Ok(())
}

fn format_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Blob(b) => base64::engine::general_purpose::STANDARD.encode(b),
    }
}
