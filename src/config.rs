//! Explicit run configuration for each stage
//!
//! Every stage receives its configuration as a value; the `Default` impls
//! carry the same defaults as the CLI so zero-argument runs behave the same
//! from either entry point.

use crate::warehouse::{ExportFormat, LoadMode};
use std::path::PathBuf;
use std::time::Duration;

pub const API_URL: &str = "https://api.openbrewerydb.org/v1/breweries";
pub const USER_AGENT: &str = "brewery-etl/1.0";
pub const DEFAULT_PER_PAGE: u32 = 200;
pub const DEFAULT_DB_PATH: &str = "data/breweries.db";
pub const DEFAULT_RAW_TABLE: &str = "raw_breweries";

/// Scripts run by `transform` when none are given. `03_qa_checks.sql` is
/// shipped alongside but stays opt-in.
pub const DEFAULT_SCRIPTS: [&str; 2] = ["01_staging.sql", "02_dimensions.sql"];

pub const SUMMARY_TABLES: [&str; 4] = ["stg_breweries", "dim_type", "dim_geo", "dim_brewery"];

/// Remote API paging settings
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub per_page: u32,
    /// Pause after every non-empty page
    pub delay: Duration,
    pub max_pages: Option<u32>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: API_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            per_page: DEFAULT_PER_PAGE,
            delay: Duration::from_millis(100),
            max_pages: None,
        }
    }
}

/// Where fetched records land: snapshot directory and raw table
#[derive(Clone, Debug)]
pub struct RawLoadConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub mode: LoadMode,
    pub raw_dir: PathBuf,
}

impl Default for RawLoadConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table: DEFAULT_RAW_TABLE.to_string(),
            mode: LoadMode::Replace,
            raw_dir: PathBuf::from("data/raw"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransformConfig {
    pub db_path: PathBuf,
    pub sql_dir: PathBuf,
    /// Script filenames relative to `sql_dir`, run in order
    pub scripts: Vec<String>,
    pub summary_tables: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            sql_dir: PathBuf::from("sql"),
            scripts: DEFAULT_SCRIPTS.iter().map(|s| s.to_string()).collect(),
            summary_tables: SUMMARY_TABLES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub db_path: PathBuf,
    pub out_dir: PathBuf,
    pub format: ExportFormat,
    /// Empty means every available table
    pub tables: Vec<String>,
    pub include_views: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            out_dir: PathBuf::from("data/exports"),
            format: ExportFormat::Csv,
            tables: Vec::new(),
            include_views: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.base_url, API_URL);
        assert_eq!(fetch.per_page, 200);
        assert_eq!(fetch.delay, Duration::from_millis(100));
        assert!(fetch.max_pages.is_none());

        let raw = RawLoadConfig::default();
        assert_eq!(raw.table, "raw_breweries");
        assert_eq!(raw.mode, LoadMode::Replace);

        let transform = TransformConfig::default();
        assert_eq!(transform.scripts, vec!["01_staging.sql", "02_dimensions.sql"]);
        assert_eq!(transform.summary_tables.len(), 4);

        let export = ExportConfig::default();
        assert!(export.tables.is_empty());
        assert!(!export.include_views);
    }
}
