//! Error taxonomy shared by every pipeline stage

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = EtlError> = std::result::Result<T, E>;

/// Errors raised by the fetch, load, transform and export stages.
///
/// Every variant aborts the current stage; nothing is retried.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Network failure or non-2xx response from the remote API
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected structure
    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// A statement in a transform script failed; only SQLite's message is shown
    #[error("SQLite error while running {filename}: {}", sqlite_message(error))]
    Script {
        filename: String,
        error: rusqlite::Error,
    },

    /// Caller asked for tables that do not exist
    #[error("requested tables not found in database: {missing:?}; available: {available:?}")]
    Request {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("table '{0}' already exists (load mode is 'fail')")]
    TableExists(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EtlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }
}

/// SQLite's own message, without the statement text rusqlite attaches to
/// input errors
fn sqlite_message(error: &rusqlite::Error) -> String {
    match error {
        rusqlite::Error::SqlInputError { msg, offset, .. } => {
            format!("{} (at offset {})", msg, offset)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_lists_missing_and_available() {
        let err = EtlError::Request {
            missing: vec!["dim_nope".to_string()],
            available: vec!["dim_geo".to_string(), "dim_type".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("dim_nope"));
        assert!(msg.contains("dim_geo"));
        assert!(msg.contains("dim_type"));
    }

    #[test]
    fn test_not_found_names_path() {
        let err = EtlError::not_found("SQL script", "sql/99_missing.sql");
        assert_eq!(
            err.to_string(),
            "SQL script not found: sql/99_missing.sql"
        );
    }

    #[test]
    fn test_script_error_omits_statement_text() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let sql = "SELECT *\nFROM stg_breweries_that_does_not_exist\nWHERE 1 = 1";
        let error = conn.prepare(sql).unwrap_err();

        let err = EtlError::Script {
            filename: "01_staging.sql".to_string(),
            error,
        };
        let msg = err.to_string();

        assert!(msg.starts_with("SQLite error while running 01_staging.sql: "));
        assert!(msg.contains("no such table: stg_breweries_that_does_not_exist"));
        assert!(!msg.contains("WHERE 1 = 1"));
        assert_eq!(msg.lines().count(), 1);
    }
}
