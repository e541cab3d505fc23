//! Brewery ETL
//!
//! Batch pipeline over the Open Brewery DB API: fetch every brewery, land the
//! raw records in SQLite, build staging and dimension tables with SQL
//! scripts, and export the results as CSV.

pub mod breweries;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod storage;
pub mod warehouse;

// Re-exports for convenience
pub use breweries::{BreweriesExtractor, RawRowBuilder, Record};
pub use client::{OpenBreweryClient, PageSource};
pub use error::EtlError;
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use storage::{NdjsonReader, NdjsonWriter};
pub use warehouse::{LoadMode, RawTableLoader, ScriptRunner, TableExporter};
