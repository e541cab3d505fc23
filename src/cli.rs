//! CLI helper functions
//!
//! One function per subcommand. Each one builds its stage from explicit
//! configuration, runs it to completion and reports what it did.

use crate::{
    breweries::{BreweriesExtractor, RawRowBuilder, snapshot},
    client::{OpenBreweryClient, PageSource},
    config::{ExportConfig, FetchConfig, RawLoadConfig, TransformConfig},
    etl::{Extractor, Loader, Pipeline, Transformer},
    storage::NdjsonReader,
    warehouse::{ExportedTable, RawTableLoader, ScriptRunner, TableExporter, TransformReport},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Outcome of an `extract` run
#[derive(Debug)]
pub struct ExtractSummary {
    pub fetched: usize,
    pub loaded: usize,
    pub snapshot: PathBuf,
    pub ingested_at: String,
}

/// Fetch every brewery from the API, snapshot it and load the raw table
pub async fn extract_breweries(fetch: &FetchConfig, load: &RawLoadConfig) -> Result<ExtractSummary> {
    let client = OpenBreweryClient::try_new(fetch)?;
    log::info!("Fetching breweries from {} ...", client.bright_black());
    extract_from(client, fetch, load).await
}

/// Extract from any page source
///
/// Pipeline: BreweriesExtractor → snapshot file → RawRowBuilder → RawTableLoader
pub async fn extract_from<S: PageSource>(
    source: S,
    fetch: &FetchConfig,
    load: &RawLoadConfig,
) -> Result<ExtractSummary> {
    let builder = RawRowBuilder::now();
    let extractor = BreweriesExtractor::new(source, fetch);

    let records = extractor.extract().await?;
    let fetched = records.len();
    log::info!("Fetched {} records.", fetched.green());

    let snapshot = snapshot::write_snapshot(&load.raw_dir, &records)
        .context("Failed to write raw snapshot")?;
    log::info!("Wrote raw snapshot: {}", snapshot.display().bright_black());

    let rows = builder.transform_many(records)?;
    let loader = RawTableLoader::new(&load.db_path, &load.table, load.mode);
    let loaded = loader.load(rows).await?;

    log::info!("✓ Loaded {} row(s) into {}", loaded, load.table.cyan());

    Ok(ExtractSummary {
        fetched,
        loaded,
        snapshot,
        ingested_at: builder.ingested_at().to_string(),
    })
}

/// Reload an existing snapshot into the raw table without calling the API
///
/// Pipeline: NdjsonReader → RawRowBuilder → RawTableLoader
pub async fn reload_snapshot(snapshot: impl AsRef<Path>, load: &RawLoadConfig) -> Result<usize> {
    let snapshot = snapshot.as_ref();
    log::info!("Reloading snapshot {}", snapshot.display().bright_black());

    let pipeline = Pipeline::new(
        NdjsonReader::new(snapshot),
        RawRowBuilder::now(),
        RawTableLoader::new(&load.db_path, &load.table, load.mode),
    );
    let count = pipeline.run().await?;

    log::info!("✓ Reloaded {} row(s) into {}", count, load.table.cyan());
    Ok(count)
}

/// Run the configured SQL scripts and report summary row counts
pub fn run_transform(config: &TransformConfig) -> Result<TransformReport> {
    let runner = ScriptRunner::prepare(config)?;

    log::info!("Running scripts:");
    for path in runner.scripts() {
        log::info!(" - {}", path.display());
    }

    let report = runner.run()?;

    log::info!("Row counts (missing tables show -1):");
    for count in &report.counts {
        log::info!(" - {}", count);
    }
    Ok(report)
}

/// Export tables to flat files
pub fn export_tables(config: ExportConfig) -> Result<Vec<ExportedTable>> {
    let out_dir = config.out_dir.clone();
    let exported = TableExporter::new(config).export()?;
    log::info!(
        "✓ Exported {} table(s) to {}",
        exported.len(),
        out_dir.display().bright_black()
    );
    Ok(exported)
}
