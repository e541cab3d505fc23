use brewery_etl::{
    cli,
    config::{
        API_URL, DEFAULT_DB_PATH, DEFAULT_PER_PAGE, DEFAULT_RAW_TABLE, ExportConfig, FetchConfig,
        RawLoadConfig, TransformConfig, USER_AGENT,
    },
    warehouse::{ExportFormat, LoadMode},
};
use clap::{Args, Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Brewery ETL: fetch Open Brewery DB into SQLite, model it with SQL, export CSVs
#[derive(Parser)]
#[command(name = "brewery-etl", version, styles = STYLES)]
struct Cli {
    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch breweries from the API, write a raw snapshot and load the raw table
    Extract {
        #[command(flatten)]
        target: RawTableArgs,

        /// Rows per page
        #[arg(long, env = "BREWERY_PER_PAGE", default_value_t = DEFAULT_PER_PAGE,
              value_parser = clap::value_parser!(u32).range(1..))]
        per_page: u32,

        /// Sleep between requests (seconds)
        #[arg(long, env = "BREWERY_SLEEP", default_value = "0.1", value_parser = parse_seconds)]
        sleep: Duration,

        /// Limit pages (for testing)
        #[arg(long, env = "BREWERY_MAX_PAGES")]
        max_pages: Option<u32>,

        /// Directory to store raw JSONL snapshots
        #[arg(long, env = "BREWERY_RAW_DIR", default_value = "data/raw")]
        raw_dir: PathBuf,

        /// Breweries endpoint
        #[arg(long, env = "BREWERY_API_URL", default_value = API_URL)]
        base_url: String,

        /// Per-request timeout (seconds)
        #[arg(long, env = "BREWERY_TIMEOUT", default_value = "30", value_parser = parse_seconds)]
        timeout: Duration,
    },

    /// Load an existing raw snapshot into the raw table without calling the API
    Reload {
        /// JSONL snapshot written by a previous extract
        snapshot: PathBuf,

        #[command(flatten)]
        target: RawTableArgs,
    },

    /// Run SQL scripts in order to build staging and dimension tables
    Transform {
        /// Path to SQLite DB file
        #[arg(long, env = "BREWERY_DB", default_value = DEFAULT_DB_PATH)]
        db: PathBuf,

        /// Directory containing SQL scripts
        #[arg(long, env = "BREWERY_SQL_DIR", default_value = "sql")]
        sql_dir: PathBuf,

        /// SQL scripts to run in order (filenames, relative to --sql-dir)
        #[arg(long, env = "BREWERY_SCRIPTS", num_args = 1.., value_delimiter = ',',
              default_values = ["01_staging.sql", "02_dimensions.sql"])]
        scripts: Vec<String>,

        /// Tables whose row counts are reported afterwards
        #[arg(long, num_args = 1.., value_delimiter = ',',
              default_values = ["stg_breweries", "dim_type", "dim_geo", "dim_brewery"])]
        summary_tables: Vec<String>,
    },

    /// Export SQLite tables to flat files
    Export {
        /// Path to SQLite DB file
        #[arg(long, env = "BREWERY_DB", default_value = DEFAULT_DB_PATH)]
        db: PathBuf,

        /// Output directory
        #[arg(long, env = "BREWERY_EXPORT_DIR", default_value = "data/exports")]
        out: PathBuf,

        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Tables to export. If omitted, exports all tables (not views).
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        tables: Vec<String>,

        /// Also export views
        #[arg(long)]
        include_views: bool,
    },
}

#[derive(Args)]
struct RawTableArgs {
    /// Path to SQLite DB file
    #[arg(long, env = "BREWERY_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Target raw table name
    #[arg(long, env = "BREWERY_TABLE", default_value = DEFAULT_RAW_TABLE)]
    table: String,

    /// Load mode for the raw table
    #[arg(long, value_enum, env = "BREWERY_LOAD_MODE", default_value_t = LoadMode::Replace)]
    mode: LoadMode,
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("'{}' is not a number of seconds: {}", value, e))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid duration '{}': {}", value, e))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine; a malformed one is not
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    let cli = Cli::parse();

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Extract {
            target,
            per_page,
            sleep,
            max_pages,
            raw_dir,
            base_url,
            timeout,
        } => {
            let fetch = FetchConfig {
                base_url,
                user_agent: USER_AGENT.to_string(),
                timeout,
                per_page,
                delay: sleep,
                max_pages,
            };
            let load = RawLoadConfig {
                db_path: target.db,
                table: target.table,
                mode: target.mode,
                raw_dir,
            };
            let summary = cli::extract_breweries(&fetch, &load).await?;
            log::info!(
                "Done: {} fetched, {} loaded, ingested_at_utc={}",
                summary.fetched,
                summary.loaded,
                summary.ingested_at.bright_black()
            );
        }
        Commands::Reload { snapshot, target } => {
            let load = RawLoadConfig {
                db_path: target.db,
                table: target.table,
                mode: target.mode,
                ..RawLoadConfig::default()
            };
            cli::reload_snapshot(&snapshot, &load).await?;
        }
        Commands::Transform {
            db,
            sql_dir,
            scripts,
            summary_tables,
        } => {
            cli::run_transform(&TransformConfig {
                db_path: db,
                sql_dir,
                scripts,
                summary_tables,
            })?;
            log::info!("Done");
        }
        Commands::Export {
            db,
            out,
            format,
            tables,
            include_views,
        } => {
            cli::export_tables(ExportConfig {
                db_path: db,
                out_dir: out,
                format,
                tables,
                include_views,
            })?;
            log::info!("Done");
        }
    }

    Ok(())
}
