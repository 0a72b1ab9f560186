//! Labdex Ingest - Training catalog synchronization tool

use anyhow::Result;
use clap::Parser;
use labdex_common::logging::{init_logging, LogConfig, LogLevel};
use labdex_ingest::client::{CatalogClient, LabClient};
use labdex_ingest::config::Config;
use labdex_ingest::pipeline::SyncPipeline;
use labdex_ingest::store::{MemoryStore, PgCatalogStore};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "labdex-ingest")]
#[command(author, version, about = "Labdex training-catalog ingestion tool")]
struct Cli {
    /// Highest module id to probe (overrides SCAN_CEILING)
    #[arg(long)]
    ceiling: Option<i64>,

    /// Pause between upstream requests in milliseconds (overrides REQUEST_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Run against an in-memory store instead of PostgreSQL
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env()?;
    log_config.log_file_prefix = "labdex-ingest".to_string();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let mut config = Config::load()?;
    if let Some(ceiling) = cli.ceiling {
        config.sync.scan_ceiling = ceiling;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.sync.request_delay_ms = delay_ms;
    }
    config.validate()?;

    let catalog = CatalogClient::new(&config.catalog)?;
    let lab = LabClient::new(&config.lab)?;

    // Everything up to here is setup: any failure aborts the run with a
    // non-zero exit. Per-item failures inside the pipeline never do.
    let stats = if cli.dry_run {
        info!("Dry run: ingesting into an in-memory store");
        let store = MemoryStore::new();
        SyncPipeline::new(&catalog, &lab, &store, config.sync.clone())
            .run()
            .await
    } else {
        let store = PgCatalogStore::connect(&config.database).await?;
        store.migrate().await?;
        SyncPipeline::new(&catalog, &lab, &store, config.sync.clone())
            .run()
            .await
    };

    info!(%stats, "Ingestion complete");
    Ok(())
}
