//! Labdex Ingest Library
//!
//! Synchronizes a training catalog (learning modules, their units, practice
//! machines, certification exams, and vulnerability taxonomy labels) from two
//! upstream REST providers into PostgreSQL.
//!
//! The pipeline is strictly sequential: one outstanding upstream request at a
//! time with a fixed pause between calls, so the providers' rate limits are
//! never breached. Every write is idempotent, which makes re-runs safe.
//!
//! # Example
//!
//! ```no_run
//! use labdex_ingest::client::{CatalogClient, LabClient};
//! use labdex_ingest::config::Config;
//! use labdex_ingest::pipeline::SyncPipeline;
//! use labdex_ingest::store::PgCatalogStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let catalog = CatalogClient::new(&config.catalog)?;
//!     let lab = LabClient::new(&config.lab)?;
//!     let store = PgCatalogStore::connect(&config.database).await?;
//!     store.migrate().await?;
//!
//!     let stats = SyncPipeline::new(&catalog, &lab, &store, config.sync).run().await;
//!     println!("{}", stats);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dedup;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod store;

// Re-export main types
pub use client::{CatalogClient, CatalogProvider, LabClient, LabProvider};
pub use config::Config;
pub use dedup::MachineDedup;
pub use pipeline::{RunStats, SyncPipeline};
pub use store::{CatalogStore, MemoryStore, PgCatalogStore};

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error types for catalog ingestion
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error(transparent)]
    Common(#[from] labdex_common::LabdexError),
}
