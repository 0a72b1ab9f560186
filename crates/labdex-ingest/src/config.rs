//! Configuration management
//!
//! All settings come from the environment (a `.env` file is honored), with
//! compiled-in defaults for everything except credentials.

use std::time::Duration;

use labdex_common::{LabdexError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default base URL of the catalog provider (modules and exams).
pub const DEFAULT_CATALOG_API_URL: &str = "https://academy.example.com/api/v1";

/// Default base URL of the lab provider (machine profiles and tags).
pub const DEFAULT_LAB_API_URL: &str = "https://labs.example.com/api/v4";

/// Default public base used to derive canonical machine page URLs.
pub const DEFAULT_MACHINE_URL_BASE: &str = "https://labs.example.com/machines";

/// Default highest module id probed during the sequential scan.
pub const DEFAULT_SCAN_CEILING: i64 = 300;

/// Default pause between upstream requests, in milliseconds.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/labdex";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub catalog: CatalogApiConfig,
    pub lab: LabApiConfig,
    pub sync: SyncConfig,
    pub database: DatabaseConfig,
}

/// Catalog provider access (session-cookie authenticated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogApiConfig {
    pub base_url: String,
    pub session_cookie: String,
    pub timeout_secs: u64,
}

/// Lab provider access (bearer-token authenticated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabApiConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

/// Pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Highest module id to probe; ids above this are never discovered.
    pub scan_ceiling: i64,

    /// Fixed pause awaited after each upstream request in a scanning loop.
    pub request_delay_ms: u64,

    /// Public base for canonical machine page URLs.
    pub machine_url_base: String,
}

impl SyncConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let config = Config {
            catalog: CatalogApiConfig {
                base_url: std::env::var("CATALOG_API_URL")
                    .unwrap_or_else(|_| DEFAULT_CATALOG_API_URL.to_string()),
                session_cookie: std::env::var("CATALOG_SESSION_COOKIE").unwrap_or_default(),
                timeout_secs,
            },
            lab: LabApiConfig {
                base_url: std::env::var("LAB_API_URL")
                    .unwrap_or_else(|_| DEFAULT_LAB_API_URL.to_string()),
                api_token: std::env::var("LAB_API_TOKEN").unwrap_or_default(),
                timeout_secs,
            },
            sync: SyncConfig {
                scan_ceiling: std::env::var("SCAN_CEILING")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SCAN_CEILING),
                request_delay_ms: std::env::var("REQUEST_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REQUEST_DELAY_MS),
                machine_url_base: std::env::var("MACHINE_URL_BASE")
                    .unwrap_or_else(|_| DEFAULT_MACHINE_URL_BASE.to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.base_url.is_empty() {
            return Err(LabdexError::Config(
                "Catalog API URL cannot be empty".to_string(),
            ));
        }

        if self.lab.base_url.is_empty() {
            return Err(LabdexError::Config("Lab API URL cannot be empty".to_string()));
        }

        if self.sync.machine_url_base.is_empty() {
            return Err(LabdexError::Config(
                "Machine URL base cannot be empty".to_string(),
            ));
        }

        if self.sync.scan_ceiling <= 0 {
            return Err(LabdexError::Config(format!(
                "Scan ceiling must be positive, got {}",
                self.sync.scan_ceiling
            )));
        }

        if self.database.url.is_empty() {
            return Err(LabdexError::Config("Database URL cannot be empty".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(LabdexError::Config(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(LabdexError::Config(format!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        if self.catalog.session_cookie.is_empty() {
            tracing::warn!("No catalog session cookie configured - catalog requests will be unauthenticated");
        }

        if self.lab.api_token.is_empty() {
            tracing::warn!("No lab API token configured - lab requests will be unauthenticated");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogApiConfig {
                base_url: DEFAULT_CATALOG_API_URL.to_string(),
                session_cookie: String::new(),
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            },
            lab: LabApiConfig {
                base_url: DEFAULT_LAB_API_URL.to_string(),
                api_token: String::new(),
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            },
            sync: SyncConfig {
                scan_ceiling: DEFAULT_SCAN_CEILING,
                request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
                machine_url_base: DEFAULT_MACHINE_URL_BASE.to_string(),
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let mut config = Config::default();
        config.sync.scan_ceiling = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = Config::default();
        config.catalog.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_bounds_rejected() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_delay() {
        let mut config = Config::default();
        config.sync.request_delay_ms = 250;
        assert_eq!(config.sync.request_delay(), Duration::from_millis(250));
    }
}
