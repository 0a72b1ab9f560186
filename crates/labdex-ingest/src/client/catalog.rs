// Catalog Provider Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, StatusCode};

use labdex_common::LabdexError;

use crate::client::CatalogProvider;
use crate::config::CatalogApiConfig;
use crate::models::{Envelope, ExamDto, ModuleDto, ModuleRefDto};
use crate::{Result, SyncError};

/// HTTP client for the catalog provider (modules and exams).
///
/// Authenticates with the provider's session cookie on every request.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new client from configuration
    pub fn new(config: &CatalogApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if !config.session_cookie.is_empty() {
            let cookie = format!("session={}", config.session_cookie);
            let value = HeaderValue::from_str(&cookie).map_err(|e| {
                LabdexError::Config(format!("Invalid catalog session cookie: {}", e))
            })?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("labdex-catalog-sync/1.0")
            .default_headers(headers)
            .build()?;

        Ok(CatalogClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogProvider for CatalogClient {
    async fn fetch_module(&self, id: i64) -> Result<Option<ModuleDto>> {
        let url = format!("{}/modules/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: Envelope<ModuleDto> = response
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SyncError::Payload(format!("module {}: {}", id, e)))?;
        Ok(Some(envelope.data))
    }

    async fn fetch_exams(&self) -> Result<Vec<ExamDto>> {
        let url = format!("{}/exams", self.base_url);
        let response = self.client.get(&url).send().await?;

        let envelope: Envelope<Vec<ExamDto>> = response
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SyncError::Payload(format!("exam list: {}", e)))?;
        Ok(envelope.data)
    }

    async fn fetch_exam_modules(&self, exam_id: i64) -> Result<Vec<ModuleRefDto>> {
        let url = format!("{}/exams/{}/modules", self.base_url, exam_id);
        let response = self.client.get(&url).send().await?;

        let envelope: Envelope<Vec<ModuleRefDto>> = response
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SyncError::Payload(format!("exam {} modules: {}", exam_id, e)))?;
        Ok(envelope.data)
    }
}

// ============================================================================
// Tests
// ============================================================================
