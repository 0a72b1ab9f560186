// Lab Provider Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};

use labdex_common::LabdexError;

use crate::client::LabProvider;
use crate::config::LabApiConfig;
use crate::models::{Envelope, MachineProfileDto, TagDto};
use crate::{Result, SyncError};

/// HTTP client for the lab provider (machine profiles and tags).
///
/// Authenticates with a bearer token on every request.
pub struct LabClient {
    client: Client,
    base_url: String,
}

impl LabClient {
    /// Create a new client from configuration
    pub fn new(config: &LabApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if !config.api_token.is_empty() {
            let bearer = format!("Bearer {}", config.api_token);
            let value = HeaderValue::from_str(&bearer)
                .map_err(|e| LabdexError::Config(format!("Invalid lab API token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("labdex-lab-sync/1.0")
            .default_headers(headers)
            .build()?;

        Ok(LabClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LabProvider for LabClient {
    async fn fetch_machine_profile(&self, name: &str) -> Result<Option<MachineProfileDto>> {
        let url = format!("{}/machines/profile/{}", self.base_url, name);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: Envelope<MachineProfileDto> = response
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SyncError::Payload(format!("machine {}: {}", name, e)))?;
        Ok(Some(envelope.data))
    }

    async fn fetch_machine_tags(&self, machine_id: i64) -> Result<Vec<TagDto>> {
        let url = format!("{}/machines/{}/tags", self.base_url, machine_id);
        let response = self.client.get(&url).send().await?;

        let envelope: Envelope<Vec<TagDto>> = response
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SyncError::Payload(format!("machine {} tags: {}", machine_id, e)))?;
        Ok(envelope.data)
    }
}

// ============================================================================
// Tests
// ============================================================================
