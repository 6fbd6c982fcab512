//! OpenEmbedded layer index REST API client

use serde_json::Value;
use tracing::{debug, warn};

use crate::layerindex::error::IndexError;
use crate::layerindex::source::{IndexSource, into_records};
use crate::layerindex::types::Endpoint;

/// Default base URL for the layer index API
pub const DEFAULT_BASE_URL: &str = "https://layers.openembedded.org/layerindex/api";

/// Index source backed by the layer index HTTP API
pub struct LayerIndexClient {
    client: reqwest::Client,
    base_url: String,
}

impl LayerIndexClient {
    /// Creates a new LayerIndexClient with a custom base URL
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oe-recipe-resolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to configure HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }
}

impl Default for LayerIndexClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl IndexSource for LayerIndexClient {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Vec<Value>, IndexError> {
        let url = self.url(endpoint);
        debug!("Fetching layer index {}: {}", endpoint.as_str(), url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IndexError::NotFound(url));
        }

        if !status.is_success() {
            warn!("Layer index returned status {}: {}", status, url);
            return Err(IndexError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!("Failed to parse layer index response from {}: {}", url, e);
            IndexError::InvalidResponse(e.to_string())
        })?;

        let records = into_records(body, endpoint)?;
        debug!("Fetched {} {} records", records.len(), endpoint.as_str());

        Ok(records)
    }
}
