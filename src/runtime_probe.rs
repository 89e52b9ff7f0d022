//! Direct query of the model runtime's tag listing.
//!
//! Used only when the backend cannot answer `get-downloaded-models`. The
//! runtime serves the same list the backend would, at
//! `{api_url}/api/tags` (`{"models": [{"name": "llama2:7b", ...}, ...]}`).

use serde::Deserialize;

use crate::config::RuntimeConfig;
use crate::error::{DeskError, Result};

#[derive(Debug, Deserialize)]
struct TagList {
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: Option<String>,
}

/// Client for the runtime's `/api/tags` endpoint.
pub struct RuntimeTagsClient {
    endpoint_url: String,
    client: reqwest::Client,
}

impl RuntimeTagsClient {
    pub fn new(config: &RuntimeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build runtime HTTP client; using defaults");
                reqwest::Client::new()
            });
        Self {
            endpoint_url: config.api_url.clone(),
            client,
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Names of the models the runtime has locally.
    pub async fn list_model_names(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.endpoint_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeskError::Runtime(format!("GET {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeskError::Runtime(format!(
                "GET {url} returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| DeskError::Runtime(format!("failed to read {url}: {e}")))?;
        parse_tags_response(&body)
            .ok_or_else(|| DeskError::Runtime(format!("unrecognized tag listing from {url}")))
    }
}

/// Parse a tag listing, keeping entries that carry a `name`.
fn parse_tags_response(body: &str) -> Option<Vec<String>> {
    let list: TagList = serde_json::from_str(body).ok()?;
    Some(list.models.into_iter().filter_map(|tag| tag.name).collect())
}
