//! PIN code lookup.
//!
//! Response shape:
//! ```text
//! [{ "Status": "Success", "PostOffice": [{ "District": "...", "State": "..." }, ...] }]
//! [{ "Status": "Error",   "PostOffice": null }]
//! ```
//! The first post office decides district and state.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{RemoteError, RemoteResult};

/// District and state for a PIN code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalArea {
    pub district: String,
    pub state: String,
}

#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// `Ok(None)` when the service does not know the code.
    async fn lookup(&self, pincode: &str) -> RemoteResult<Option<PostalArea>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LookupResult {
    status: String,
    #[serde(default)]
    post_office: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostOffice {
    district: String,
    state: String,
}

/// Extracts the area from a raw response body.
pub fn parse_response(body: &str) -> RemoteResult<Option<PostalArea>> {
    let results: Vec<LookupResult> =
        serde_json::from_str(body).map_err(|e| RemoteError::Parse(e.to_string()))?;

    let Some(first) = results.into_iter().next() else {
        return Ok(None);
    };
    if first.status != "Success" {
        return Ok(None);
    }

    Ok(first
        .post_office
        .and_then(|offices| offices.into_iter().next())
        .map(|office| PostalArea {
            district: office.district,
            state: office.state,
        }))
}

#[derive(Debug, Clone)]
pub struct IndiaPostClient {
    client: Client,
    endpoint: String,
}

impl IndiaPostClient {
    /// `endpoint` is the base URL; the PIN code is appended as a path segment.
    pub fn new(endpoint: impl Into<String>) -> Self {
        IndiaPostClient {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PostalLookup for IndiaPostClient {
    #[instrument(skip(self))]
    async fn lookup(&self, pincode: &str) -> RemoteResult<Option<PostalArea>> {
        let response = self
            .client
            .get(format!("{}/{}", self.endpoint, pincode))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let area = parse_response(&body)?;
        debug!(found = area.is_some(), "PIN code lookup finished");
        Ok(area)
    }
}
