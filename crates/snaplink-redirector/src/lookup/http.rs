use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use snaplink_core::lookup::{Result, UrlLookup};
use snaplink_core::{LookupError, ShortCode};
use std::time::Duration;
use tracing::{debug, trace};

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct ResolveBody {
    long_url: String,
}

/// Asks the service that owns the mapping store over HTTP.
///
/// Issues `GET {base_url}/resolve/{code}`. A `200` with `{"long_url": ...}`
/// is a hit, a `404` is an authoritative miss and anything else is treated
/// as the owner being unavailable.
#[derive(Debug, Clone)]
pub struct HttpUrlLookup {
    client: reqwest::Client,
    base_url: String,
}

fn map_reqwest_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout(err.to_string())
    } else if err.is_decode() {
        LookupError::InvalidResponse(err.to_string())
    } else {
        LookupError::Unavailable(err.to_string())
    }
}

impl HttpUrlLookup {
    /// Creates a lookup against `base_url` with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Uses a preconfigured client, e.g. one shared with other callers.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        // Ensure base URL doesn't have trailing slash
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl UrlLookup for HttpUrlLookup {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<String>> {
        let url = format!("{}/resolve/{}", self.base_url, code);
        trace!(%url, "resolving short code over HTTP");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match response.status() {
            StatusCode::OK => {
                let body: ResolveBody = response.json().await.map_err(map_reqwest_error)?;
                Ok(Some(body.long_url))
            }
            StatusCode::NOT_FOUND => {
                debug!(code = %code, "owner reports short code not found");
                Ok(None)
            }
            status => Err(LookupError::Unavailable(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }
}
