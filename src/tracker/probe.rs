use async_trait::async_trait;
use reqwest::Client;

use crate::tracker::error::{internal_error, invalid_argument, network_error, TrackerResult};

/// Outcome of a header-only request: the URL that answered and its status code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResponse {
    pub url: String,
    pub status: u16,
}

impl ProbeResponse {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }
}

/// Issues the HEAD request whose status code decides which event is tracked.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Probe: Send + Sync {
    async fn head(&self, url: &str) -> TrackerResult<ProbeResponse>;
}

/// [`Probe`] backed by `reqwest`. On wasm targets requests go through the browser `fetch`.
///
/// Redirects, timeouts and caching are left to the client defaults.
#[derive(Clone, Debug)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> TrackerResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| internal_error(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one with custom TLS roots or a proxy.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Probe for HttpProbe {
    async fn head(&self, url: &str) -> TrackerResult<ProbeResponse> {
        let parsed = url::Url::parse(url)
            .map_err(|err| invalid_argument(format!("invalid probe URL `{url}`: {err}")))?;

        log::debug!("probing {parsed} with HEAD");
        let response = self
            .client
            .head(parsed)
            .send()
            .await
            .map_err(|err| network_error(format!("HEAD request to `{url}` failed: {err}")))?;

        let status = response.status().as_u16();
        log::debug!("probe of {url} answered with status {status}");
        Ok(ProbeResponse::new(response.url().as_str(), status))
    }
}
