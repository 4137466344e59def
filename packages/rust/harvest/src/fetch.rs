//! HTTP fetcher for listing and chapter pages.
//!
//! One GET per call with a fixed identity header and a bounded timeout.
//! There is no caching and no retry here — retry policy, if any, belongs
//! to the caller.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use docbinder_shared::{DocbinderError, FetchConfig, Result};

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects. Hrefs found on the page resolve
    /// against this, not against whatever URL was requested.
    pub final_url: Url,
    /// Page body.
    pub body: String,
}

/// HTTP client wrapper shared by the scanner and the collector.
///
/// Cloning is cheap (the underlying `reqwest::Client` is reference
/// counted), which is what lets collector tasks carry their own handle.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| DocbinderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch one URL. Fails on transport error, timeout, or a
    /// non-success status.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DocbinderError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocbinderError::Network(format!("{url}: HTTP {status}")));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| DocbinderError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(FetchedPage { final_url, body })
    }
}
