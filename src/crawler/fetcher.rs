//! Page fetch transport
//!
//! The crawl engine only sees the [`PageFetcher`] trait; the concrete
//! reqwest client lives behind it so tests can substitute scripted
//! responses and other backends can be added without touching the loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::Transport;
use crate::FetchError;

/// Page-fetch collaborator: one URL in, raw markup out.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with the crawler's user agent and timeouts
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("shelfmirror/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP transport backed by reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("Downloading page: {}", url);

        let target =
            url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        tracing::debug!("Successfully downloaded: {}", url);
        Ok(body)
    }
}

/// Maps a reqwest error onto the fetch-error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl(url.to_string())
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Constructs the fetcher for the configured transport backend
pub fn build_fetcher(transport: Transport) -> Result<Arc<dyn PageFetcher>, reqwest::Error> {
    match transport {
        Transport::Http => Ok(Arc::new(HttpFetcher::new()?)),
    }
}
