//! Course page fetching

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::error::NetworkError;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
);

/// Source of the course page HTML
#[async_trait::async_trait]
pub trait PageSource {
    /// Fetch the page once and return its body
    async fn fetch_page(&self) -> Result<String, NetworkError>;

    /// Where the page comes from, for log lines
    fn location(&self) -> &str;
}

/// Fetches the course page over HTTP(S)
pub struct HttpPageSource {
    client: Client,
    url: String,
}

impl HttpPageSource {
    /// Create a page source for `url` with the given request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url: url.into() })
    }

    /// Create a page source from the watcher configuration
    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.request_timeout())
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self) -> Result<String, NetworkError> {
        info!("Fetching course page: {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(NetworkError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        let html = response.text().await?;
        debug!("Fetched HTML ({} bytes)", html.len());

        Ok(html)
    }

    fn location(&self) -> &str {
        &self.url
    }
}
