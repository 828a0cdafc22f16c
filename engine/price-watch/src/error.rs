//! Error types for the price watcher

use thiserror::Error;

/// Transient failures while fetching the course page.
///
/// The scheduler recovers from these by waiting for the next poll.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Transport failure: DNS, refused connection, timeout or body read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP request to {url} failed with status: {status}")]
    Status { status: u16, url: String },
}

/// The page no longer matches the expected markup.
///
/// Never retried: a changed page needs a human to look at it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("price metadata tag <meta property=\"{property}\"> not found")]
    MissingPriceTag { property: String },

    #[error("price metadata tag has no content attribute")]
    MissingContent,

    #[error("price content {raw:?} is not a number")]
    InvalidPrice { raw: String },

    #[error("price {price} is negative")]
    NegativePrice { price: f64 },

    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Best-effort popup delivery failures. Logged and otherwise ignored.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with status {status}")]
    Failed { tool: &'static str, status: std::process::ExitStatus },

    #[error("desktop notifications are not supported on this platform")]
    Unsupported,
}

impl ExtractionError {
    /// Create a missing tag error for the given `property` value
    pub fn missing_tag(property: impl Into<String>) -> Self {
        Self::MissingPriceTag { property: property.into() }
    }

    /// Create an invalid price error carrying the offending text
    pub fn invalid_price(raw: impl Into<String>) -> Self {
        Self::InvalidPrice { raw: raw.into() }
    }
}
