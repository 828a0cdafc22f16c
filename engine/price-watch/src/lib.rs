//! # Price Watch
//!
//! Polls a single course page, reads the price published in its
//! `udemy_com:price` metadata tag and raises a desktop notification once the
//! price satisfies the configured target.
//!
//! The crate is split along the steps of one polling iteration:
//! fetch ([`fetcher`]), extract ([`extractor`]), evaluate ([`evaluator`]) and
//! notify ([`notifier`]). The [`scheduler`] drives them as a small state
//! machine on a single task.

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod extractor;
pub mod fetcher;
pub mod logging;
pub mod notifier;
pub mod scheduler;
pub mod signals;

#[cfg(test)]
mod integration_tests;

pub use cli::Cli;
pub use config::{LoggingConfig, WatchConfig};
pub use error::{ExtractionError, NetworkError, NotificationError};
pub use evaluator::{Comparison, PriceTarget};
pub use extractor::{extract_price, parse_price_content};
pub use fetcher::{HttpPageSource, PageSource};
pub use logging::initialize_logging;
pub use notifier::{deliver_alert, DesktopNotifier, Notifier, PriceAlert};
pub use scheduler::{PriceWatcher, TerminationReason, WatchState};
pub use signals::shutdown_signal;

/// Current version of the price watcher
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Course page watched when nothing else is configured
pub const DEFAULT_COURSE_URL: &str =
    "https://www.udemy.com/course/ingenieria-inversa-y-cracking-de-software-preventivo/";

/// Default price target
pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Default poll interval (one hour)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3600;

/// Default time the desktop popup stays on screen (ten minutes)
pub const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 600;

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Zone used to stamp alert messages
pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

/// Default popup title
pub const DEFAULT_NOTIFICATION_TITLE: &str = "ALERT PRICE!";

/// `property` attribute of the metadata tag carrying the price
pub const PRICE_META_PROPERTY: &str = "udemy_com:price";

/// Number of leading characters of the tag content treated as the amount.
/// Anything after it is currency or suffix noise.
pub const PRICE_PREFIX_LEN: usize = 5;
