//! Polling scheduler
//!
//! Drives Fetch → Extract → Evaluate → Notify once per poll interval on a
//! single task. The run ends when an alert fires, when the page markup no
//! longer yields a price, or when the shutdown future resolves while the
//! watcher is fetching or sleeping between polls.

use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::WatchConfig;
use crate::error::ExtractionError;
use crate::evaluator::PriceTarget;
use crate::extractor::extract_price;
use crate::fetcher::PageSource;
use crate::notifier::{deliver_alert, Notifier, PriceAlert};

/// Why a watch run ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminationReason {
    /// The price met the target and the alert was delivered
    Notified { price: f64 },
    /// The page no longer carries a readable price
    ExtractionFailed,
    /// The operator stopped the watcher
    Interrupted,
}

/// Scheduler state after one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchState {
    Polling,
    Terminated(TerminationReason),
}

/// Watches one course page until its price meets the target
pub struct PriceWatcher<S, N> {
    source: S,
    notifier: N,
    target: PriceTarget,
    poll_interval: Duration,
    notification_timeout: Duration,
    notification_title: String,
    tz: Tz,
}

impl<S, N> PriceWatcher<S, N>
where
    S: PageSource + Sync,
    N: Notifier + Sync,
{
    /// Create a watcher from a validated configuration
    pub fn new(config: &WatchConfig, source: S, notifier: N) -> Result<Self> {
        Ok(Self {
            source,
            notifier,
            target: config.target(),
            poll_interval: config.poll_interval(),
            notification_timeout: config.notification_timeout(),
            notification_title: config.notification_title.clone(),
            tz: config.tz()?,
        })
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run one Fetch → Extract → Evaluate → Notify iteration
    pub async fn poll_once(&self) -> WatchState {
        match self.observe().await {
            Ok(observed_price) => self.evaluate(observed_price).await,
            Err(_) => WatchState::Terminated(TerminationReason::ExtractionFailed),
        }
    }

    /// Fetch and extract. `Ok(None)` means the page could not be fetched.
    ///
    /// Holds no side effects besides the request, so it may be dropped midway.
    async fn observe(&self) -> Result<Option<f64>, ExtractionError> {
        let html = match self.source.fetch_page().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not fetch {}: {}", self.source.location(), e);
                return Ok(None);
            }
        };

        match extract_price(&html) {
            Ok(price) => {
                info!("Extracted price: {}", price);
                Ok(Some(price))
            }
            Err(e) => {
                error!("Could not extract the price from {}: {}", self.source.location(), e);
                Err(e)
            }
        }
    }

    /// Compare against the target and deliver the alert when it is met
    async fn evaluate(&self, observed_price: Option<f64>) -> WatchState {
        let Some(price) = observed_price else {
            return WatchState::Polling;
        };

        if !self.target.is_met(price) {
            info!("Price {} does not meet target ({})", price, self.target);
            return WatchState::Polling;
        }

        let alert = PriceAlert::new(
            self.notification_title.clone(),
            price,
            Utc::now(),
            self.tz,
            self.notification_timeout,
        );
        deliver_alert(&self.notifier, &alert).await;

        WatchState::Terminated(TerminationReason::Notified { price })
    }

    /// Poll until a terminal state is reached.
    ///
    /// `shutdown` is polled from the start and raced against the fetch and
    /// the sleep between polls. Alert delivery is never raced, so an alert in
    /// progress always completes.
    pub async fn run<F>(&self, shutdown: F) -> TerminationReason
    where
        F: Future<Output = ()>,
    {
        info!(
            "Watching {} every {:?} for price {}",
            self.source.location(),
            self.poll_interval,
            self.target
        );

        tokio::pin!(shutdown);

        loop {
            let observed = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping watcher");
                    return TerminationReason::Interrupted;
                }
                observed = self.observe() => observed,
            };

            let state = match observed {
                Ok(observed_price) => self.evaluate(observed_price).await,
                Err(_) => WatchState::Terminated(TerminationReason::ExtractionFailed),
            };

            if let WatchState::Terminated(reason) = state {
                info!("Watcher finished: {:?}", reason);
                return reason;
            }

            info!("Next check in {:?}", self.poll_interval);
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping watcher");
                    return TerminationReason::Interrupted;
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
    }
}
