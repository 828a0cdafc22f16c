//! Price alert notifications
//!
//! A fired alert goes to two places: a transient desktop popup, which is
//! best-effort, and the console plus log, which always happens.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::NotificationError;

/// Format of the timestamp embedded in alert messages
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// One price alert, ready to be shown
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub title: String,
    pub message: String,
    pub price: f64,
    pub observed_at: DateTime<Tz>,
    /// Display duration hint for the popup
    pub timeout: Duration,
}

impl PriceAlert {
    /// Build an alert for `price` observed at `now`, stamped in `tz`
    pub fn new(
        title: impl Into<String>,
        price: f64,
        now: DateTime<Utc>,
        tz: Tz,
        timeout: Duration,
    ) -> Self {
        let observed_at = now.with_timezone(&tz);
        let message = format!(
            "The price of the course is on offer: {}! {}",
            price,
            observed_at.format(TIMESTAMP_FORMAT)
        );

        Self { title: title.into(), message, price, observed_at, timeout }
    }
}

/// Delivers alerts to the user
#[async_trait::async_trait]
pub trait Notifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<(), NotificationError>;
}

/// Shows alerts through the platform's notification tool
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<(), NotificationError> {
        let (tool, mut command) = popup_command(alert)?;
        debug!("Showing desktop notification via {}", tool);

        let status = command
            .status()
            .await
            .map_err(|source| NotificationError::Spawn { tool, source })?;

        if !status.success() {
            return Err(NotificationError::Failed { tool, status });
        }

        Ok(())
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn popup_command(alert: &PriceAlert) -> Result<(&'static str, Command), NotificationError> {
    let mut command = Command::new("notify-send");
    command
        .arg("-t")
        .arg(alert.timeout.as_millis().to_string())
        .arg(&alert.title)
        .arg(&alert.message);
    Ok(("notify-send", command))
}

#[cfg(target_os = "macos")]
fn popup_command(alert: &PriceAlert) -> Result<(&'static str, Command), NotificationError> {
    // Notification Center decides how long banners stay up; the timeout is dropped.
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript(&alert.message),
        escape_applescript(&alert.title)
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(script);
    Ok(("osascript", command))
}

#[cfg(target_os = "macos")]
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(windows)]
fn popup_command(alert: &PriceAlert) -> Result<(&'static str, Command), NotificationError> {
    let mut command = Command::new("msg");
    command
        .arg("*")
        .arg(format!("/TIME:{}", alert.timeout.as_secs()))
        .arg(format!("{}: {}", alert.title, alert.message));
    Ok(("msg", command))
}

#[cfg(not(any(unix, windows)))]
fn popup_command(_alert: &PriceAlert) -> Result<(&'static str, Command), NotificationError> {
    Err(NotificationError::Unsupported)
}

/// Show `alert` and record it on the console.
///
/// Popup failures are logged and swallowed. Returns whether the popup was
/// shown.
pub async fn deliver_alert<N>(notifier: &N, alert: &PriceAlert) -> bool
where
    N: Notifier + Sync + ?Sized,
{
    let shown = match notifier.notify(alert).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Desktop notification failed, falling back to console: {}", e);
            false
        }
    };

    println!("{}", alert.message);
    info!(price = alert.price, "{}", alert.message);

    shown
}
