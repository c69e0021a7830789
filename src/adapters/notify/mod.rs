//! Booking confirmation delivery
//!
//! Delivery is best-effort: a [`Notifier`] never returns an error, only a
//! [`NotificationOutcome`] that callers log and attach to their result.
//!
//! Backends, selected by `notification.backend`:
//! - [`LogNotifier`] writes the message to the tracing log
//! - [`HttpRelayNotifier`] POSTs the message as JSON to a mail relay
//! - [`DisabledNotifier`] drops every message

pub mod http;

pub use http::HttpRelayNotifier;

use crate::config::{NotificationBackend, NotificationConfig};
use crate::domain::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// An outbound email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// What happened to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Handed to the delivery backend
    Sent,
    /// Not attempted (no recipient address, backend disabled)
    Skipped(String),
    /// Attempted and failed
    Failed(String),
}

impl NotificationOutcome {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            NotificationOutcome::Sent => "sent",
            NotificationOutcome::Skipped(_) => "skipped",
            NotificationOutcome::Failed(_) => "failed",
        }
    }

    /// The reason for a skip or failure, empty when sent
    pub fn detail(&self) -> &str {
        match self {
            NotificationOutcome::Sent => "",
            NotificationOutcome::Skipped(reason) | NotificationOutcome::Failed(reason) => reason,
        }
    }
}

impl fmt::Display for NotificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationOutcome::Sent => f.write_str("sent"),
            other => write!(f, "{}: {}", other.label(), other.detail()),
        }
    }
}

/// Delivers notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt delivery; never fails the caller
    async fn deliver(&self, notification: &Notification) -> NotificationOutcome;
}

/// Writes each message to the log instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> NotificationOutcome {
        tracing::info!(
            from = %notification.from,
            to = %notification.to,
            subject = %notification.subject,
            body = %notification.body,
            "Email (log backend)"
        );
        NotificationOutcome::Sent
    }
}

/// Drops every message
#[derive(Debug, Default, Clone)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn deliver(&self, _notification: &Notification) -> NotificationOutcome {
        NotificationOutcome::Skipped("notifications disabled".to_string())
    }
}

/// Create the notifier selected by the configuration
///
/// # Errors
///
/// Returns an error if the HTTP client for the relay cannot be built.
pub fn create_notifier(config: &NotificationConfig) -> Result<Arc<dyn Notifier>> {
    match config.backend {
        NotificationBackend::Log => Ok(Arc::new(LogNotifier)),
        NotificationBackend::Disabled => Ok(Arc::new(DisabledNotifier)),
        NotificationBackend::Http => Ok(Arc::new(HttpRelayNotifier::new(config)?)),
    }
}
