//! Mail relay notifier
//!
//! POSTs `{from, to, subject, body}` as JSON to `notification.relay_url`,
//! with `Authorization: Bearer <relay_token>` when a token is configured.

use super::{Notification, NotificationOutcome, Notifier};
use crate::config::{NotificationConfig, SecretString};
use crate::domain::{ClinicError, Result};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;

/// Sends notifications through an HTTP mail relay
pub struct HttpRelayNotifier {
    http_client: reqwest::Client,
    relay_url: String,
    relay_token: Option<SecretString>,
}

impl HttpRelayNotifier {
    /// Build a relay notifier from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `relay_url` is missing or the HTTP client cannot
    /// be created.
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        let relay_url = config
            .relay_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                ClinicError::Configuration(
                    "notification.relay_url is required for the http backend".to_string(),
                )
            })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                ClinicError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(relay_url = %relay_url, "Mail relay notifier initialized");

        Ok(Self {
            http_client,
            relay_url,
            relay_token: config.relay_token.clone(),
        })
    }
}

#[async_trait]
impl Notifier for HttpRelayNotifier {
    async fn deliver(&self, notification: &Notification) -> NotificationOutcome {
        let mut request = self
            .http_client
            .post(&self.relay_url)
            .header("Content-Type", "application/json")
            .json(notification);
        if let Some(token) = &self.relay_token {
            request = request.bearer_auth(token.expose_secret().as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return NotificationOutcome::Failed(format!("relay unreachable: {e}")),
        };

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, to = %notification.to, "Relay accepted email");
            NotificationOutcome::Sent
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            NotificationOutcome::Failed(format!("relay returned {status}: {error_body}"))
        }
    }
}
