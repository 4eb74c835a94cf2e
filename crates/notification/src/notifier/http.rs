//! HTTP notifier posting messages to a WhatsApp gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{NotificationResult, Notifier};
use crate::error::{NotificationError, Result};

/// HTTP notifier configuration.
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Endpoint receiving `{to, message}` as JSON.
    pub url: String,

    /// Optional bearer token.
    pub token: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl HttpNotifierConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    to: &'a str,
    message: &'a str,
}

/// Posts messages to a notification service over HTTP.
pub struct HttpNotifier {
    client: Client,
    config: HttpNotifierConfig,
}

impl HttpNotifier {
    pub fn new(config: HttpNotifierConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(NotificationError::Config(
                "notifier URL not configured".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[tracing::instrument(skip(self, body), fields(url = %self.config.url))]
    async fn send(&self, to: &str, body: &str) -> Result<NotificationResult> {
        let mut request = self.client.post(&self.config.url).json(&OutgoingMessage {
            to,
            message: body,
        });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let result: NotificationResult = response.json().await?;
        tracing::debug!(success = result.success, "notification service responded");
        Ok(result)
    }
}
