//! Outbound mail.
//!
//! The service only needs one operation: deliver an HTML message to one
//! recipient. [`HttpMailer`] posts to an HTTP relay; [`NoopMailer`] backs
//! tests and unconfigured development environments.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

/// Mail delivery failed.
#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Configuration for the HTTP mail relay.
#[derive(Clone, Debug)]
pub struct MailConfig {
    /// Relay endpoint messages are posted to.
    pub url: String,
    /// Relay credentials.
    pub username: String,
    pub password: String,
}

impl MailConfig {
    /// Sender identity used when none is given per message.
    pub fn default_from(&self) -> String {
        format!("\"Support To Do\" <{}>", self.username)
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// Mailer that posts messages to an HTTP relay.
pub struct HttpMailer {
    config: MailConfig,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let body = json!({
            "from": self.config.default_from(),
            "to": to,
            "subject": subject,
            "html": html,
        });

        let response = self
            .client
            .post(&self.config.url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError(format!("relay returned {}", response.status())));
        }
        Ok(())
    }
}

/// Mailer that records the send and delivers nothing.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), MailError> {
        info!(to, subject, "mail delivery skipped (no mailer configured)");
        Ok(())
    }
}
