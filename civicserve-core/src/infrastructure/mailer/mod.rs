//! Outbound mail.
//!
//! Mail mirrors important live notifications for users who are offline.
//! Delivery is always best-effort; callers log failures and move on.

use async_trait::async_trait;
use log::debug;

use crate::foundation::{CivicError, Result};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one update mail. `kind` is the notification kind the mail
    /// mirrors and ends up in the relay payload for templating.
    async fn send(&self, to: &str, title: &str, kind: &str, message: &str) -> Result<()>;
}

/// Logs instead of sending. The default when no relay is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, title: &str, kind: &str, message: &str) -> Result<()> {
        debug!(
            "mail suppressed to={} kind={} title={} bytes={}",
            to,
            kind,
            title,
            message.len()
        );
        Ok(())
    }
}

/// Posts mail jobs to an HTTP relay that owns SMTP credentials.
pub struct RelayMailer {
    client: reqwest::Client,
    relay_url: String,
    from_address: String,
}

impl RelayMailer {
    pub fn new(relay_url: String, from_address: String) -> Self {
        RelayMailer { client: reqwest::Client::new(), relay_url, from_address }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, to: &str, title: &str, kind: &str, message: &str) -> Result<()> {
        let payload = serde_json::json!({
            "from": self.from_address,
            "to": to,
            "subject": format!("Service Request Update - {title}"),
            "kind": kind,
            "body": message,
        });
        let response = self
            .client
            .post(&self.relay_url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| CivicError::Mail { recipient: to.to_string(), details: err.to_string() })?;
        if !response.status().is_success() {
            return Err(CivicError::Mail {
                recipient: to.to_string(),
                details: format!("relay returned {}", response.status()),
            });
        }
        debug!("mail relayed to={} kind={} title={}", to, kind, title);
        Ok(())
    }
}
