use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::http_client::post_json;

/// Outbound email capability.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()>;
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    recipients: &'a [String],
    subject: &'a str,
    message: &'a str,
}

/// Hands alerts to an HTTP mail gateway which owns the SMTP session.
pub struct HttpMailRelay {
    http: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpMailRelay {
    pub fn new(http: Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailRelay {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        if recipients.is_empty() {
            bail!("No alert recipients configured");
        }
        post_json(
            &self.http,
            &self.url,
            &RelayRequest {
                recipients,
                subject,
                message: body,
            },
            self.api_key.as_deref(),
        )
        .await?;
        info!("Email alert relayed to {} recipients", recipients.len());
        Ok(())
    }
}

/// Used when no relay is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        warn!(
            "No mail relay configured; alert for {:?} not sent. {subject}: {}",
            recipients,
            body.replace('\n', " | ")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_request_uses_gateway_field_names() {
        let recipients = vec!["ops@example.com".to_string()];
        let body = serde_json::to_value(RelayRequest {
            recipients: &recipients,
            subject: "s",
            message: "m",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"recipients": ["ops@example.com"], "subject": "s", "message": "m"})
        );
    }

    #[tokio::test]
    async fn relay_refuses_empty_recipient_list() {
        let relay = HttpMailRelay::new(Client::new(), "http://127.0.0.1:9/mail", None);
        let error = relay.send(&[], "subject", "body").await.unwrap_err();
        assert!(error.to_string().contains("No alert recipients"));
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        assert!(LogMailer
            .send(&["a@example.com".to_string()], "subject", "line1\nline2")
            .await
            .is_ok());
    }
}
