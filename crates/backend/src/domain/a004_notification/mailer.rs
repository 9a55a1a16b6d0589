use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::MailConfig;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Upper bound of addresses per message accepted by the provider
pub const MAX_RECIPIENTS_PER_MESSAGE: usize = 50;

/// One message; subscribers go into `bcc` so they never see each other
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl OutgoingMail {
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.bcc.len()
    }

    fn check(&self) -> Result<(), MailError> {
        if self.to.is_empty() {
            return Err(MailError::InvalidMessage("no recipients".into()));
        }
        if self.recipient_count() > MAX_RECIPIENTS_PER_MESSAGE + 1 {
            return Err(MailError::InvalidMessage(format!(
                "{} recipients exceed the per-message limit",
                self.recipient_count()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

/// Outgoing mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message, returning the provider's message id when known
    async fn send(&self, mail: &OutgoingMail) -> Result<Option<String>, MailError>;

    fn provider_name(&self) -> &str;
}

/// Resend HTTP API
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| MailError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<Option<String>, MailError> {
        mail.check()?;

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(mail)
            .send()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ResendResponse = response
            .json()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;
        Ok(parsed.id)
    }

    fn provider_name(&self) -> &str {
        "resend"
    }
}

/// Writes mails to the log instead of sending them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<Option<String>, MailError> {
        mail.check()?;
        tracing::info!(
            "Mail not sent (no API key configured): '{}' to {} recipient(s)",
            mail.subject,
            mail.recipient_count()
        );
        Ok(None)
    }

    fn provider_name(&self) -> &str {
        "log"
    }
}

/// Resend when an API key is configured, the log otherwise
pub fn from_config(config: &MailConfig) -> Result<Box<dyn Mailer>, MailError> {
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(Box::new(ResendMailer::new(key)?)),
        _ => Ok(Box::new(LogMailer)),
    }
}
