use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Outgoing email handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Failure to hand an email over to the delivery channel.
#[derive(Debug, Error)]
pub enum MailerError {
    #[cfg(feature = "webhook-mailer")]
    #[error("mail relay request failed")]
    Request(#[from] reqwest::Error),
    #[error("mail relay rejected the message with status {status}")]
    Rejected { status: u16 },
}

/// Delivery channel for outgoing emails.
pub trait Mailer: Send + Sync {
    fn send(&self, email: Email) -> BoxFuture<'static, Result<(), MailerError>>;
}

/// Mailer that only records the email in the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: Email) -> BoxFuture<'static, Result<(), MailerError>> {
        Box::pin(async move {
            info!(
                from = %email.from,
                to = %email.to,
                subject = %email.subject,
                "email delivery skipped (no mail relay configured)"
            );
            Ok(())
        })
    }
}

/// Mailer posting each email as JSON to an HTTP mail relay.
#[cfg(feature = "webhook-mailer")]
#[derive(Debug, Clone)]
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "webhook-mailer")]
impl WebhookMailer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn post(&self, email: Email) -> Result<(), MailerError> {
        let response = self.client.post(&self.url).json(&email).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MailerError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(to = %email.to, subject = %email.subject, "email handed to mail relay");
        Ok(())
    }
}

#[cfg(feature = "webhook-mailer")]
impl Mailer for WebhookMailer {
    fn send(&self, email: Email) -> BoxFuture<'static, Result<(), MailerError>> {
        let mailer = self.clone();
        Box::pin(async move { mailer.post(email).await })
    }
}
