use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mail endpoint returned {0}")]
    Status(u16),
}

/// Outbound email collaborator. Only the forgot-password flow uses it; a
/// delivery failure there must surface to the caller because the reset
/// token was already minted but never reached the user.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), MailerError>;
}

#[derive(Serialize)]
struct ResetMailPayload<'a> {
    to: &'a str,
    template: &'static str,
    token: &'a str,
}

/// Posts reset mails to an external delivery endpoint as JSON.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), MailerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ResetMailPayload {
                to,
                template: "password_reset",
                token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailerError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Development fallback when no MAIL_ENDPOINT is configured: logs instead of
/// sending. Never fails.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, _token: &str) -> Result<(), MailerError> {
        tracing::info!(to, "password reset requested (mail delivery not configured)");
        Ok(())
    }
}
