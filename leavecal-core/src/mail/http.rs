//! Mail delivery through an HTTP mail API.
//!
//! Posts `{ from, to, subject, html, attachments: [{ filename, content, content_type }] }`
//! with a bearer key, `content` being the base64 attachment bytes.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mail::{MailError, MailResult, MailTransport, OutgoingMail, is_plausible_address};

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMailConfig {
    /// Endpoint that accepts the JSON message, e.g. `https://api.resend.com/emails`.
    pub api_url: String,
    pub api_key: String,
    /// Sender, e.g. `Leave Planner <calendar@example.com>`.
    pub from: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content: String,
    content_type: &'a str,
}

pub struct HttpMailTransport {
    client: reqwest::Client,
    config: HttpMailConfig,
}

impl HttpMailTransport {
    pub fn new(config: HttpMailConfig) -> MailResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpMailTransport { client, config })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> MailResult<()> {
        if !is_plausible_address(&mail.to) {
            return Err(MailError::InvalidAddress(mail.to.clone()));
        }

        let payload = MailPayload {
            from: &self.config.from,
            to: vec![mail.to.as_str()],
            subject: &mail.subject,
            html: &mail.html,
            attachments: vec![AttachmentPayload {
                filename: &mail.attachment.filename,
                content: mail.attachment.base64_content(),
                content_type: &mail.attachment.content_type,
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %mail.to, status = status.as_u16(), "mail accepted");
        Ok(())
    }
}
