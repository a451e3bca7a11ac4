//! Delivering the calendar as an email attachment.

mod http;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::ics::{CONTENT_TYPE, CalendarDocument, attachment_filename};
use crate::record::Tenant;
use crate::sync::SyncMode;

pub use http::{HttpMailConfig, HttpMailTransport};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail service rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

pub type MailResult<T> = Result<T, MailError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn base64_content(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment: Attachment,
}

/// Anything that can hand a message to a mail service.
///
/// Implementations report failure and do not retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> MailResult<()>;
}

/// Minimal shape check: something on both sides of a single `@`.
pub fn is_plausible_address(address: &str) -> bool {
    let address = address.trim();
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Build the email carrying `document` for `tenant`.
pub fn compose_calendar_mail(
    tenant: &Tenant,
    recipient: &str,
    document: &CalendarDocument,
    mode: SyncMode,
) -> OutgoingMail {
    let tenant_name = html_escape(&tenant.name);
    let scope = match mode {
        SyncMode::NewOnly => "new leave since the last export",
        SyncMode::All => "all approved leave",
    };

    let html = format!(
        "<h2>{tenant_name} leave calendar</h2>\
         <p>The attached calendar contains {scope}.</p>\
         <ul>\
         <li>Leave events: {leaves}</li>\
         <li>Office holidays: {holidays}</li>\
         <li>Total events: {total}</li>\
         </ul>\
         <p>Open the attachment to import it. Events from earlier exports are \
         updated in place, not duplicated.</p>",
        leaves = document.leave_count(),
        holidays = document.holiday_count,
        total = document.total_events(),
    );

    OutgoingMail {
        to: recipient.trim().to_string(),
        subject: format!("{} leave calendar", tenant.name.trim()),
        html,
        attachment: Attachment {
            filename: attachment_filename(&tenant.name),
            content_type: CONTENT_TYPE.to_string(),
            content: document.content.as_bytes().to_vec(),
        },
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
