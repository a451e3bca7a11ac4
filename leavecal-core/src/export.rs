//! One export: validate, fetch, select, render, deliver, mark.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Instrument, error, info, info_span};

use crate::error::{ExportError, ExportResult};
use crate::ics::{CalendarDocument, render_document};
use crate::mail::{MailTransport, compose_calendar_mail, is_plausible_address};
use crate::record::Tenant;
use crate::store::{LeaveStore, ObservedLeave};
use crate::sync::{MarkReport, RecordFilter, SyncMode, mark_sent, select_holidays, select_leaves};

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Required unless `download_only`.
    pub recipient: Option<String>,
    pub mode: SyncMode,
    pub filter: RecordFilter,
    /// Return the document without emailing it or marking anything.
    pub download_only: bool,
}

impl SyncRequest {
    pub fn send_to(recipient: impl Into<String>, mode: SyncMode) -> Self {
        SyncRequest {
            recipient: Some(recipient.into()),
            mode,
            filter: RecordFilter::default(),
            download_only: false,
        }
    }

    pub fn download(mode: SyncMode) -> Self {
        SyncRequest {
            recipient: None,
            mode,
            filter: RecordFilter::default(),
            download_only: true,
        }
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The trimmed recipient, checked only when it will be used.
    fn validated_recipient(&self) -> ExportResult<Option<&str>> {
        if self.download_only {
            return Ok(None);
        }

        let recipient = self
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ExportError::InvalidRequest("Recipient email is required".into()))?;

        if !is_plausible_address(recipient) {
            return Err(ExportError::InvalidRequest(format!(
                "Invalid recipient email: {}",
                recipient
            )));
        }

        Ok(Some(recipient))
    }
}

/// Result of a completed export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub document: CalendarDocument,
    pub mode: SyncMode,
    /// Recipient the document was emailed to; `None` for downloads.
    pub delivered_to: Option<String>,
    pub mark: MarkReport,
}

impl ExportOutcome {
    pub fn leave_count(&self) -> usize {
        self.document.leave_count()
    }

    pub fn holiday_count(&self) -> usize {
        self.document.holiday_count
    }

    pub fn total_events(&self) -> usize {
        self.document.total_events()
    }

    /// Human-readable confirmation.
    pub fn message(&self) -> String {
        match &self.delivered_to {
            Some(recipient) => format!(
                "Calendar with {} events ({} leave, {} holidays) sent to {}",
                self.total_events(),
                self.leave_count(),
                self.holiday_count(),
                recipient
            ),
            None => format!(
                "Calendar with {} events ({} leave, {} holidays) ready for download",
                self.total_events(),
                self.leave_count(),
                self.holiday_count()
            ),
        }
    }

    pub fn warning(&self) -> Option<String> {
        self.mark.warning()
    }
}

/// Runs exports against a store and, optionally, a mail transport.
#[derive(Clone)]
pub struct CalendarExporter {
    store: Arc<dyn LeaveStore>,
    mail: Option<Arc<dyn MailTransport>>,
}

impl CalendarExporter {
    pub fn new(store: Arc<dyn LeaveStore>) -> Self {
        CalendarExporter { store, mail: None }
    }

    pub fn with_mail(mut self, mail: Arc<dyn MailTransport>) -> Self {
        self.mail = Some(mail);
        self
    }

    /// Run one export. `now` is both the DTSTAMP of every event and the
    /// timestamp written to delivered leave records.
    pub async fn export(
        &self,
        tenant: &Tenant,
        request: &SyncRequest,
        now: DateTime<Utc>,
    ) -> ExportResult<ExportOutcome> {
        let span = info_span!("export", tenant = %tenant.id, mode = %request.mode);
        self.run(tenant, request, now).instrument(span).await
    }

    async fn run(
        &self,
        tenant: &Tenant,
        request: &SyncRequest,
        now: DateTime<Utc>,
    ) -> ExportResult<ExportOutcome> {
        if tenant.id.trim().is_empty() {
            return Err(ExportError::UnknownTenant("(empty tenant id)".into()));
        }
        let recipient = request.validated_recipient()?;
        let mail = match (recipient, &self.mail) {
            (Some(_), None) => {
                return Err(ExportError::InvalidRequest(
                    "No mail transport configured; only downloads are possible".into(),
                ));
            }
            (_, mail) => mail,
        };

        let records = self
            .store
            .fetch(tenant, &request.filter)
            .await
            .inspect_err(|e| error!(error = %e, "fetching records failed"))?;

        let leaves = select_leaves(records.leaves, &request.filter, request.mode);
        let holidays = select_holidays(records.holidays, &request.filter);
        info!(
            leaves = leaves.len(),
            holidays = holidays.len(),
            "selected records"
        );

        let document = render_document(tenant, &leaves, &holidays, now).map_err(|source| {
            error!(error = %source, "rendering calendar failed");
            ExportError::Render {
                leaves: leaves.len(),
                holidays: holidays.len(),
                source,
            }
        })?;

        let (Some(recipient), Some(mail)) = (recipient, mail) else {
            info!(events = document.total_events(), "calendar rendered for download");
            return Ok(ExportOutcome {
                document,
                mode: request.mode,
                delivered_to: None,
                mark: MarkReport::NotAttempted,
            });
        };

        let message = compose_calendar_mail(tenant, recipient, &document, request.mode);
        mail.send(&message).await.map_err(|source| {
            error!(error = %source, "delivering calendar failed");
            ExportError::Delivery {
                leaves: document.leave_count(),
                holidays: document.holiday_count,
                source,
            }
        })?;
        info!(to = %recipient, events = document.total_events(), "calendar delivered");

        let observed: Vec<ObservedLeave> = leaves.iter().map(ObservedLeave::from).collect();
        let mark = mark_sent(self.store.as_ref(), tenant, &observed, now).await;

        Ok(ExportOutcome {
            document,
            mode: request.mode,
            delivered_to: Some(recipient.to_string()),
            mark,
        })
    }
}
