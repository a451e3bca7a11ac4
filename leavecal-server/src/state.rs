use std::sync::Arc;

use anyhow::Result;
use leavecal_core::config::LeavecalConfig;
use leavecal_core::mail::HttpMailTransport;
use leavecal_core::store::JsonFileStore;
use leavecal_core::{CalendarExporter, Tenant};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    exporter: CalendarExporter,
    tenants: Arc<Vec<Tenant>>,
    can_send: bool,
}

impl AppState {
    pub fn new(config: &LeavecalConfig) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(config.data_path()));
        let exporter = CalendarExporter::new(store);

        let exporter = match &config.mail {
            Some(mail) => exporter.with_mail(Arc::new(HttpMailTransport::new(mail.clone())?)),
            None => exporter,
        };

        Ok(AppState::with_exporter(
            exporter,
            config.tenants.clone(),
            config.mail.is_some(),
        ))
    }

    pub fn with_exporter(exporter: CalendarExporter, tenants: Vec<Tenant>, can_send: bool) -> Self {
        AppState {
            exporter,
            tenants: Arc::new(tenants),
            can_send,
        }
    }

    pub fn exporter(&self) -> &CalendarExporter {
        &self.exporter
    }

    pub fn can_send(&self) -> bool {
        self.can_send
    }

    /// Only configured tenants may export.
    pub fn tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }
}
