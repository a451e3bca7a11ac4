pub mod export;
pub mod init;
pub mod status;

use std::sync::Arc;

use anyhow::Result;
use leavecal_core::CalendarExporter;
use leavecal_core::config::LeavecalConfig;
use leavecal_core::mail::HttpMailTransport;
use leavecal_core::store::JsonFileStore;

/// Exporter over the configured store, with mail delivery when `[mail]` is set.
pub fn build_exporter(config: &LeavecalConfig) -> Result<CalendarExporter> {
    let exporter = CalendarExporter::new(Arc::new(JsonFileStore::new(config.data_path())));

    Ok(match &config.mail {
        Some(mail) => exporter.with_mail(Arc::new(HttpMailTransport::new(mail.clone())?)),
        None => exporter,
    })
}
