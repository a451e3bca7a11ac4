use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use leavecal_core::config::LeavecalConfig;
use leavecal_core::sync::{RecordFilter, SyncMode};
use leavecal_core::{ExportOutcome, SyncRequest};
use owo_colors::OwoColorize;

use super::build_exporter;
use crate::utils::tui;

pub struct ExportArgs {
    pub to: Option<String>,
    pub mode: SyncMode,
    pub include_leaves: bool,
    pub include_holidays: bool,
    pub location: Option<String>,
    pub download: bool,
    pub output: Option<PathBuf>,
    pub tenant: Option<String>,
}

impl ExportArgs {
    fn request(&self) -> SyncRequest {
        let filter = RecordFilter {
            include_leaves: self.include_leaves,
            include_holidays: self.include_holidays,
            location: None,
        }
        .with_location(self.location.as_deref());

        SyncRequest {
            recipient: self.to.clone(),
            mode: self.mode,
            filter,
            download_only: self.download,
        }
    }
}

pub async fn run(config: &LeavecalConfig, args: ExportArgs) -> Result<()> {
    let tenant = config.tenant(args.tenant.as_deref())?;
    let exporter = build_exporter(config)?;
    let request = args.request();

    if args.download {
        let outcome = exporter.export(tenant, &request, Utc::now()).await?;
        return write_download(&outcome, args.output.as_ref());
    }

    let recipient = args.to.as_deref().unwrap_or_default();
    let spinner = tui::create_spinner(format!(
        "Sending {} calendar to {}",
        tenant.name.bold(),
        recipient
    ));
    let result = exporter.export(tenant, &request, Utc::now()).await;
    spinner.finish_and_clear();

    let outcome = result?;
    println!("{} {}", "✓".green(), outcome.message());
    print_counts(&outcome);

    if let Some(warning) = outcome.warning() {
        println!("\n{} {}", "!".yellow(), warning.yellow());
    }

    Ok(())
}

fn print_counts(outcome: &ExportOutcome) {
    println!("   Leave:    {}", outcome.leave_count());
    println!("   Holidays: {}", outcome.holiday_count());
    println!(
        "   Mode:     {}",
        match outcome.mode {
            SyncMode::NewOnly => "new leave only",
            SyncMode::All => "all approved leave",
        }
        .dimmed()
    );
}

fn write_download(outcome: &ExportOutcome, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, &outcome.document.content)?;
            println!("{} {}", "✓".green(), outcome.message());
            print_counts(outcome);
            println!("   Written:  {}", path.display());
        }
        None => print!("{}", outcome.document.content),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ExportArgs {
        ExportArgs {
            to: Some("hr@acme.test".to_string()),
            mode: SyncMode::All,
            include_leaves: true,
            include_holidays: false,
            location: Some("  sg ".to_string()),
            download: false,
            output: None,
            tenant: None,
        }
    }

    #[test]
    fn test_request_from_args() {
        let request = args().request();

        assert_eq!(request.recipient.as_deref(), Some("hr@acme.test"));
        assert_eq!(request.mode, SyncMode::All);
        assert!(request.filter.include_leaves);
        assert!(!request.filter.include_holidays);
        assert_eq!(request.filter.location.as_deref(), Some("sg"));
        assert!(!request.download_only);
    }

    #[test]
    fn test_blank_location_means_everywhere() {
        let mut args = args();
        args.location = Some("   ".to_string());
        assert_eq!(args.request().filter.location, None);
    }
}
