use anyhow::Result;
use leavecal_core::config::LeavecalConfig;
use leavecal_core::store::{JsonFileStore, LeaveStore, Records};
use leavecal_core::sync::{RecordFilter, SendState};
use owo_colors::OwoColorize;

use crate::utils::tui;

/// Counts shown by `leavecal status`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    unsent: usize,
    sent: usize,
    holidays: usize,
}

impl Summary {
    fn from_records(records: &Records) -> Self {
        let unsent = records
            .leaves
            .iter()
            .filter(|l| l.send_state() == SendState::Unsent)
            .count();

        Summary {
            unsent,
            sent: records.leaves.len() - unsent,
            holidays: records.holidays.len(),
        }
    }
}

pub async fn run(config: &LeavecalConfig, tenant: Option<&str>, location: Option<&str>) -> Result<()> {
    let tenant = config.tenant(tenant)?;
    let store = JsonFileStore::new(config.data_path());
    let filter = RecordFilter::default().with_location(location);

    let spinner = tui::create_spinner(tenant.name.clone());
    let result = store.fetch(tenant, &filter).await;
    spinner.finish_and_clear();

    let summary = Summary::from_records(&result?);

    println!("{} {}", tenant.name.bold(), format!("({})", tenant.id).dimmed());
    if let Some(location) = &filter.location {
        println!("   Location: {}", location);
    }

    if summary.unsent > 0 {
        println!(
            "   {} approved leave not yet sent",
            summary.unsent.to_string().green()
        );
    } else {
        println!("   {}", "No new leave to send".dimmed());
    }
    println!("   {} approved leave already sent", summary.sent);
    println!("   {} office holidays", summary.holidays);
    println!("   {}", format!("Store: {}", store.path().display()).dimmed());

    if config.mail.is_none() {
        println!(
            "\n{}",
            "No [mail] section configured: exports can only be downloaded.".yellow()
        );
    }

    Ok(())
}
