//! Choosing which records go into an export.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{HolidayEvent, LeaveEvent};

/// Which leave records an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Only leave that has never been delivered.
    #[default]
    NewOnly,
    /// Every eligible leave, delivered or not.
    All,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::NewOnly => "new_only",
            SyncMode::All => "all",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new_only" | "new-only" | "new" => Ok(SyncMode::NewOnly),
            "all" => Ok(SyncMode::All),
            other => Err(format!(
                "Unknown send mode '{}'. Expected 'new_only' or 'all'",
                other
            )),
        }
    }
}

/// Delivery state of a leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Unsent,
    Sent(DateTime<Utc>),
}

impl LeaveEvent {
    pub fn send_state(&self) -> SendState {
        match self.sent_at {
            Some(at) => SendState::Sent(at),
            None => SendState::Unsent,
        }
    }
}

/// Record kinds and office scope of an export. Applied regardless of mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub include_leaves: bool,
    pub include_holidays: bool,
    /// Office code; `None` matches every record.
    pub location: Option<String>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        RecordFilter {
            include_leaves: true,
            include_holidays: true,
            location: None,
        }
    }
}

impl RecordFilter {
    pub fn with_location(mut self, location: Option<&str>) -> Self {
        self.location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from);
        self
    }

    /// Leave without an office only matches when no location is requested.
    pub fn matches_leave(&self, leave: &LeaveEvent) -> bool {
        match (&self.location, &leave.location) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => same_location(wanted, actual),
            (Some(_), None) => false,
        }
    }

    /// Holidays without a location are tenant-wide and match every filter.
    pub fn matches_holiday(&self, holiday: &HolidayEvent) -> bool {
        match (&self.location, &holiday.location) {
            (None, _) | (Some(_), None) => true,
            (Some(wanted), Some(actual)) => same_location(wanted, actual),
        }
    }
}

fn same_location(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Pick the leave records to render, preserving input order.
pub fn select_leaves(
    leaves: Vec<LeaveEvent>,
    filter: &RecordFilter,
    mode: SyncMode,
) -> Vec<LeaveEvent> {
    if !filter.include_leaves {
        return Vec::new();
    }

    leaves
        .into_iter()
        .filter(|leave| filter.matches_leave(leave))
        .filter(|leave| match (mode, leave.send_state()) {
            (SyncMode::All, _) | (SyncMode::NewOnly, SendState::Unsent) => true,
            (SyncMode::NewOnly, SendState::Sent(at)) => {
                debug!(leave_id = %leave.id, sent_at = %at, "skipping leave already sent");
                false
            }
        })
        .collect()
}

/// Pick the holidays to render. Send state never applies to holidays.
pub fn select_holidays(holidays: Vec<HolidayEvent>, filter: &RecordFilter) -> Vec<HolidayEvent> {
    if !filter.include_holidays {
        return Vec::new();
    }

    holidays
        .into_iter()
        .filter(|holiday| filter.matches_holiday(holiday))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DurationType, LeaveId};
    use chrono::{NaiveDate, TimeZone};

    fn leave(id: &str, sent: bool, location: Option<&str>) -> LeaveEvent {
        let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        LeaveEvent {
            id: LeaveId::new(id),
            ics_uid: format!("uid-{}", id),
            start_date: day,
            end_date: day,
            duration_type: DurationType::FullDay,
            total_hours: 8.0,
            remark: None,
            member_name: "Bob".to_string(),
            leave_type: "Sick Leave".to_string(),
            location: location.map(String::from),
            sent_at: sent.then(|| Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()),
        }
    }

    fn holiday(id: &str, location: Option<&str>) -> HolidayEvent {
        HolidayEvent {
            id: id.to_string(),
            name: "Holiday".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end_date: None,
            location: location.map(String::from),
        }
    }

    fn ids(leaves: &[LeaveEvent]) -> Vec<&str> {
        leaves.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_new_only_skips_sent_records() {
        let leaves = vec![leave("a", false, None), leave("b", true, None), leave("c", false, None)];
        let selected = select_leaves(leaves, &RecordFilter::default(), SyncMode::NewOnly);
        assert_eq!(ids(&selected), vec!["a", "c"]);
    }

    #[test]
    fn test_all_includes_sent_records() {
        let leaves = vec![leave("a", false, None), leave("b", true, None), leave("c", false, None)];
        let selected = select_leaves(leaves, &RecordFilter::default(), SyncMode::All);
        assert_eq!(ids(&selected), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_excluded_leaves_yield_nothing() {
        let filter = RecordFilter {
            include_leaves: false,
            ..RecordFilter::default()
        };
        let selected = select_leaves(vec![leave("a", false, None)], &filter, SyncMode::All);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_location_filter_on_leaves() {
        let filter = RecordFilter::default().with_location(Some(" sg "));
        let leaves = vec![
            leave("sg", false, Some("SG")),
            leave("kl", false, Some("KL")),
            leave("none", false, None),
        ];
        let selected = select_leaves(leaves, &filter, SyncMode::All);
        assert_eq!(ids(&selected), vec!["sg"]);
    }

    #[test]
    fn test_tenant_wide_holidays_match_every_location() {
        let filter = RecordFilter::default().with_location(Some("SG"));
        let holidays = vec![
            holiday("sg", Some("SG")),
            holiday("kl", Some("KL")),
            holiday("all", None),
        ];
        let selected = select_holidays(holidays, &filter);
        let ids: Vec<_> = selected.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["sg", "all"]);
    }

    #[test]
    fn test_blank_location_means_no_filter() {
        let filter = RecordFilter::default().with_location(Some("   "));
        assert_eq!(filter.location, None);
        assert!(filter.matches_leave(&leave("a", false, None)));
    }

    #[test]
    fn test_holidays_ignore_mode_and_can_be_excluded() {
        let filter = RecordFilter {
            include_holidays: false,
            ..RecordFilter::default()
        };
        assert!(select_holidays(vec![holiday("h", None)], &filter).is_empty());
        assert_eq!(
            select_holidays(vec![holiday("h", None)], &RecordFilter::default()).len(),
            1
        );
    }

    #[test]
    fn test_sync_mode_parsing() {
        assert_eq!("new_only".parse::<SyncMode>(), Ok(SyncMode::NewOnly));
        assert_eq!("new-only".parse::<SyncMode>(), Ok(SyncMode::NewOnly));
        assert_eq!("ALL".parse::<SyncMode>(), Ok(SyncMode::All));
        assert!("some".parse::<SyncMode>().is_err());
        assert_eq!(
            serde_json::from_str::<SyncMode>("\"new_only\"").unwrap(),
            SyncMode::NewOnly
        );
    }
}
