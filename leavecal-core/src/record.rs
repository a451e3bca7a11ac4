//! Source records for the calendar export.
//!
//! Leave and holiday records are read-only snapshots fetched from the store
//! once per export. The only field the engine ever writes back is
//! [`LeaveEvent::sent_at`], through the post-send marker.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable identifier of a leave record in the upstream store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveId(String);

impl LeaveId {
    pub fn new(id: impl Into<String>) -> Self {
        LeaveId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaveId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How much of a day a leave record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationType {
    FullDay,
    HalfDayAm,
    HalfDayPm,
}

/// An approved leave request, as handed to the engine by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveEvent {
    pub id: LeaveId,
    /// Calendar correlation token issued by the upstream system, one per leave record.
    pub ics_uid: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_type: DurationType,
    /// Informational only, never re-derived from the date range.
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub remark: Option<String>,
    pub member_name: String,
    pub leave_type: String,
    /// Office code of the member, used by the location filter.
    #[serde(default)]
    pub location: Option<String>,
    /// When this record was last included in a delivered calendar.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

impl LeaveEvent {
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.start_date > self.end_date {
            return Err(RecordError::InvalidRange {
                record: format!("leave {}", self.id),
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// An office holiday. Without a location it applies to the whole tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayEvent {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

impl HolidayEvent {
    /// Last day covered by the holiday (inclusive).
    pub fn last_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.date)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.date > self.last_date() {
            return Err(RecordError::InvalidRange {
                record: format!("holiday {}", self.id),
                start: self.date,
                end: self.last_date(),
            });
        }
        Ok(())
    }
}

/// The company whose records are exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{record} ends ({end}) before it starts ({start})")]
    InvalidRange {
        record: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("no calendar day follows {0}")]
    DateOverflow(NaiveDate),
}
