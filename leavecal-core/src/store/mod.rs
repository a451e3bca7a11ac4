//! The leave/holiday store the exporter reads from and stamps.

mod json;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::{HolidayEvent, LeaveEvent, LeaveId, Tenant};
use crate::sync::RecordFilter;

pub use json::{JsonFileStore, LeaveStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Candidate records for one tenant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    pub leaves: Vec<LeaveEvent>,
    pub holidays: Vec<HolidayEvent>,
}

/// A delivered leave record and the `sent_at` value the export read for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedLeave {
    pub id: LeaveId,
    pub sent_at: Option<DateTime<Utc>>,
}

impl From<&LeaveEvent> for ObservedLeave {
    fn from(leave: &LeaveEvent) -> Self {
        ObservedLeave {
            id: leave.id.clone(),
            sent_at: leave.sent_at,
        }
    }
}

/// Result of a conditional batch stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedSet {
    /// Stamped by this call.
    pub marked: Vec<LeaveId>,
    /// Left alone because another export stamped them after they were read.
    pub already_sent: Vec<LeaveId>,
    /// No longer in the store.
    pub missing: Vec<LeaveId>,
}

/// Source of leave and holiday records.
///
/// `fetch` returns only approved leave within the tenant; the exporter does not
/// re-check either. `mark_sent` stamps a record only while its stored `sent_at`
/// still equals the value the export observed, so two concurrent exports
/// cannot both claim the same record.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn fetch(&self, tenant: &Tenant, filter: &RecordFilter) -> StoreResult<Records>;

    async fn mark_sent(
        &self,
        tenant: &Tenant,
        leaves: &[ObservedLeave],
        at: DateTime<Utc>,
    ) -> StoreResult<MarkedSet>;
}
