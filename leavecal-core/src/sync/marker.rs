//! Stamping delivered leave records.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::record::{LeaveId, Tenant};
use crate::store::{LeaveStore, ObservedLeave};

/// What happened to the send timestamps after an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkReport {
    /// Nothing was delivered, so nothing was stamped.
    NotAttempted,
    Marked {
        marked: usize,
        already_sent: Vec<LeaveId>,
        missing: Vec<LeaveId>,
    },
    /// The email went out but the batch update failed. These records will be
    /// offered again by the next `new_only` export.
    Failed {
        error: String,
        pending: Vec<LeaveId>,
    },
}

impl MarkReport {
    /// A message for the caller when stamping did not fully succeed.
    pub fn warning(&self) -> Option<String> {
        match self {
            MarkReport::Failed { error, pending } => Some(format!(
                "Calendar was sent, but {} leave records could not be marked as sent ({}). \
                 They will be included again in the next new-only export.",
                pending.len(),
                error
            )),
            MarkReport::Marked { missing, .. } if !missing.is_empty() => Some(format!(
                "{} leave records disappeared before they could be marked as sent",
                missing.len()
            )),
            _ => None,
        }
    }
}

/// Stamp exactly the given leave records as sent at `at`, in one batch.
///
/// Each record is stamped only if its `sent_at` still matches what the export
/// read, so an `all` export refreshes earlier stamps while two overlapping
/// `new_only` exports stamp each record once. Only call this after the
/// document holding `leaves` was delivered.
pub async fn mark_sent(
    store: &dyn LeaveStore,
    tenant: &Tenant,
    leaves: &[ObservedLeave],
    at: DateTime<Utc>,
) -> MarkReport {
    if leaves.is_empty() {
        return MarkReport::Marked {
            marked: 0,
            already_sent: Vec::new(),
            missing: Vec::new(),
        };
    }

    match store.mark_sent(tenant, leaves, at).await {
        Ok(set) => {
            if !set.already_sent.is_empty() {
                warn!(
                    tenant = %tenant.id,
                    count = set.already_sent.len(),
                    "leave records were already marked by another export"
                );
            }
            info!(tenant = %tenant.id, marked = set.marked.len(), "marked leave as sent");
            MarkReport::Marked {
                marked: set.marked.len(),
                already_sent: set.already_sent,
                missing: set.missing,
            }
        }
        Err(e) => {
            warn!(
                tenant = %tenant.id,
                count = leaves.len(),
                error = %e,
                "calendar delivered but marking leave as sent failed"
            );
            MarkReport::Failed {
                error: e.to_string(),
                pending: leaves.iter().map(|l| l.id.clone()).collect(),
            }
        }
    }
}
