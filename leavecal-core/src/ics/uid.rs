//! Stable UIDs for exported events.
//!
//! Calendar clients match events by UID, so a record must serialize to the
//! same UID on every export or a re-import creates a duplicate.

use thiserror::Error;

use crate::record::{HolidayEvent, LeaveEvent};

/// Domain part shared by every UID we emit.
pub const UID_DOMAIN: &str = "leavecal";

const HOLIDAY_NAMESPACE: &str = "holiday";

/// Hex digits of the raw-id digest appended when sanitizing dropped characters.
const DIGEST_LEN: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("leave {leave_id} has no calendar correlation token")]
    MissingToken { leave_id: String },

    #[error("leave {leave_id} has a correlation token with unsafe characters: {token:?}")]
    UnsafeToken { leave_id: String, token: String },

    #[error("{field} {raw:?} has no UID-safe characters")]
    EmptyComponent { field: &'static str, raw: String },
}

/// UID for a leave record, taken from the upstream correlation token.
///
/// The token is used as-is; one that would need rewriting is rejected rather
/// than altered, since a rewritten token could match another record's.
pub fn leave_uid(leave: &LeaveEvent) -> Result<String, IdentityError> {
    let token = leave.ics_uid.trim();

    if token.is_empty() {
        return Err(IdentityError::MissingToken {
            leave_id: leave.id.to_string(),
        });
    }

    if !token.chars().all(is_uid_safe) {
        return Err(IdentityError::UnsafeToken {
            leave_id: leave.id.to_string(),
            token: leave.ics_uid.clone(),
        });
    }

    Ok(format!("{}@{}", token, UID_DOMAIN))
}

/// UID for a holiday, synthesized from the tenant id and the holiday id.
///
/// Both components may contain `-`, so the tenant component is prefixed with
/// its length: `holiday-{len}-{tenant}-{id}`. Tenant `a-b` with holiday `c`
/// and tenant `a` with holiday `b-c` then get different UIDs.
pub fn holiday_uid(tenant_id: &str, holiday: &HolidayEvent) -> Result<String, IdentityError> {
    let tenant = sanitize_component("tenant id", tenant_id)?;
    let holiday_id = sanitize_component("holiday id", &holiday.id)?;

    Ok(format!(
        "{}-{}-{}-{}@{}",
        HOLIDAY_NAMESPACE,
        tenant.len(),
        tenant,
        holiday_id,
        UID_DOMAIN
    ))
}

fn is_uid_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Strip everything outside `[A-Za-z0-9-]`.
///
/// If anything was stripped, a digest of the raw value is appended so two
/// values that differ only in stripped characters stay distinct.
fn sanitize_component(field: &'static str, raw: &str) -> Result<String, IdentityError> {
    let cleaned: String = raw.chars().filter(|c| is_uid_safe(*c)).collect();

    if cleaned.trim_matches('-').is_empty() {
        return Err(IdentityError::EmptyComponent {
            field,
            raw: raw.to_string(),
        });
    }

    if cleaned.len() == raw.len() {
        return Ok(cleaned);
    }

    let digest = blake3::hash(raw.as_bytes()).to_hex();
    Ok(format!("{}-{}", cleaned, &digest.as_str()[..DIGEST_LEN]))
}
