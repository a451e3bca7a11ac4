//! VCALENDAR assembly.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Property};

use crate::error::RenderError;
use crate::ics::generate::{escape_text, holiday_event, leave_event};
use crate::record::{HolidayEvent, LeaveEvent, LeaveId, Tenant};

pub const PRODID: &str = "-//leavecal//Leave Calendar Export//EN";

pub const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

const FILENAME_SUFFIX: &str = "_leave_calendar.ics";

/// A rendered calendar plus what went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDocument {
    pub content: String,
    /// Ids of the leave records rendered, in document order.
    pub leave_ids: Vec<LeaveId>,
    pub holiday_count: usize,
}

impl CalendarDocument {
    pub fn leave_count(&self) -> usize {
        self.leave_ids.len()
    }

    pub fn total_events(&self) -> usize {
        self.leave_ids.len() + self.holiday_count
    }
}

/// Render leave events (in the given order) followed by holidays into one calendar.
///
/// `stamp` becomes every event's DTSTAMP, so identical input and stamp give a
/// byte-identical document.
pub fn render_document(
    tenant: &Tenant,
    leaves: &[LeaveEvent],
    holidays: &[HolidayEvent],
    stamp: DateTime<Utc>,
) -> Result<CalendarDocument, RenderError> {
    let mut cal = Calendar::new();

    cal.append_property(Property::new("METHOD", "PUBLISH"));
    cal.append_property(Property::new(
        "X-WR-CALNAME",
        escape_text(&calendar_name(&tenant.name)),
    ));
    cal.append_property(Property::new("X-WR-TIMEZONE", "UTC"));

    for leave in leaves {
        cal.push(leave_event(leave, stamp)?);
    }

    for holiday in holidays {
        cal.push(holiday_event(&tenant.id, holiday, stamp)?);
    }

    let cal = cal.done();

    Ok(CalendarDocument {
        content: replace_prodid(&cal.to_string()),
        leave_ids: leaves.iter().map(|l| l.id.clone()).collect(),
        holiday_count: holidays.len(),
    })
}

pub fn calendar_name(tenant_name: &str) -> String {
    format!("{} Leave Calendar", tenant_name.trim())
}

/// Attachment name: tenant name without non-alphanumerics, plus `_leave_calendar.ics`.
pub fn attachment_filename(tenant_name: &str) -> String {
    let stem: String = tenant_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if stem.is_empty() {
        format!("company{}", FILENAME_SUFFIX)
    } else {
        format!("{}{}", stem, FILENAME_SUFFIX)
    }
}

/// The icalendar crate writes its own PRODID; swap in ours.
fn replace_prodid(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
        } else {
            result.push_str(line);
        }
        result.push_str("\r\n");
    }

    result
}
