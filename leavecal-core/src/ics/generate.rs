//! VEVENT generation for leave and holiday records.

use chrono::{DateTime, Utc};
use icalendar::{Component, Property, ValueType};
use tracing::warn;

use crate::error::RenderError;
use crate::ics::time::{EventSpan, EventTime, HalfDay, utc_token};
use crate::ics::uid::{holiday_uid, leave_uid};
use crate::record::{DurationType, HolidayEvent, LeaveEvent};

/// Prefix marking holidays in the calendar client.
pub const HOLIDAY_MARKER: &str = "🎉";

pub const HOLIDAY_DESCRIPTION: &str = "Office holiday";

/// Build the VEVENT for one leave record.
///
/// Full days are all-day events; half days are timed events in the fixed
/// morning or afternoon window. Leave always shows as busy.
pub fn leave_event(
    leave: &LeaveEvent,
    stamp: DateTime<Utc>,
) -> Result<icalendar::Event, RenderError> {
    leave.validate()?;
    let uid = leave_uid(leave)?;

    let half = match leave.duration_type {
        DurationType::FullDay => None,
        DurationType::HalfDayAm => Some((HalfDay::Morning, " (AM)")),
        DurationType::HalfDayPm => Some((HalfDay::Afternoon, " (PM)")),
    };

    let (span, suffix) = match half {
        None => (EventSpan::all_day(leave.start_date, leave.end_date)?, ""),
        Some((half, suffix)) => {
            if leave.start_date != leave.end_date {
                warn!(
                    leave_id = %leave.id,
                    start = %leave.start_date,
                    end = %leave.end_date,
                    "half-day leave spans several days, exporting the start date only"
                );
            }
            (EventSpan::half_day(leave.start_date, half), suffix)
        }
    };

    let summary = format!("{} - {}{}", leave.member_name, leave.leave_type, suffix);
    let description = leave.remark.as_deref().unwrap_or_default();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&uid);
    ics_event.add_property("DTSTAMP", utc_token(stamp));
    add_span(&mut ics_event, &span);
    ics_event.summary(&escape_text(&summary));
    ics_event.description(&escape_text(description));
    ics_event.add_property("STATUS", "CONFIRMED");
    ics_event.add_property("TRANSP", "OPAQUE");

    Ok(ics_event.done())
}

/// Build the VEVENT for one holiday. Holidays never block time.
pub fn holiday_event(
    tenant_id: &str,
    holiday: &HolidayEvent,
    stamp: DateTime<Utc>,
) -> Result<icalendar::Event, RenderError> {
    holiday.validate()?;
    let uid = holiday_uid(tenant_id, holiday)?;
    let span = EventSpan::all_day(holiday.date, holiday.last_date())?;

    let summary = match &holiday.location {
        Some(location) => format!("{} {} ({})", HOLIDAY_MARKER, holiday.name, location),
        None => format!("{} {}", HOLIDAY_MARKER, holiday.name),
    };

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&uid);
    ics_event.add_property("DTSTAMP", utc_token(stamp));
    add_span(&mut ics_event, &span);
    ics_event.summary(&escape_text(&summary));
    ics_event.description(HOLIDAY_DESCRIPTION);
    ics_event.add_property("STATUS", "CONFIRMED");
    ics_event.add_property("TRANSP", "TRANSPARENT");

    Ok(ics_event.done())
}

fn add_span(ics_event: &mut icalendar::Event, span: &EventSpan) {
    add_datetime_property(ics_event, "DTSTART", &span.start);
    add_datetime_property(ics_event, "DTEND", &span.end);
}

/// Add a DTSTART/DTEND property formatted for its EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(_) => {
            let mut prop = Property::new(name, time.token());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::Floating(_) => {
            ics_event.add_property(name, time.token());
        }
    }
}

/// Escape a TEXT value (RFC 5545 §3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("a,b;c"), "a\\,b\\;c");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
    }
}
