//! iCalendar (RFC 5545) export.
//!
//! `time` and `uid` produce the tokens, `generate` builds one VEVENT per
//! record, `document` wraps them into the VCALENDAR that gets delivered.

mod document;
mod generate;
mod parse;
pub mod time;
mod uid;

pub use document::{
    CONTENT_TYPE, CalendarDocument, PRODID, attachment_filename, calendar_name, render_document,
};
pub use generate::{HOLIDAY_DESCRIPTION, HOLIDAY_MARKER, escape_text, holiday_event, leave_event};
pub use parse::{ExportedEvent, parse_events};
pub use uid::{IdentityError, UID_DOMAIN, holiday_uid, leave_uid};
