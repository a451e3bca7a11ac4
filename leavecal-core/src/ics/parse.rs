//! Reading exported calendars back.

use icalendar::parser::{read_calendar, unfold};

use crate::ics::uid::UID_DOMAIN;

/// A VEVENT as seen by a calendar client that imports our document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedEvent {
    pub uid: String,
    /// Unescaped TEXT value.
    pub summary: String,
    /// Unescaped TEXT value, empty when absent.
    pub description: String,
    pub transparent: bool,
}

impl ExportedEvent {
    /// Whether this event was produced by leavecal.
    pub fn is_ours(&self) -> bool {
        self.uid.ends_with(&format!("@{}", UID_DOMAIN))
    }
}

/// Parse every VEVENT out of an exported calendar.
pub fn parse_events(content: &str) -> Result<Vec<ExportedEvent>, String> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| e.to_string())?;

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(|vevent| {
            let uid = vevent.find_prop("UID")?.val.to_string();
            let summary = vevent
                .find_prop("SUMMARY")
                .map(|p| unescape_text(p.val.as_ref()))
                .unwrap_or_default();
            let description = vevent
                .find_prop("DESCRIPTION")
                .map(|p| unescape_text(p.val.as_ref()))
                .unwrap_or_default();
            let transparent = vevent
                .find_prop("TRANSP")
                .is_some_and(|p| p.val == "TRANSPARENT");
            Some(ExportedEvent {
                uid,
                summary,
                description,
                transparent,
            })
        })
        .collect();

    Ok(events)
}

/// Reverse of RFC 5545 TEXT escaping: `\,` `\;` `\\` and `\n`.
fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(',') | Some(';') | Some('\\') => {
                result.extend(chars.next());
            }
            Some('n') | Some('N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}
