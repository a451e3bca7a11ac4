//! Date and date-time tokens for DTSTART/DTEND.
//!
//! All-day events follow the RFC 5545 convention of an exclusive end date, so
//! the end token is always the last covered day plus one. Half-day leave is
//! written as floating local time in one of two fixed windows.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::record::RecordError;

const fn clock(hour: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, 0, 0) {
        Some(time) => time,
        None => NaiveTime::MIN,
    }
}

pub const MORNING_START: NaiveTime = clock(8);
pub const MORNING_END: NaiveTime = clock(12);
pub const AFTERNOON_START: NaiveTime = clock(13);
pub const AFTERNOON_END: NaiveTime = clock(17);

/// The two fixed half-day windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfDay {
    Morning,
    Afternoon,
}

/// A DTSTART or DTEND value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// All-day bound, written with `VALUE=DATE`.
    Date(NaiveDate),
    /// Local time without TZID or `Z` suffix.
    Floating(NaiveDateTime),
}

impl EventTime {
    /// The textual token, without property name or parameters.
    pub fn token(&self) -> String {
        match self {
            EventTime::Date(d) => date_token(*d),
            EventTime::Floating(dt) => floating_token(*dt),
        }
    }
}

/// Start and (exclusive) end of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpan {
    pub start: EventTime,
    pub end: EventTime,
}

impl EventSpan {
    /// All-day span covering `first..=last`.
    pub fn all_day(first: NaiveDate, last: NaiveDate) -> Result<Self, RecordError> {
        let end = last
            .checked_add_days(Days::new(1))
            .ok_or(RecordError::DateOverflow(last))?;

        Ok(EventSpan {
            start: EventTime::Date(first),
            end: EventTime::Date(end),
        })
    }

    /// Timed span for a half-day on `date`.
    pub fn half_day(date: NaiveDate, half: HalfDay) -> Self {
        let (from, to) = match half {
            HalfDay::Morning => (MORNING_START, MORNING_END),
            HalfDay::Afternoon => (AFTERNOON_START, AFTERNOON_END),
        };

        EventSpan {
            start: EventTime::Floating(date.and_time(from)),
            end: EventTime::Floating(date.and_time(to)),
        }
    }
}

/// `YYYYMMDD`
pub fn date_token(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// `YYYYMMDDTHHMMSS`
pub fn floating_token(datetime: NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M%S").to_string()
}

/// `YYYYMMDDTHHMMSSZ`, used for DTSTAMP.
pub fn utc_token(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_end_is_exclusive() {
        let span = EventSpan::all_day(date(2025, 3, 10), date(2025, 3, 10)).unwrap();
        assert_eq!(span.start.token(), "20250310");
        assert_eq!(span.end.token(), "20250311");
    }

    #[test]
    fn test_all_day_end_crosses_month_and_year() {
        let span = EventSpan::all_day(date(2024, 12, 30), date(2024, 12, 31)).unwrap();
        assert_eq!(span.end.token(), "20250101");

        let span = EventSpan::all_day(date(2024, 2, 28), date(2024, 2, 29)).unwrap();
        assert_eq!(span.end.token(), "20240301");
    }

    #[test]
    fn test_all_day_end_overflow_is_an_error() {
        let result = EventSpan::all_day(NaiveDate::MAX, NaiveDate::MAX);
        assert_eq!(result, Err(RecordError::DateOverflow(NaiveDate::MAX)));
    }

    #[test]
    fn test_half_day_windows() {
        let am = EventSpan::half_day(date(2025, 4, 1), HalfDay::Morning);
        assert_eq!(am.start.token(), "20250401T080000");
        assert_eq!(am.end.token(), "20250401T120000");

        let pm = EventSpan::half_day(date(2025, 4, 1), HalfDay::Afternoon);
        assert_eq!(pm.start.token(), "20250401T130000");
        assert_eq!(pm.end.token(), "20250401T170000");
    }

    #[test]
    fn test_utc_token_has_z_suffix() {
        let stamp = date(2025, 1, 2).and_hms_opt(3, 4, 5).unwrap().and_utc();
        assert_eq!(utc_token(stamp), "20250102T030405Z");
    }
}
