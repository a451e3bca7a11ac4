//! Calendar export engine for approved leave and office holidays.
//!
//! Turns leave and holiday records into an RFC 5545 calendar whose event UIDs
//! are stable across exports, so re-importing updates events instead of
//! duplicating them. Delivered leave is stamped as sent, which lets
//! [`sync::SyncMode::NewOnly`] exports skip it next time.
//!
//! - `ics`: date tokens, UIDs, VEVENT and VCALENDAR generation
//! - `sync`: send modes, record selection and the post-send marker
//! - `export`: the [`CalendarExporter`] pipeline
//! - `store` / `mail`: collaborator traits and their default implementations

pub mod config;
pub mod error;
pub mod export;
pub mod ics;
pub mod mail;
pub mod record;
pub mod store;
pub mod sync;

pub use error::{ExportError, ExportResult, Stage};
pub use export::{CalendarExporter, ExportOutcome, SyncRequest};
pub use record::{DurationType, HolidayEvent, LeaveEvent, LeaveId, Tenant};
