//! Send-state bookkeeping: which leave goes out, and stamping what went out.

mod marker;
mod mode;

pub use marker::{MarkReport, mark_sent};
pub use mode::{RecordFilter, SendState, SyncMode, select_holidays, select_leaves};
