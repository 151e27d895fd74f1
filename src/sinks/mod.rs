//! Run report output.
mod format;
mod report;

pub use report::{render_report, write_report};
