use std::fmt::Write as _;

use crate::error::{AppError, AppResult, SinkError};

pub(super) fn write_line(output: &mut String, line: &str) -> AppResult<()> {
    writeln!(output, "{}", line).map_err(|err| AppError::sink(SinkError::WriteLine { source: err }))
}

/// Fixed six-decimal rendering used for every fractional report value.
pub(super) fn format_secs(value: f64) -> String {
    format!("{:.6}", value)
}

/// Undefined extremes are written as `n/a` rather than a number.
pub(super) fn format_opt_secs(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), format_secs)
}
