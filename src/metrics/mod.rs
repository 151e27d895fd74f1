//! Per-request outcomes and the statistics derived from them.
mod aggregate;
mod types;


pub use aggregate::{aggregate, megabits_per_sec};
pub use types::{AggregateStats, FAILURE_STATUS, RequestOutcome, SUCCESS_STATUS, ServerStats};
