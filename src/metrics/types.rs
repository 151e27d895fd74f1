use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status recorded when no HTTP response was received at all.
pub const FAILURE_STATUS: u16 = 0;
/// The only status counted as a successful transfer.
pub const SUCCESS_STATUS: u16 = 200;

/// One completed (or failed) request attempt. Built once by the executor and
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestOutcome {
    /// Sequence number, unique within a run (1-based).
    pub id: u64,
    /// HTTP status, or `FAILURE_STATUS` on transport failure.
    pub status_code: u16,
    /// Time from sending the request until the body was fully received.
    pub reported_transfer_time: Duration,
    /// Body bytes received.
    pub byte_size: u64,
    /// Time measured around the whole executor call.
    pub wall_clock_duration: Duration,
}

impl RequestOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code == SUCCESS_STATUS
    }

    #[must_use]
    pub const fn failed(id: u64, wall_clock_duration: Duration) -> Self {
        Self {
            id,
            status_code: FAILURE_STATUS,
            reported_transfer_time: Duration::ZERO,
            byte_size: 0,
            wall_clock_duration,
        }
    }
}

/// Summary of a run, derived purely from its outcome set and elapsed time.
/// Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub total_bytes: u64,
    pub elapsed_secs: f64,
    pub avg_time: f64,
    /// `None` when no successful request reported a positive transfer time.
    pub min_time: Option<f64>,
    pub max_time: Option<f64>,
    pub requests_per_sec: f64,
    pub bytes_per_sec: f64,
    pub mbps: f64,
}

/// The payload server's own view, as returned by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStats {
    pub total_requests: u64,
    pub total_bytes: u64,
    pub uptime_seconds: f64,
    pub requests_per_second: f64,
    pub bytes_per_second: f64,
    pub mb_per_second: f64,
}
