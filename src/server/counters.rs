use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::metrics::{ServerStats, megabits_per_sec};

/// Process-wide request and byte totals for the payload server.
///
/// Each operation is individually atomic. `increment`, `snapshot` and
/// `reset_all` are not transactional with respect to each other: a response
/// racing a reset may land in either epoch.
#[derive(Debug)]
pub struct ServerCounters {
    origin: Instant,
    request_count: AtomicU64,
    total_bytes: AtomicU64,
    /// Start of the current epoch, as nanoseconds after `origin`.
    epoch_start_nanos: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub total_requests: u64,
    pub total_bytes: u64,
    pub uptime: Duration,
}

impl ServerCounters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            request_count: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            epoch_start_nanos: AtomicU64::new(0),
        }
    }

    /// Records one served response of `bytes` serialized bytes.
    pub fn increment(&self, bytes: u64) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_requests: self.request_count.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            uptime: self.uptime(),
        }
    }

    /// Zeroes both totals and restarts the uptime clock.
    pub fn reset_all(&self) {
        self.request_count.store(0, Ordering::Relaxed);
        self.total_bytes.store(0, Ordering::Relaxed);
        self.epoch_start_nanos
            .store(self.nanos_since_origin(), Ordering::SeqCst);
    }

    /// Time since start or the last reset.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        let epoch_start = self.epoch_start_nanos.load(Ordering::SeqCst);
        Duration::from_nanos(self.nanos_since_origin().saturating_sub(epoch_start))
    }

    fn nanos_since_origin(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl Default for ServerCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSnapshot {
    /// Rates over the snapshot's uptime; all zero when uptime is zero.
    #[must_use]
    pub fn to_stats(&self) -> ServerStats {
        let uptime_seconds = self.uptime.as_secs_f64();
        let (requests_per_second, bytes_per_second) = if uptime_seconds > 0.0 {
            (
                u64_as_f64(self.total_requests) / uptime_seconds,
                u64_as_f64(self.total_bytes) / uptime_seconds,
            )
        } else {
            (0.0, 0.0)
        };
        ServerStats {
            total_requests: self.total_requests,
            total_bytes: self.total_bytes,
            uptime_seconds,
            requests_per_second,
            bytes_per_second,
            mb_per_second: megabits_per_sec(bytes_per_second),
        }
    }
}

const fn u64_as_f64(value: u64) -> f64 {
    value as f64
}
