use std::time::Duration;

use super::types::{AggregateStats, RequestOutcome};

const BITS_PER_BYTE: f64 = 8.0;
const BYTES_PER_MEGABIT_BASE: f64 = 1024.0 * 1024.0;
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Derives summary statistics from a finished run.
///
/// Timings are folded as integer nanoseconds, so the result is identical for
/// any ordering of `outcomes`.
#[must_use]
pub fn aggregate(outcomes: &[RequestOutcome], elapsed: Duration) -> AggregateStats {
    let total = u64::try_from(outcomes.len()).unwrap_or(u64::MAX);

    let mut successful: u64 = 0;
    let mut total_bytes: u64 = 0;
    let mut latency_count: u64 = 0;
    let mut latency_sum_nanos: u128 = 0;
    let mut min_time: Option<Duration> = None;
    let mut max_time: Option<Duration> = None;

    for outcome in outcomes.iter().filter(|outcome| outcome.is_success()) {
        successful = successful.saturating_add(1);
        total_bytes = total_bytes.saturating_add(outcome.byte_size);

        let transfer = outcome.reported_transfer_time;
        if !transfer.is_zero() {
            latency_count = latency_count.saturating_add(1);
            latency_sum_nanos = latency_sum_nanos.saturating_add(transfer.as_nanos());
            min_time = Some(min_time.map_or(transfer, |current| current.min(transfer)));
            max_time = Some(max_time.map_or(transfer, |current| current.max(transfer)));
        }
    }

    let avg_time = latency_sum_nanos
        .checked_div(u128::from(latency_count))
        .map_or(0.0, |avg_nanos| u128_as_f64(avg_nanos) / NANOS_PER_SEC);

    let elapsed_secs = elapsed.as_secs_f64();
    let (requests_per_sec, bytes_per_sec) = if elapsed_secs > 0.0 {
        (
            u64_as_f64(successful) / elapsed_secs,
            u64_as_f64(total_bytes) / elapsed_secs,
        )
    } else {
        (0.0, 0.0)
    };

    AggregateStats {
        total,
        successful,
        failed: total.saturating_sub(successful),
        total_bytes,
        elapsed_secs,
        avg_time,
        min_time: min_time.map(|value| value.as_secs_f64()),
        max_time: max_time.map(|value| value.as_secs_f64()),
        requests_per_sec,
        bytes_per_sec,
        mbps: megabits_per_sec(bytes_per_sec),
    }
}

/// Converts a byte rate to megabits per second (1 Mb = 1024 * 1024 bits).
#[must_use]
pub const fn megabits_per_sec(bytes_per_sec: f64) -> f64 {
    bytes_per_sec * BITS_PER_BYTE / BYTES_PER_MEGABIT_BASE
}

// Totals stay far below 2^52, so the casts are exact in practice.
const fn u64_as_f64(value: u64) -> f64 {
    value as f64
}

const fn u128_as_f64(value: u128) -> f64 {
    value as f64
}
