//! Client side of a run: the HTTP client, the per-request executor, and the
//! bounded-concurrency load generator that drives it.
mod client;
mod executor;
mod generator;

#[cfg(test)]
mod tests;

pub use client::{bandwidth_url, build_client, endpoint_url, fetch_server_stats, reset_server_stats};
pub use executor::{Executor, HttpExecutor};
pub use generator::{ADMISSION_DELAY, LoadGenerator, PROGRESS_INTERVAL, RunReport};
