//! Core library for the `bwbench` CLI.
//!
//! `bwbench serve` runs a small HTTP server that returns synthetic payloads
//! of a requested size and keeps global request/byte counters. `bwbench run`
//! drives bounded-concurrency load against that server, either for a fixed
//! number of requests or for a fixed duration, and reports client-side
//! throughput alongside the server's own statistics.
pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod sinks;
