//! Subcommand lifecycles: serving payloads and running a load test.
mod run;
mod serve;
mod summary;

pub use run::{RunSummary, execute_run, run_load_test};
pub use serve::{ServeOptions, execute_serve};
pub use summary::summary_lines;
