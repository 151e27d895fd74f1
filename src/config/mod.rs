//! Config file loading and merging with CLI arguments.
mod apply;
mod loader;
pub mod types;


pub use apply::resolve_run_settings;
pub use loader::load_config;
pub(crate) use loader::load_config_file;
