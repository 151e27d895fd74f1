//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{BenchArgs, Command, RunArgs, ServeArgs};
pub use types::{PositiveU64, PositiveUsize};

pub(crate) use defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PAYLOAD_SIZE, DEFAULT_REQUESTS,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_TARGET_URL, DEFAULT_USER_AGENT,
};
