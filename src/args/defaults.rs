use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("bwbench/", env!("CARGO_PKG_VERSION"));
pub(crate) const DEFAULT_TARGET_URL: &str = "http://localhost:8080";
pub(crate) const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub(crate) const DEFAULT_CONCURRENCY: u64 = 10;
pub(crate) const DEFAULT_REQUESTS: u64 = 100;
pub(crate) const DEFAULT_PAYLOAD_SIZE: u64 = 1024;
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
