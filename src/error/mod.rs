mod app;
mod config;
mod http;
mod server;
mod sink;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use server::ServerError;
pub use sink::SinkError;
pub use validation::ValidationError;
