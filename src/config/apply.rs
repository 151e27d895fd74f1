use std::path::PathBuf;
use std::time::Duration;

use crate::args::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PAYLOAD_SIZE, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_REQUESTS, DEFAULT_TARGET_URL, RunArgs,
};
use crate::domain::run::RunSettings;
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Merges CLI arguments over an optional config file over built-in defaults.
/// Values are carried through verbatim; validation is left to
/// `TestConfiguration::from_settings`.
///
/// # Errors
///
/// Returns an error when a duration in the config file cannot be parsed.
pub fn resolve_run_settings(args: &RunArgs, config: Option<&ConfigFile>) -> AppResult<RunSettings> {
    let empty = ConfigFile::default();
    let config = config.unwrap_or(&empty);

    let duration = match args.duration {
        Some(duration) => Some(duration),
        None => config_duration(config.duration.as_ref())?,
    };
    let mut requests = args.requests.or(config.requests);
    if duration.is_none() && requests.is_none() {
        requests = Some(DEFAULT_REQUESTS);
    }

    let request_timeout = match args.timeout {
        Some(timeout) => timeout,
        None => config_duration(config.timeout.as_ref())?.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
    };
    let connect_timeout = match args.connect_timeout {
        Some(timeout) => timeout,
        None => {
            config_duration(config.connect_timeout.as_ref())?.unwrap_or(DEFAULT_CONNECT_TIMEOUT)
        }
    };

    Ok(RunSettings {
        url: args
            .url
            .clone()
            .or_else(|| config.url.clone())
            .or_else(|| Some(DEFAULT_TARGET_URL.to_owned())),
        concurrency: args
            .concurrency
            .or(config.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY),
        requests,
        duration,
        payload_size: args.size.or(config.size).unwrap_or(DEFAULT_PAYLOAD_SIZE),
        request_timeout,
        connect_timeout,
        output: args
            .output
            .as_ref()
            .or(config.output.as_ref())
            .map(PathBuf::from),
        reset_stats: args.reset_stats || config.reset_stats.unwrap_or(false),
    })
}

fn config_duration(value: Option<&DurationValue>) -> AppResult<Option<Duration>> {
    value
        .map(|value| {
            value
                .to_duration()
                .map_err(|err| AppError::config(ConfigError::InvalidDuration { source: err }))
        })
        .transpose()
}
