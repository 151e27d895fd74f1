use std::path::PathBuf;
use std::time::{Duration, Instant};

use url::Url;

use crate::args::{PositiveU64, PositiveUsize};
use crate::error::ValidationError;

/// Termination policy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Stop admitting once this many requests have been issued.
    Count(PositiveU64),
    /// Stop admitting once this much wall-clock time has passed.
    Duration(Duration),
}

/// Merged, not yet validated run settings (CLI over config file over
/// defaults).
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub url: Option<String>,
    pub concurrency: u64,
    pub requests: Option<u64>,
    pub duration: Option<Duration>,
    pub payload_size: u64,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub output: Option<PathBuf>,
    pub reset_stats: bool,
}

/// Validated input to a run. Construction is the only place settings are
/// checked; invalid values are rejected, never clamped.
#[derive(Debug, Clone)]
pub struct TestConfiguration {
    pub target_url: Url,
    pub concurrency: PositiveUsize,
    pub mode: RunMode,
    pub payload_size: PositiveU64,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl TestConfiguration {
    /// Validates merged settings. A duration, when present, wins over a
    /// request count.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a missing or malformed URL, zero
    /// concurrency, zero request count, zero duration, zero payload size, or
    /// when neither termination condition is set.
    pub fn from_settings(settings: &RunSettings) -> Result<Self, ValidationError> {
        let raw_url = settings.url.as_deref().ok_or(ValidationError::MissingUrl)?;
        let target_url = parse_target_url(raw_url)?;

        let concurrency =
            PositiveUsize::try_from(usize::try_from(settings.concurrency).unwrap_or(usize::MAX))
                .map_err(|_err| ValidationError::ConcurrencyZero)?;

        let mode = match (settings.duration, settings.requests) {
            (Some(duration), _) if duration.is_zero() => return Err(ValidationError::DurationZero),
            (Some(duration), _) if Instant::now().checked_add(duration).is_none() => {
                return Err(ValidationError::DurationTooLarge {
                    secs: duration.as_secs(),
                });
            }
            (Some(duration), _) => RunMode::Duration(duration),
            (None, Some(requests)) => RunMode::Count(
                PositiveU64::try_from(requests)
                    .map_err(|_err| ValidationError::RequestsZero)?,
            ),
            (None, None) => return Err(ValidationError::MissingTermination),
        };

        let payload_size = PositiveU64::try_from(settings.payload_size)
            .map_err(|_err| ValidationError::PayloadSizeZero)?;

        Ok(Self {
            target_url,
            concurrency,
            mode,
            payload_size,
            request_timeout: settings.request_timeout,
            connect_timeout: settings.connect_timeout,
        })
    }
}

fn parse_target_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw.trim()).map_err(|err| ValidationError::InvalidUrl {
        url: raw.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ValidationError::UnsupportedScheme {
            url: raw.to_owned(),
        }),
    }
}
