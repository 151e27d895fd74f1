use reqwest::Client;
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::domain::run::TestConfiguration;
use crate::error::{AppError, AppResult, HttpError};
use crate::metrics::ServerStats;

const BANDWIDTH_PATH: &str = "api/bandwidth";
const STATS_PATH: &str = "api/stats";
const RESET_PATH: &str = "api/reset";

/// Builds the shared client used by every executor task.
///
/// # Errors
///
/// Returns an error when the underlying client cannot be constructed.
pub fn build_client(config: &TestConfiguration) -> AppResult<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

/// Resolves an API path relative to the target base URL, keeping any path
/// prefix the base carries.
///
/// # Errors
///
/// Returns an error when the path cannot be joined onto the base.
pub fn endpoint_url(base: &Url, path: &str) -> AppResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path).map_err(|err| {
        AppError::http(HttpError::JoinUrlFailed {
            url: base.to_string(),
            source: err,
        })
    })
}

/// `<base>/api/bandwidth?size=<size>`
///
/// # Errors
///
/// Returns an error when the endpoint cannot be joined onto the base.
pub fn bandwidth_url(base: &Url, size: u64) -> AppResult<Url> {
    let mut url = endpoint_url(base, BANDWIDTH_PATH)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("size", &size.to_string());
    Ok(url)
}

/// Fetches the server's own counters for cross-checking client figures.
///
/// # Errors
///
/// Returns an error when the request fails, the status is not 200, or the
/// body does not decode.
pub async fn fetch_server_stats(client: &Client, base: &Url) -> AppResult<ServerStats> {
    let url = endpoint_url(base, STATS_PATH)?;
    let response = client.get(url).send().await.map_err(|err| {
        AppError::http(HttpError::EndpointRequestFailed {
            endpoint: "/api/stats",
            source: err,
        })
    })?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(AppError::http(HttpError::UnexpectedStatus {
            endpoint: "/api/stats",
            status,
        }));
    }
    response.json::<ServerStats>().await.map_err(|err| {
        AppError::http(HttpError::EndpointRequestFailed {
            endpoint: "/api/stats",
            source: err,
        })
    })
}

/// Zeroes the server's counters.
///
/// # Errors
///
/// Returns an error when the request fails or the status is not 200.
pub async fn reset_server_stats(client: &Client, base: &Url) -> AppResult<()> {
    let url = endpoint_url(base, RESET_PATH)?;
    let response = client.post(url).send().await.map_err(|err| {
        AppError::http(HttpError::EndpointRequestFailed {
            endpoint: "/api/reset",
            source: err,
        })
    })?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(AppError::http(HttpError::UnexpectedStatus {
            endpoint: "/api/reset",
            status,
        }));
    }
    Ok(())
}
