use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use http::{Method, StatusCode};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, error};

use crate::error::ServerError;

use super::counters::ServerCounters;
use super::http::{read_http_request, write_response};
use super::payload::generate;

/// Payload size used when `size` is missing, unparseable, or not positive.
pub const DEFAULT_PAYLOAD_SIZE: i64 = 1024;

/// How long a connection may take to deliver its request head.
const REQUEST_HEAD_TIMEOUT: Duration = Duration::from_secs(10);

const VERSION: &str = env!("CARGO_PKG_VERSION");
const CONTENT_TYPE_JSON: &str = "application/json";

/// Shared state handed to every connection task.
#[derive(Debug)]
pub struct ServerState {
    pub counters: ServerCounters,
    /// Largest payload the server will generate.
    pub max_payload: u64,
}

impl ServerState {
    #[must_use]
    pub fn new(max_payload: u64) -> Self {
        Self {
            counters: ServerCounters::new(),
            max_payload,
        }
    }
}

/// A fully rendered response, ready to be written to the socket.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct BandwidthBody {
    message: String,
    timestamp: String,
    size: usize,
    data: String,
}

#[derive(Debug, Serialize)]
struct ResetBody {
    message: &'static str,
    time: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    uptime: f64,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'msg> {
    error: &'msg str,
}

pub(super) async fn handle_connection<S>(socket: S, state: &ServerState)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    handle_connection_within(socket, state, REQUEST_HEAD_TIMEOUT).await;
}

/// Like `handle_connection`, answering 408 when the request head does not
/// arrive within `read_timeout`.
pub(super) async fn handle_connection_within<S>(
    mut socket: S,
    state: &ServerState,
    read_timeout: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let read = timeout(read_timeout, read_http_request(&mut socket)).await;
    let response = match read {
        Err(_elapsed) => {
            debug!("Request head not received within {:?}", read_timeout);
            error_response(StatusCode::REQUEST_TIMEOUT, "Request timeout")
        }
        Ok(Ok(request)) => {
            debug!("{} {}", request.method, request.path);
            handle_request(
                &request.method,
                &request.path,
                request.query.as_deref(),
                state,
            )
        }
        Ok(Err(err)) => error_response(err.status, &err.message),
    };

    if let Err(err) =
        write_response(&mut socket, response.status, &response.headers, &response.body).await
    {
        debug!("Client went away before the response was written: {}", err);
    }
}

/// Routes one request. Counters change only on a successful bandwidth
/// response and on reset.
#[must_use]
pub fn handle_request(
    method: &str,
    path: &str,
    query: Option<&str>,
    state: &ServerState,
) -> Response {
    let Ok(method) = Method::from_bytes(method.as_bytes()) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid HTTP method");
    };
    match path {
        "/api/bandwidth" => {
            if method != Method::GET {
                return method_not_allowed("GET");
            }
            bandwidth(query, state).unwrap_or_else(|err| {
                error!("Failed to build bandwidth response: {}", err);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            })
        }
        "/api/stats" => {
            if method != Method::GET {
                return method_not_allowed("GET");
            }
            let stats = state.counters.snapshot().to_stats();
            json_response(StatusCode::OK, &stats)
        }
        "/api/reset" => {
            if method != Method::POST {
                return method_not_allowed("POST");
            }
            state.counters.reset_all();
            json_response(
                StatusCode::OK,
                &ResetBody {
                    message: "Statistics reset successfully",
                    time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                },
            )
        }
        "/api/health" => json_response(
            StatusCode::OK,
            &HealthBody {
                status: "healthy",
                uptime: state.counters.uptime().as_secs_f64(),
                version: VERSION,
            },
        ),
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn bandwidth(query: Option<&str>, state: &ServerState) -> Result<Response, ServerError> {
    let size = requested_size(query);
    if u64::try_from(size).unwrap_or(u64::MAX) > state.max_payload {
        return Ok(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &format!("Requested size exceeds {} bytes", state.max_payload),
        ));
    }

    let data = String::from_utf8(generate(size))
        .map_err(|err| ServerError::PayloadEncoding { source: err })?;
    let body = BandwidthBody {
        message: format!("Bandwidth test payload ({} bytes)", data.len()),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true),
        size: data.len(),
        data,
    };
    let bytes = serde_json::to_vec(&body).map_err(|err| ServerError::Serialize {
        context: "bandwidth response",
        source: err,
    })?;

    state
        .counters
        .increment(u64::try_from(bytes.len()).unwrap_or(u64::MAX));

    Ok(Response {
        status: StatusCode::OK,
        headers: vec![
            ("Content-Type", CONTENT_TYPE_JSON.to_owned()),
            ("Cache-Control", "no-cache".to_owned()),
            ("X-Content-Size", size.to_string()),
        ],
        body: bytes,
    })
}

fn requested_size(query: Option<&str>) -> i64 {
    query
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "size")
                .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        })
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAYLOAD_SIZE)
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => Response {
            status,
            headers: vec![("Content-Type", CONTENT_TYPE_JSON.to_owned())],
            body,
        },
        Err(err) => {
            error!("Failed to serialize response: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn method_not_allowed(allowed: &'static str) -> Response {
    let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    response.headers.push(("Allow", allowed.to_owned()));
    response
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::to_vec(&ErrorBody { error: message })
        .unwrap_or_else(|_err| b"{\"error\":\"Internal server error\"}".to_vec());
    Response {
        status,
        headers: vec![("Content-Type", CONTENT_TYPE_JSON.to_owned())],
        body,
    }
}
