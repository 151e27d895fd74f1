use std::collections::HashMap;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{AppError, AppResult, ServerError};

const MAX_REQUEST_BYTES: usize = 64 * 1024;
const READ_CHUNK: usize = 1024;

#[derive(Debug)]
pub(super) struct HttpRequest {
    pub(super) method: String,
    pub(super) path: String,
    pub(super) query: Option<String>,
}

#[derive(Debug)]
pub(super) struct RequestError {
    pub(super) status: StatusCode,
    pub(super) message: String,
}

impl RequestError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Reads one request head. Bodies are drained and discarded; no route
/// consumes one.
pub(super) async fn read_http_request<S>(socket: &mut S) -> Result<HttpRequest, RequestError>
where
    S: AsyncRead + Unpin,
{
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let header_end;

    loop {
        let bytes = socket.read(&mut chunk).await.map_err(|err| {
            RequestError::new(
                StatusCode::BAD_REQUEST,
                format!("Failed to read request: {}", err),
            )
        })?;
        if bytes == 0 {
            return Err(RequestError::new(StatusCode::BAD_REQUEST, "Empty request"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::new(StatusCode::BAD_REQUEST, "Invalid read length"))?;
        buffer.extend_from_slice(read_slice);
        if let Some(pos) = find_header_end(&buffer) {
            header_end = pos;
            break;
        }
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request too large",
            ));
        }
    }

    let header_bytes = buffer
        .get(..header_end)
        .ok_or_else(|| RequestError::new(StatusCode::BAD_REQUEST, "Malformed request headers"))?;
    let header_text = std::str::from_utf8(header_bytes).map_err(|err| {
        RequestError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request encoding: {}", err),
        )
    })?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| RequestError::new(StatusCode::BAD_REQUEST, "Missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestError::new(StatusCode::BAD_REQUEST, "Missing HTTP method"))?;
    let target = parts
        .next()
        .ok_or_else(|| RequestError::new(StatusCode::BAD_REQUEST, "Missing request path"))?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(RequestError::new(StatusCode::BAD_REQUEST, "Malformed header"));
        };
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    let content_length = headers
        .get("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        return Err(RequestError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    let body_start = header_end.saturating_add(4);
    let mut received = buffer.len().saturating_sub(body_start);
    while received < content_length {
        let bytes = socket.read(&mut chunk).await.map_err(|err| {
            RequestError::new(
                StatusCode::BAD_REQUEST,
                format!("Failed to read body: {}", err),
            )
        })?;
        if bytes == 0 {
            break;
        }
        received = received.saturating_add(bytes);
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target.to_owned(), None),
    };

    Ok(HttpRequest {
        method: method.to_owned(),
        path,
        query,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

pub(super) async fn write_response<S>(
    socket: &mut S,
    status: StatusCode,
    headers: &[(&'static str, String)],
    body: &[u8],
) -> AppResult<()>
where
    S: AsyncWrite + Unpin,
{
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    for (name, value) in headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("Content-Length: ");
    head.push_str(&body.len().to_string());
    head.push_str("\r\nConnection: close\r\n\r\n");

    socket.write_all(head.as_bytes()).await.map_err(|err| {
        AppError::server(ServerError::Io {
            context: "write response head",
            source: err,
        })
    })?;
    socket.write_all(body).await.map_err(|err| {
        AppError::server(ServerError::Io {
            context: "write response body",
            source: err,
        })
    })?;
    socket.flush().await.map_err(|err| {
        AppError::server(ServerError::Io {
            context: "flush response",
            source: err,
        })
    })?;
    Ok(())
}
