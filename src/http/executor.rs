use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::metrics::RequestOutcome;

/// Issues one timed request. Implementations never fail: transport problems
/// are folded into the returned outcome.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn execute(&self, id: u64) -> RequestOutcome;
}

/// Executes `GET <base>/api/bandwidth?size=N` with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    url: Url,
}

impl HttpExecutor {
    #[must_use]
    pub const fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self, id: u64) -> RequestOutcome {
        let start = Instant::now();
        let request = match self.client.get(self.url.clone()).build() {
            Ok(request) => request,
            Err(err) => {
                debug!("request {} could not be built: {}", id, err);
                return RequestOutcome::failed(id, start.elapsed());
            }
        };

        let sent = Instant::now();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!("request {} failed: {}", id, err);
                return RequestOutcome::failed(id, start.elapsed());
            }
        };

        let status_code = response.status().as_u16();
        let byte_size = match drain_response_body(response).await {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("request {} failed while reading body: {}", id, err);
                return RequestOutcome::failed(id, start.elapsed());
            }
        };
        let reported_transfer_time = sent.elapsed();

        let outcome = RequestOutcome {
            id,
            status_code,
            reported_transfer_time,
            byte_size,
            wall_clock_duration: start.elapsed(),
        };
        debug!(
            "request {} status={} bytes={} time={:.6}s",
            id,
            status_code,
            byte_size,
            reported_transfer_time.as_secs_f64()
        );
        outcome
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
