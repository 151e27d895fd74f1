//! Synthetic payload server: generates bandwidth payloads and keeps
//! process-wide request/byte counters.
mod counters;
mod http;
mod payload;
mod routes;


use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ServerError};
use crate::shutdown::ShutdownSender;

pub use counters::{CounterSnapshot, ServerCounters};
pub use payload::{ALPHABET, generate};
pub use routes::{DEFAULT_PAYLOAD_SIZE, Response, ServerState, handle_request};

/// Binds the listener. Port `0` picks an ephemeral port; read it back with
/// `TcpListener::local_addr`.
///
/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> AppResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::server(ServerError::Bind { addr, source: err }))
}

/// Accepts connections until a shutdown signal arrives, handling each one on
/// its own task.
///
/// # Errors
///
/// Returns an error when the listener's local address cannot be read.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<()> {
    let local_addr = listener
        .local_addr()
        .map_err(|err| AppError::server(ServerError::LocalAddr { source: err }))?;
    log_endpoints(local_addr);

    let mut shutdown_rx = shutdown_tx.subscribe();
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Payload server shutting down");
                break;
            }
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("Failed to accept connection: {}", err);
                        continue;
                    }
                };
                debug!("Connection from {}", peer);
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    routes::handle_connection(socket, &state).await;
                });
            }
        }
    }
    Ok(())
}

fn log_endpoints(addr: SocketAddr) {
    info!("Bandwidth payload server listening on {}", addr);
    info!("  GET  /api/bandwidth?size=<bytes>  payload (default {} bytes)", DEFAULT_PAYLOAD_SIZE);
    info!("  GET  /api/stats                   server statistics");
    info!("  POST /api/reset                   reset statistics");
    info!("  GET  /api/health                  health check");
}
