use std::net::SocketAddr;
use std::sync::Arc;

use crate::args::ServeArgs;
use crate::error::AppResult;
use crate::server::{ServerState, bind, serve};
use crate::shutdown::shutdown_channel;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

/// Largest generated payload when `--max-payload` is not given (100 MiB).
const DEFAULT_MAX_PAYLOAD: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    pub listen: SocketAddr,
    pub max_payload: u64,
}

impl From<&ServeArgs> for ServeOptions {
    fn from(args: &ServeArgs) -> Self {
        Self {
            listen: args.listen,
            max_payload: args
                .max_payload
                .map_or(DEFAULT_MAX_PAYLOAD, |value| value.get()),
        }
    }
}

/// `bwbench serve`: run the payload server until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error when the listen address cannot be bound.
pub async fn execute_serve(options: ServeOptions) -> AppResult<()> {
    let listener = bind(options.listen).await?;
    let state = Arc::new(ServerState::new(options.max_payload));
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let result = serve(listener, state, &shutdown_tx).await;
    signal_handle.abort();
    result
}
