use std::ffi::OsStr;
use std::future::Future;
use std::net::SocketAddr;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use bwbench::domain::run::RunSettings;
use bwbench::server::{ServerState, bind, serve};
use bwbench::shutdown::{ShutdownSender, shutdown_channel};
use tokio::task::JoinHandle;

/// Largest payload the test server accepts.
pub const TEST_MAX_PAYLOAD: u64 = 1024 * 1024;

/// An in-process payload server bound to an ephemeral port. Dropping the
/// handle stops the accept loop.
pub struct PayloadServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
    shutdown_tx: ShutdownSender,
    task: Option<JoinHandle<()>>,
}

impl Drop for PayloadServer {
    fn drop(&mut self) {
        let _send_result = self.shutdown_tx.send(());
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts the payload server on `127.0.0.1:0` inside the current runtime.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn spawn_payload_server() -> Result<PayloadServer, String> {
    let addr: SocketAddr = "127.0.0.1:0"
        .parse()
        .map_err(|err| format!("parse addr failed: {}", err))?;
    let listener = bind(addr)
        .await
        .map_err(|err| format!("bind payload server failed: {}", err))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;

    let state = Arc::new(ServerState::new(TEST_MAX_PAYLOAD));
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let task_state = Arc::clone(&state);
    let task_shutdown = shutdown_tx.clone();
    let task = tokio::spawn(async move {
        if let Err(err) = serve(listener, task_state, &task_shutdown).await {
            eprintln!("payload server stopped: {}", err);
        }
    });

    Ok(PayloadServer {
        base_url: format!("http://{}", local_addr),
        state,
        shutdown_tx,
        task: Some(task),
    })
}

/// Run settings pointed at `base_url` with the usual timeouts.
#[must_use]
pub fn settings_for(base_url: &str, concurrency: u64, payload_size: u64) -> RunSettings {
    RunSettings {
        url: Some(base_url.to_owned()),
        concurrency,
        requests: None,
        duration: None,
        payload_size,
        request_timeout: Duration::from_secs(10),
        connect_timeout: Duration::from_secs(5),
        output: None,
        reset_stats: false,
    }
}

/// Runs an async test body on a fresh multi-threaded runtime.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built or the body fails.
pub fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Run the `bwbench` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_bwbench<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = bwbench_bin()?;
    Command::new(bin)
        .args(args)
        .env("BWBENCH_LOG", "error")
        .output()
        .map_err(|err| format!("run bwbench failed: {}", err))
}

fn bwbench_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_bwbench").map_or_else(
        || Err("CARGO_BIN_EXE_bwbench missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
