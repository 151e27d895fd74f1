use std::sync::Arc;

use tracing::{info, warn};

use crate::args::RunArgs;
use crate::config::{load_config, resolve_run_settings};
use crate::domain::run::{RunMode, RunSettings, TestConfiguration};
use crate::error::AppResult;
use crate::http::{
    HttpExecutor, LoadGenerator, bandwidth_url, build_client, fetch_server_stats,
    reset_server_stats,
};
use crate::metrics::{AggregateStats, ServerStats, aggregate};
use crate::sinks::write_report;

use super::summary::summary_lines;

/// Client-side figures for a finished run plus the server's own view.
#[derive(Debug)]
pub struct RunSummary {
    pub config: TestConfiguration,
    pub stats: AggregateStats,
    /// `None` when `/api/stats` could not be fetched after the run.
    pub server: Option<ServerStats>,
    pub peak_in_flight: usize,
}

/// `bwbench run`: resolve settings, run, print the summary, write the
/// optional report.
///
/// # Errors
///
/// Returns an error for unusable configuration or when the report cannot be
/// written. Individual request failures never surface here.
pub async fn execute_run(args: &RunArgs) -> AppResult<()> {
    let config_file = load_config(args.config.as_deref())?;
    let settings = resolve_run_settings(args, config_file.as_ref())?;

    let summary = run_load_test(&settings).await?;
    for line in summary_lines(&summary) {
        println!("{}", line);
    }

    if let Some(path) = settings.output.as_ref() {
        write_report(path, &summary.stats).await?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

/// Validates `settings`, drives the load generator against the target, and
/// aggregates the outcomes.
///
/// # Errors
///
/// Returns a configuration error before any request is issued when the
/// settings are invalid, or an error if the HTTP client cannot be built.
pub async fn run_load_test(settings: &RunSettings) -> AppResult<RunSummary> {
    let config = TestConfiguration::from_settings(settings)?;
    let client = build_client(&config)?;
    let url = bandwidth_url(&config.target_url, config.payload_size.get())?;

    if settings.reset_stats {
        match reset_server_stats(&client, &config.target_url).await {
            Ok(()) => info!("Server statistics reset"),
            Err(err) => warn!("Could not reset server statistics: {}", err),
        }
    }

    match config.mode {
        RunMode::Count(total) => info!(
            "Sending {} requests to {} (concurrency {})",
            total.get(),
            url,
            config.concurrency.get()
        ),
        RunMode::Duration(duration) => info!(
            "Sending requests to {} for {:?} (concurrency {})",
            url,
            duration,
            config.concurrency.get()
        ),
    }

    let executor = Arc::new(HttpExecutor::new(client.clone(), url));
    let generator = LoadGenerator::new(executor, config.concurrency, config.mode);
    let report = generator.run().await;
    let stats = aggregate(&report.outcomes, report.elapsed);
    info!(
        "Run finished: {} requests ({} failed) in {:.2}s",
        stats.total, stats.failed, stats.elapsed_secs
    );

    let server = match fetch_server_stats(&client, &config.target_url).await {
        Ok(server) => Some(server),
        Err(err) => {
            warn!("Could not fetch server statistics: {}", err);
            None
        }
    };

    Ok(RunSummary {
        config,
        stats,
        server,
        peak_in_flight: report.peak_in_flight,
    })
}
