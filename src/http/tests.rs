use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use url::Url;

use super::*;
use crate::args::{PositiveU64, PositiveUsize};
use crate::domain::run::RunMode;
use crate::metrics::{FAILURE_STATUS, RequestOutcome};

/// Sleeps a per-id delay and tracks its own view of concurrency.
struct FakeExecutor {
    delay: fn(u64) -> Duration,
    origin: Instant,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    finished: AtomicUsize,
    started_at: Mutex<BTreeMap<u64, Duration>>,
}

impl FakeExecutor {
    fn new(delay: fn(u64) -> Duration) -> Self {
        Self {
            delay,
            origin: Instant::now(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            started_at: Mutex::new(BTreeMap::new()),
        }
    }

    fn started_at(&self, id: u64) -> Option<Duration> {
        self.started_at
            .lock()
            .ok()
            .and_then(|started| started.get(&id).copied())
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn execute(&self, id: u64) -> RequestOutcome {
        let begin = Instant::now();
        if let Ok(mut started) = self.started_at.lock() {
            started.insert(id, self.origin.elapsed());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = (self.delay)(id);
        sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
        RequestOutcome {
            id,
            status_code: if id % 5 == 0 { 500 } else { 200 },
            reported_transfer_time: delay,
            byte_size: 100,
            wall_clock_duration: begin.elapsed(),
        }
    }
}

fn run_async_test<F>(future: F) -> Result<(), String>
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

fn concurrency(value: usize) -> Result<PositiveUsize, String> {
    PositiveUsize::try_from(value).map_err(|err| err.to_string())
}

fn count_mode(value: u64) -> Result<RunMode, String> {
    PositiveU64::try_from(value)
        .map(RunMode::Count)
        .map_err(|err| err.to_string())
}

fn varied_delay(id: u64) -> Duration {
    Duration::from_millis(2_u64.saturating_add(id.saturating_mul(7) % 23))
}

#[test]
fn count_mode_issues_exactly_n_and_drains() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(FakeExecutor::new(varied_delay));
        let generator = LoadGenerator::new(Arc::clone(&executor), concurrency(10)?, count_mode(100)?);
        let report = generator.run().await;

        if report.outcomes.len() != 100 {
            return Err(format!("Expected 100 outcomes, got {}", report.outcomes.len()));
        }
        if executor.finished.load(Ordering::SeqCst) != 100 {
            return Err("Run returned before every request finished".to_owned());
        }
        let ids: BTreeSet<u64> = report.outcomes.iter().map(|outcome| outcome.id).collect();
        let expected: BTreeSet<u64> = (1..=100).collect();
        if ids != expected {
            return Err("Outcome ids are not exactly 1..=100".to_owned());
        }
        Ok(())
    })
}

#[test]
fn in_flight_never_exceeds_concurrency() -> Result<(), String> {
    run_async_test(async {
        for bound in [1_usize, 3, 10] {
            let executor = Arc::new(FakeExecutor::new(varied_delay));
            let generator =
                LoadGenerator::new(Arc::clone(&executor), concurrency(bound)?, count_mode(60)?);
            let report = generator.run().await;

            let observed = executor.peak.load(Ordering::SeqCst);
            if observed > bound || report.peak_in_flight > bound {
                return Err(format!(
                    "bound {} exceeded: executor saw {}, generator saw {}",
                    bound, observed, report.peak_in_flight
                ));
            }
            if report.peak_in_flight == 0 {
                return Err("Expected at least one request in flight".to_owned());
            }
        }
        Ok(())
    })
}

#[test]
fn bound_waits_for_oldest_task() -> Result<(), String> {
    fn slow_first(id: u64) -> Duration {
        if id == 1 {
            Duration::from_millis(300)
        } else {
            Duration::from_millis(5)
        }
    }

    run_async_test(async {
        let executor = Arc::new(FakeExecutor::new(slow_first));
        let generator = LoadGenerator::new(Arc::clone(&executor), concurrency(2)?, count_mode(4)?);
        let report = generator.run().await;
        if report.outcomes.len() != 4 {
            return Err(format!("Expected 4 outcomes, got {}", report.outcomes.len()));
        }

        // Request 2 finishes almost at once, but its slot is only reused
        // after request 1 (the oldest) completes.
        let third = executor
            .started_at(3)
            .ok_or_else(|| "request 3 never started".to_owned())?;
        if third < Duration::from_millis(250) {
            return Err(format!("request 3 started at {:?}, before the oldest finished", third));
        }
        Ok(())
    })
}

#[test]
fn duration_mode_stops_admitting_at_deadline_and_drains() -> Result<(), String> {
    fn steady(_id: u64) -> Duration {
        Duration::from_millis(120)
    }

    run_async_test(async {
        let budget = Duration::from_millis(400);
        let executor = Arc::new(FakeExecutor::new(steady));
        let generator = LoadGenerator::new(
            Arc::clone(&executor),
            concurrency(4)?,
            RunMode::Duration(budget),
        )
        .with_admission_delay(Duration::from_millis(1));
        let report = generator.run().await;

        let last = report
            .last_admission
            .ok_or_else(|| "nothing was admitted".to_owned())?;
        if last >= budget {
            return Err(format!("request admitted at {:?}, after the deadline", last));
        }
        let admitted = executor.started_at.lock().map_err(|err| err.to_string())?.len();
        if report.outcomes.len() != admitted {
            return Err(format!(
                "{} admitted but {} outcomes collected",
                admitted,
                report.outcomes.len()
            ));
        }
        if executor.finished.load(Ordering::SeqCst) != admitted {
            return Err("Run returned with requests still in flight".to_owned());
        }
        if report.elapsed < last.saturating_add(Duration::from_millis(100)) {
            return Err(format!(
                "last request admitted at {:?} was not awaited (elapsed {:?})",
                last, report.elapsed
            ));
        }
        if report.peak_in_flight > 4 {
            return Err(format!("bound exceeded: {}", report.peak_in_flight));
        }
        Ok(())
    })
}

#[test]
fn huge_bound_with_small_count_runs() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(FakeExecutor::new(varied_delay));
        let generator =
            LoadGenerator::new(Arc::clone(&executor), concurrency(usize::MAX)?, count_mode(3)?);
        let report = generator.run().await;

        if report.outcomes.len() != 3 {
            return Err(format!("Expected 3 outcomes, got {}", report.outcomes.len()));
        }
        if report.peak_in_flight > 3 {
            return Err(format!("Peak {} exceeds admitted count", report.peak_in_flight));
        }
        Ok(())
    })
}

#[test]
fn http_executor_records_transport_failure() -> Result<(), String> {
    run_async_test(async {
        // Bind then drop to get a port nothing is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("bind failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("addr failed: {}", err))?;
        drop(listener);

        let base = Url::parse(&format!("http://{}", addr)).map_err(|err| err.to_string())?;
        let url = bandwidth_url(&base, 64).map_err(|err| err.to_string())?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|err| err.to_string())?;
        let executor = HttpExecutor::new(client, url);
        let outcome = executor.execute(7).await;

        if outcome.id != 7 || outcome.status_code != FAILURE_STATUS {
            return Err(format!("Expected sentinel failure, got {:?}", outcome));
        }
        if outcome.byte_size != 0 || !outcome.reported_transfer_time.is_zero() {
            return Err(format!("Expected zeroed transfer fields, got {:?}", outcome));
        }
        Ok(())
    })
}

#[test]
fn endpoint_urls_keep_base_prefix() -> Result<(), String> {
    let plain = Url::parse("http://127.0.0.1:8080").map_err(|err| err.to_string())?;
    let url = bandwidth_url(&plain, 2048).map_err(|err| err.to_string())?;
    if url.as_str() != "http://127.0.0.1:8080/api/bandwidth?size=2048" {
        return Err(format!("Unexpected url {}", url));
    }

    let prefixed = Url::parse("http://host/bench").map_err(|err| err.to_string())?;
    let stats = endpoint_url(&prefixed, "api/stats").map_err(|err| err.to_string())?;
    if stats.as_str() != "http://host/bench/api/stats" {
        return Err(format!("Unexpected url {}", stats));
    }
    Ok(())
}
