use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::args::PositiveUsize;
use crate::domain::run::RunMode;
use crate::metrics::RequestOutcome;

use super::executor::Executor;

/// Pause between admission rounds in duration mode once the bound is hit.
pub const ADMISSION_DELAY: Duration = Duration::from_millis(10);
/// Count-mode progress is logged every this many completions.
pub const PROGRESS_INTERVAL: u64 = 10;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Every outcome, in completion order.
    pub outcomes: Vec<RequestOutcome>,
    /// From the first admission check until the last task drained.
    pub elapsed: Duration,
    /// Highest number of executor tasks outstanding at once.
    pub peak_in_flight: usize,
    /// Offset from run start at which the last request was admitted.
    pub last_admission: Option<Duration>,
}

/// Admits executor tasks up to a concurrency bound until the run mode's
/// termination condition holds, then drains.
///
/// At the bound the generator waits for the *oldest* outstanding task, not
/// for whichever finishes first. A slow early request therefore holds back
/// admission even when later ones are done, so effective concurrency can
/// dip below the bound under uneven latency. Waiting for any completion
/// would strictly dominate; FIFO is kept for result compatibility.
pub struct LoadGenerator<E: Executor> {
    executor: Arc<E>,
    concurrency: usize,
    mode: RunMode,
    admission_delay: Duration,
}

impl<E: Executor> LoadGenerator<E> {
    #[must_use]
    pub fn new(executor: Arc<E>, concurrency: PositiveUsize, mode: RunMode) -> Self {
        Self {
            executor,
            concurrency: concurrency.get(),
            mode,
            admission_delay: ADMISSION_DELAY,
        }
    }

    #[must_use]
    pub const fn with_admission_delay(mut self, delay: Duration) -> Self {
        self.admission_delay = delay;
        self
    }

    /// Runs to completion. No task is cancelled: requests still in flight
    /// when admission stops are awaited and included in the report.
    pub async fn run(&self) -> RunReport {
        let start = Instant::now();
        // `None` in duration mode: the deadline lies past what `Instant` can hold.
        let deadline = match self.mode {
            RunMode::Duration(duration) => start.checked_add(duration),
            RunMode::Count(_) => None,
        };
        let progress_total = match self.mode {
            RunMode::Count(total) => Some(total.get()),
            RunMode::Duration(_) => None,
        };

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<RequestOutcome>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicU64::new(0));
        let mut pending: VecDeque<JoinHandle<()>> = VecDeque::new();
        let mut admitted: u64 = 0;
        let mut peak_in_flight: usize = 0;
        let mut last_admission = None;

        while self.admission_open(admitted, deadline) {
            if pending.len() >= self.concurrency {
                if let Some(oldest) = pending.pop_front() {
                    await_task(oldest).await;
                }
                reap_finished_front(&mut pending).await;
                if matches!(self.mode, RunMode::Duration(_)) && !self.admission_delay.is_zero() {
                    sleep(self.admission_delay).await;
                }
                continue;
            }

            admitted = admitted.saturating_add(1);
            last_admission = Some(start.elapsed());
            let now_in_flight = in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
            peak_in_flight = peak_in_flight.max(now_in_flight);

            let executor = Arc::clone(&self.executor);
            let outcome_tx = outcome_tx.clone();
            let in_flight = Arc::clone(&in_flight);
            let completed = Arc::clone(&completed);
            let id = admitted;
            pending.push_back(tokio::spawn(async move {
                let outcome = executor.execute(id).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                if outcome_tx.send(outcome).is_err() {
                    warn!("Outcome for request {} dropped: collector closed", id);
                }
                let done = completed.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                if let Some(total) = progress_total
                    && done % PROGRESS_INTERVAL == 0
                {
                    info!("Progress: {}/{} requests completed", done, total);
                }
            }));
        }

        while let Some(task) = pending.pop_front() {
            await_task(task).await;
        }
        let elapsed = start.elapsed();

        drop(outcome_tx);
        let mut outcomes = Vec::with_capacity(usize::try_from(admitted).unwrap_or(0));
        while let Some(outcome) = outcome_rx.recv().await {
            outcomes.push(outcome);
        }

        RunReport {
            outcomes,
            elapsed,
            peak_in_flight,
            last_admission,
        }
    }

    fn admission_open(&self, admitted: u64, deadline: Option<Instant>) -> bool {
        match (self.mode, deadline) {
            (RunMode::Count(total), _) => admitted < total.get(),
            (RunMode::Duration(_), Some(deadline)) => Instant::now() < deadline,
            (RunMode::Duration(_), None) => true,
        }
    }
}

async fn await_task(task: JoinHandle<()>) {
    if let Err(err) = task.await {
        warn!("Request task failed: {}", err);
    }
}

/// Drops already-finished handles from the front of the queue without
/// blocking, so one FIFO wait can free several slots at once.
async fn reap_finished_front(pending: &mut VecDeque<JoinHandle<()>>) {
    while pending.front().is_some_and(JoinHandle::is_finished) {
        if let Some(task) = pending.pop_front() {
            await_task(task).await;
        }
    }
}
