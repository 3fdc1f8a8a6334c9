use std::{future::Future, sync::Arc};

use swap_models::SwapIntent;
use tokio::{
    task::{JoinError, JoinHandle},
    time::sleep,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    backend::SwapBackend,
    orchestrator::{CycleOutcome, SwapOrchestrator},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// The last cycle was refused by a precondition.
    pub rejected: bool,
    /// The last completed cycle had at least one failed account.
    pub last_cycle_failed: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        !self.rejected && !self.last_cycle_failed
    }
}

/// Runs cycles until the intent stops repeating, a cycle is rejected, or
/// `cancel` fires. Cancelling drops the cycle in flight.
pub async fn run_repeating<B: SwapBackend>(
    orchestrator: &SwapOrchestrator<B>,
    intent: &SwapIntent,
    cancel: CancellationToken,
) -> RunSummary {
    let mut summary = RunSummary::default();

    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                info!(cycles = summary.cycles, "swap run cancelled");
                break;
            }
            outcome = orchestrator.run_cycle(intent) => outcome,
        };
        summary.cycles += 1;

        match outcome {
            CycleOutcome::Completed(report) => {
                summary.succeeded += report.succeeded;
                summary.failed += report.failed;
                summary.last_cycle_failed = report.has_failures();
            }
            CycleOutcome::Rejected(_) => {
                summary.rejected = true;
                break;
            }
        }

        let Some(interval) = intent.repeat_interval.filter(|_| intent.repeats()) else {
            break;
        };
        info!("next cycle in {}", humantime::format_duration(interval));

        tokio::select! {
            _ = cancel.cancelled() => {
                info!(cycles = summary.cycles, "repeat cancelled");
                break;
            }
            _ = sleep(interval) => {}
        }
    }

    summary
}

/// [`run_repeating`] on its own task.
pub struct RepeatTask {
    cancel: CancellationToken,
    handle: JoinHandle<RunSummary>,
}

impl RepeatTask {
    pub fn spawn<B>(orchestrator: Arc<SwapOrchestrator<B>>, intent: SwapIntent) -> Self
    where
        B: SwapBackend + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle =
            tokio::spawn(async move { run_repeating(&orchestrator, &intent, token).await });
        Self { cancel, handle }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) -> Result<RunSummary, JoinError> {
        self.handle.await
    }

    /// Waits for the task, cancelling it once `shutdown` resolves.
    pub async fn join_until<F>(mut self, shutdown: F) -> Result<RunSummary, JoinError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            summary = &mut self.handle => summary,
            () = shutdown => {
                info!("shutdown requested, stopping swaps");
                self.cancel.cancel();
                self.handle.await
            }
        }
    }
}
