//! Wall-clock budget for long analyses.
//!
//! The job runs on tokio's blocking pool. When the budget expires the caller
//! gets [`GraphError::Timeout`] straight away; the job itself cannot be
//! interrupted and its eventual result is dropped.

use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};

/// Run a CPU-bound job, giving up after `budget`.
pub async fn run_with_budget<T, F>(budget: Duration, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let budget_ms = budget.as_millis() as u64;
    let handle = tokio::task::spawn_blocking(job);

    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(result)) => {
            debug!(budget_ms, "Job finished within budget");
            result
        }
        Ok(Err(join_err)) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
        Ok(Err(_)) => Err(GraphError::Timeout { budget_ms }),
        Err(_) => {
            warn!(budget_ms, "Analysis exceeded its time budget, abandoning result");
            Err(GraphError::Timeout { budget_ms })
        }
    }
}
