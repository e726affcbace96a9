//! Runs a cascade plan inside one transaction.

use super::kind::CascadeKind;
use super::outcome::{Fault, FaultKind};
use super::planner::CascadePlan;
use super::store::{CascadeStore, CascadeTransaction, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub steps: usize,
    pub deleted: u64,
}

/// Apply every step in order, then commit.
///
/// Any step failure aborts the transaction, so either all deletes land or none
/// do. There are no retries.
pub async fn execute(
    store: &dyn CascadeStore,
    kind: CascadeKind,
    plan: &CascadePlan,
) -> Result<ExecutionReport, Fault> {
    let mut trx = store
        .begin()
        .await
        .map_err(|e| Fault::new(FaultKind::TransactionStart, None, cause(e)))?;

    let mut report = ExecutionReport::default();
    for op in plan.steps() {
        match trx.step(op).await {
            Ok(deleted) => {
                tracing::debug!(
                    operation = %kind,
                    step = %op,
                    deleted,
                    "Cascade step applied"
                );
                metrics::counter!(
                    "cascade_steps_total",
                    "operation" => kind.operation_name(),
                    "step" => op.kind()
                )
                .increment(1);
                report.steps += 1;
                report.deleted += deleted;
            }
            Err(e) => {
                let cause = abort_after(trx.as_mut(), cause(e)).await;
                return Err(Fault::new(FaultKind::Step, Some(op.to_string()), cause));
            }
        }
    }

    // A failed commit leaves nothing to abort.
    trx.commit()
        .await
        .map_err(|e| Fault::new(FaultKind::Commit, None, cause(e)))?;

    Ok(report)
}

async fn abort_after(trx: &mut dyn CascadeTransaction, reason: String) -> String {
    match trx.abort().await {
        Ok(()) => reason,
        Err(e) => {
            tracing::error!(error = %e, "Failed to abort cascade transaction");
            format!("{}; abort also failed: {}", reason, cause(e))
        }
    }
}

/// Keeps the error class (`database error: ...` or `cursor error: ...`).
fn cause(err: StoreError) -> String {
    err.to_string()
}
