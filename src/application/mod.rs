pub mod fees;
pub mod ledger;
pub mod orchestrator;
pub mod reversal;
pub mod verify;

use crate::domain::ports::{LedgerStore, StateSnapshot};
use crate::domain::state::LedgerState;
use crate::error::{LedgerError, Result};

const COMMIT_RETRIES: u32 = 5;

/// Runs `op` as one atomic unit against the store.
///
/// The closure mutates a working copy of the state; any error aborts with
/// zero partial state, a commit conflict re-runs the closure from a fresh
/// snapshot. Callers must not perform external I/O inside `op` — side
/// effects like notifications belong after this returns.
pub async fn transact<T>(
    store: &dyn LedgerStore,
    op: impl Fn(&mut LedgerState) -> Result<T>,
) -> Result<T> {
    for attempt in 0..COMMIT_RETRIES {
        let StateSnapshot { version, mut state } = store.begin().await?;
        let out = op(&mut state)?;
        match store.commit(version, state).await {
            Ok(()) => return Ok(out),
            Err(LedgerError::CommitConflict) => {
                tracing::debug!(attempt, "commit conflict, retrying operation");
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(LedgerError::TransactionFailed)
}
