use super::state::LedgerState;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A versioned read of the full ledger state.
pub struct StateSnapshot {
    pub version: u64,
    pub state: LedgerState,
}

/// Storage port with optimistic, serializable commits.
///
/// `commit` must atomically replace the state only if nothing committed
/// since the paired `begin`; otherwise it fails with `CommitConflict` and
/// the caller retries its whole operation. This one rule gives both
/// lost-update safety on balances and a single total order for the entry
/// hash chain.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<StateSnapshot>;
    async fn commit(&self, expected_version: u64, state: LedgerState) -> Result<()>;
}

pub type SharedLedgerStore = Arc<dyn LedgerStore>;
