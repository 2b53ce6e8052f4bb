use crate::domain::ports::{LedgerStore, StateSnapshot};
use crate::domain::state::LedgerState;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Versioned {
    version: u64,
    state: LedgerState,
}

/// Thread-safe in-memory store with optimistic version-checked commits.
///
/// `begin` hands out a cloned snapshot; `commit` swaps the whole state in
/// only if no other writer committed in between. Ideal for tests and for
/// single-process deployments.
#[derive(Clone)]
pub struct InMemoryLedgerStore {
    inner: Arc<RwLock<Versioned>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_state(LedgerState::new())
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Versioned { version: 0, state })),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<StateSnapshot> {
        let guard = self.inner.read().await;
        Ok(StateSnapshot {
            version: guard.version,
            state: guard.state.clone(),
        })
    }

    async fn commit(&self, expected_version: u64, state: LedgerState) -> Result<()> {
        let mut guard = self.inner.write().await;
        if guard.version != expected_version {
            return Err(LedgerError::CommitConflict);
        }
        guard.version += 1;
        guard.state = state;
        Ok(())
    }
}
