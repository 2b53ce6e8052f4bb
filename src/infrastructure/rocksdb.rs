use crate::domain::ports::{LedgerStore, StateSnapshot};
use crate::domain::state::LedgerState;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

const KEY_VERSION: &[u8] = b"version";
const KEY_STATE: &[u8] = b"state";

/// Persistent store implementation using RocksDB.
///
/// The full ledger state and its version are written together in one
/// `WriteBatch`, so a commit is atomic on disk. An in-process mutex
/// serializes the version check against the batch write; cross-process
/// writers are not supported.
#[derive(Clone)]
pub struct RocksDbLedgerStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDbLedgerStore {
    /// Opens or creates a database at `path`, seeding a fresh ledger state
    /// on first open.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path).map_err(|e| LedgerError::Storage(e.to_string()))?;

        if db
            .get(KEY_STATE)
            .map_err(|e| LedgerError::Storage(e.to_string()))?
            .is_none()
        {
            let state = serde_json::to_vec(&LedgerState::new())
                .map_err(|e| LedgerError::Storage(format!("Serialization error: {e}")))?;
            let mut batch = WriteBatch::default();
            batch.put(KEY_VERSION, 0u64.to_be_bytes());
            batch.put(KEY_STATE, state);
            db.write(batch)
                .map_err(|e| LedgerError::Storage(e.to_string()))?;
        }

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn read_version(&self) -> Result<u64> {
        let bytes = self
            .db
            .get(KEY_VERSION)
            .map_err(|e| LedgerError::Storage(e.to_string()))?
            .ok_or_else(|| LedgerError::Storage("Version key missing".to_string()))?;
        let bytes: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| LedgerError::Storage("Corrupt version key".to_string()))?;
        Ok(u64::from_be_bytes(bytes))
    }

    fn read_state(&self) -> Result<LedgerState> {
        let bytes = self
            .db
            .get(KEY_STATE)
            .map_err(|e| LedgerError::Storage(e.to_string()))?
            .ok_or_else(|| LedgerError::Storage("State key missing".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| LedgerError::Storage(format!("Deserialization error: {e}")))
    }
}

#[async_trait]
impl LedgerStore for RocksDbLedgerStore {
    async fn begin(&self) -> Result<StateSnapshot> {
        let _guard = self.commit_lock.lock().await;
        Ok(StateSnapshot {
            version: self.read_version()?,
            state: self.read_state()?,
        })
    }

    async fn commit(&self, expected_version: u64, state: LedgerState) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        if self.read_version()? != expected_version {
            return Err(LedgerError::CommitConflict);
        }

        let bytes = serde_json::to_vec(&state)
            .map_err(|e| LedgerError::Storage(format!("Serialization error: {e}")))?;
        let mut batch = WriteBatch::default();
        batch.put(KEY_VERSION, (expected_version + 1).to_be_bytes());
        batch.put(KEY_STATE, bytes);
        self.db
            .write(batch)
            .map_err(|e| LedgerError::Storage(e.to_string()))
    }
}
