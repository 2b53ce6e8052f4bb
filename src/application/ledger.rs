use super::transact;
use crate::domain::account::LedgerAccount;
use crate::domain::entry::{
    Bilingual, LedgerEntry, LedgerEntryLine, check_balanced, compute_hash,
};
use crate::domain::ids::generate_reference;
use crate::domain::money::Currency;
use crate::domain::ports::SharedLedgerStore;
use crate::domain::state::LedgerState;
use crate::error::{LedgerError, Result};
use chrono::Utc;
use rust_decimal::Decimal;

const ENTRY_PREFIX: &str = "JE";

/// Input for one journal entry.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub description: Bilingual,
    pub currency: Currency,
    pub lines: Vec<LedgerEntryLine>,
    pub created_by: Option<String>,
    /// Reference number of the originating transaction, if any; the
    /// transaction row is linked to the created entry.
    pub transaction_ref: Option<String>,
}

/// Summary of a successfully posted entry.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    pub id: u64,
    pub entry_number: String,
    pub hash: String,
}

/// Validates, numbers, hash-chains, and applies one journal entry to the
/// working state. Shared by the public engine and the orchestrator so both
/// post entries inside the same atomic unit as their other writes.
pub(crate) fn post_entry(state: &mut LedgerState, draft: EntryDraft) -> Result<PostedEntry> {
    let (total_debit, total_credit) = check_balanced(&draft.lines)?;

    // Every referenced account must resolve before anything is written.
    for line in &draft.lines {
        if !state.accounts.contains_key(&line.account_code) {
            return Err(LedgerError::AccountNotFound(line.account_code.clone()));
        }
    }

    let created_at = Utc::now();
    let previous_hash = state.last_entry_hash().to_string();

    // Suffixes are random; on the rare collision, draw again.
    let entry_number = loop {
        let candidate = generate_reference(ENTRY_PREFIX, created_at);
        if !state.entry_numbers.contains(&candidate) {
            break candidate;
        }
    };

    let hash = compute_hash(
        &entry_number,
        &draft.description,
        &draft.lines,
        &previous_hash,
        created_at,
    );

    for line in &draft.lines {
        let sign = state.account(&line.account_code)?.account_type.debit_sign();
        let delta = (line.debit - line.credit) * sign;
        state.adjust_balance(&line.account_code, draft.currency, delta)?;
    }

    let id = state.next_entry_id;
    state.next_entry_id += 1;
    state.entry_numbers.insert(entry_number.clone());
    state.entries.push(LedgerEntry {
        id,
        entry_number: entry_number.clone(),
        description: draft.description,
        currency: draft.currency,
        lines: draft.lines,
        total_debit,
        total_credit,
        previous_hash,
        hash: hash.clone(),
        transaction_ref: draft.transaction_ref.clone(),
        created_by: draft.created_by,
        created_at,
    });

    if let Some(ref tx_ref) = draft.transaction_ref
        && let Some(tx) = state.transactions.get_mut(tx_ref)
    {
        tx.ledger_entry_id = Some(id);
    }

    Ok(PostedEntry {
        id,
        entry_number,
        hash,
    })
}

/// The Ledger Entry Engine: the only write path into the journal.
pub struct LedgerService {
    store: SharedLedgerStore,
}

impl LedgerService {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self { store }
    }

    /// Creates one balanced, hash-chained entry. On success the entry is
    /// immutable; corrections happen only via a new mirrored entry.
    pub async fn create_entry(&self, draft: EntryDraft) -> Result<PostedEntry> {
        let posted = transact(self.store.as_ref(), |state| {
            post_entry(state, draft.clone())
        })
        .await?;
        tracing::info!(
            entry_number = %posted.entry_number,
            "ledger entry posted"
        );
        Ok(posted)
    }

    /// Idempotent chart-of-accounts upsert; existing balances survive.
    pub async fn ensure_account(&self, account: LedgerAccount) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state.ensure_account(account.clone());
            Ok(())
        })
        .await
    }

    pub async fn account_balance(&self, code: &str, currency: Currency) -> Result<Decimal> {
        let snapshot = self.store.begin().await?;
        snapshot.state.account_balance(code, currency)
    }

    pub async fn entry(&self, id: u64) -> Result<Option<LedgerEntry>> {
        let snapshot = self.store.begin().await?;
        Ok(snapshot.state.entry_by_id(id).cloned())
    }

    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let snapshot = self.store.begin().await?;
        Ok(snapshot.state.entries)
    }
}
