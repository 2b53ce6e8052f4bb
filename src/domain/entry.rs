use super::money::{Currency, MONEY_EPSILON};
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sentinel `previous_hash` of the first entry in the chain.
pub const GENESIS_HASH: &str = "GENESIS";

/// English/Arabic text pair for user-facing descriptions and reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub en: String,
    pub ar: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }
}

/// One side of a journal entry. Both fields exist for symmetry; in typical
/// use exactly one is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntryLine {
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl LedgerEntryLine {
    pub fn debit(account_code: &str, amount: Decimal) -> Self {
        Self {
            account_code: account_code.to_string(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    pub fn credit(account_code: &str, amount: Decimal) -> Self {
        Self {
            account_code: account_code.to_string(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    /// The same movement with debit and credit swapped.
    pub fn mirrored(&self) -> Self {
        Self {
            account_code: self.account_code.clone(),
            debit: self.credit,
            credit: self.debit,
        }
    }
}

/// An immutable, hash-chained double-entry record.
///
/// Created once through the ledger engine; corrections only ever happen via
/// a new mirrored entry, never by touching an existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub entry_number: String,
    pub description: Bilingual,
    pub currency: Currency,
    pub lines: Vec<LedgerEntryLine>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub previous_hash: String,
    pub hash: String,
    pub transaction_ref: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validates the double-entry invariant and returns `(total_debit,
/// total_credit)`. Rejection happens before any storage write.
pub fn check_balanced(lines: &[LedgerEntryLine]) -> Result<(Decimal, Decimal), LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::Validation(
            "Entry must have at least one line".to_string(),
        ));
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for line in lines {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::Validation(
                "Line amounts must be non-negative".to_string(),
            ));
        }
        if line.debit == Decimal::ZERO && line.credit == Decimal::ZERO {
            return Err(LedgerError::Validation(
                "Line must move funds on at least one side".to_string(),
            ));
        }
        total_debit += line.debit;
        total_credit += line.credit;
    }

    if (total_debit - total_credit).abs() > MONEY_EPSILON {
        return Err(LedgerError::UnbalancedEntry {
            debits: total_debit,
            credits: total_credit,
        });
    }

    Ok((total_debit, total_credit))
}

/// SHA-256 over the entry's content plus the previous entry's hash.
pub fn compute_hash(
    entry_number: &str,
    description: &Bilingual,
    lines: &[LedgerEntryLine],
    previous_hash: &str,
    created_at: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry_number.as_bytes());
    hasher.update(description.en.as_bytes());
    hasher.update(description.ar.as_bytes());
    for line in lines {
        hasher.update(line.account_code.as_bytes());
        hasher.update(line.debit.to_string().as_bytes());
        hasher.update(line.credit.to_string().as_bytes());
    }
    hasher.update(previous_hash.as_bytes());
    hasher.update(created_at.to_rfc3339().as_bytes());
    hex::encode(hasher.finalize())
}

impl LedgerEntry {
    /// Recomputes this entry's hash from its stored fields.
    pub fn recompute_hash(&self) -> String {
        compute_hash(
            &self.entry_number,
            &self.description,
            &self.lines,
            &self.previous_hash,
            self.created_at,
        )
    }
}
