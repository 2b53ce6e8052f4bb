use super::ledger::{EntryDraft, post_entry};
use super::orchestrator::record_transaction;
use super::transact;
use crate::domain::entry::Bilingual;
use crate::domain::ports::SharedLedgerStore;
use crate::domain::reversal::ReversalRecord;
use crate::domain::state::LedgerState;
use crate::domain::transaction::{Party, Transaction, TransactionStatus, TransactionType};
use crate::domain::wallet::WalletKind;
use crate::error::{LedgerError, Result};
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct ReversalReceipt {
    pub reversal_transaction_id: u64,
    pub reversal_reference: String,
    pub ledger_entry_id: Option<u64>,
}

/// Undoes the fast-path wallet/profile effects of `original`. The mirrored
/// journal entry handles the formal accounts; without this the operational
/// balances would drift from the books forever.
fn apply_inverse_effects(state: &mut LedgerState, original: &Transaction) -> Result<()> {
    let currency = original.currency;
    let amount = original.amount;
    let fees = &original.fees;

    match (original.tx_type, original.sender, original.receiver) {
        (TransactionType::Deposit, Party::Agent(agent_id), Party::User(user_id)) => {
            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .debit(fees.net_amount)?;
            let agent = state.agent_mut(agent_id)?;
            agent.draw_cash(currency, amount)?;
            agent.current_credit.add(currency, amount);
            agent.total_deposits.add(currency, -amount);
            Ok(())
        }
        (TransactionType::Withdraw, Party::User(user_id), Party::Agent(agent_id)) => {
            let agent = state.agent_mut(agent_id)?;
            agent.draw_credit(currency, fees.net_amount)?;
            agent.cash_collected.add(currency, amount);
            agent.total_withdrawals.add(currency, -amount);
            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .credit(amount);
            Ok(())
        }
        (TransactionType::Transfer, Party::User(sender_id), Party::User(receiver_id)) => {
            state
                .wallet_mut(receiver_id, currency, WalletKind::Personal)?
                .debit(amount)?;
            state
                .wallet_mut(sender_id, currency, WalletKind::Personal)?
                .credit(amount + fees.total_fee);
            Ok(())
        }
        (TransactionType::QrPayment, Party::User(payer_id), Party::Merchant(merchant_id)) => {
            let merchant = state.merchant_mut(merchant_id)?;
            let available = merchant.balances.get(currency);
            if available < fees.net_amount {
                return Err(LedgerError::InsufficientBalance {
                    available,
                    required: fees.net_amount,
                });
            }
            merchant.balances.add(currency, -fees.net_amount);
            merchant.total_sales.add(currency, -amount);
            merchant.total_transactions = merchant.total_transactions.saturating_sub(1);
            state
                .wallet_mut(payer_id, currency, WalletKind::Personal)?
                .credit(amount);
            Ok(())
        }
        (TransactionType::ServicePurchase, Party::User(user_id), Party::System) => {
            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .credit(amount);
            Ok(())
        }
        (TransactionType::CreditIssue, Party::System, Party::Agent(agent_id)) => {
            state.agent_mut(agent_id)?.draw_credit(currency, amount)
        }
        _ => Err(LedgerError::Validation(format!(
            "Transaction type {} cannot be reversed",
            original.tx_type
        ))),
    }
}

/// Produces compensating entries for a completed transaction without ever
/// mutating history: a new REFUND transaction, a mirrored journal entry,
/// a status flip on the original, and an immutable link record — all in
/// one atomic unit.
pub struct ReversalService {
    store: SharedLedgerStore,
}

impl ReversalService {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self { store }
    }

    pub async fn reverse(
        &self,
        original_reference: &str,
        reason: Bilingual,
        reversed_by: &str,
    ) -> Result<ReversalReceipt> {
        let original_reference = original_reference.to_string();
        let reversed_by = reversed_by.to_string();

        let receipt = transact(self.store.as_ref(), |state| {
            let original = state
                .transactions
                .get(&original_reference)
                .cloned()
                .ok_or_else(|| LedgerError::TransactionNotFound(original_reference.clone()))?;
            if original.status == TransactionStatus::Reversed {
                return Err(LedgerError::AlreadyReversed(original_reference.clone()));
            }

            apply_inverse_effects(state, &original)?;

            let (id, reversal_reference) = record_transaction(
                state,
                TransactionType::Refund,
                original.receiver,
                original.sender,
                original.amount,
                original.currency,
                original.fees.clone(),
                Some(format!("Reversal of {original_reference}: {}", reason.en)),
            );

            // Mirror the original entry line by line; the original row in
            // the hash chain is left untouched.
            let ledger_entry_id = match original.ledger_entry_id {
                Some(entry_id) => {
                    let source = state.entry_by_id(entry_id).ok_or_else(|| {
                        LedgerError::Storage(format!(
                            "Ledger entry {entry_id} referenced by {original_reference} is missing"
                        ))
                    })?;
                    let source_number = source.entry_number.clone();
                    let mirrored = source.lines.iter().map(|l| l.mirrored()).collect();
                    let posted = post_entry(
                        state,
                        EntryDraft {
                            description: Bilingual::new(
                                format!("Reversal of entry {source_number}: {}", reason.en),
                                format!("عكس القيد {source_number}: {}", reason.ar),
                            ),
                            currency: original.currency,
                            lines: mirrored,
                            created_by: Some(reversed_by.clone()),
                            transaction_ref: Some(reversal_reference.clone()),
                        },
                    )?;
                    Some(posted.id)
                }
                None => None,
            };

            let original_row = state
                .transactions
                .get_mut(&original_reference)
                .ok_or_else(|| LedgerError::TransactionNotFound(original_reference.clone()))?;
            original_row.status = TransactionStatus::Reversed;

            state.reversals.push(ReversalRecord {
                original_reference: original_reference.clone(),
                reversal_reference: reversal_reference.clone(),
                reason: reason.clone(),
                reversed_by: reversed_by.clone(),
                reversed_at: Utc::now(),
            });

            Ok(ReversalReceipt {
                reversal_transaction_id: id,
                reversal_reference,
                ledger_entry_id,
            })
        })
        .await?;

        tracing::info!(
            original = %original_reference,
            reversal = %receipt.reversal_reference,
            by = %reversed_by,
            "transaction reversed"
        );
        Ok(receipt)
    }

    pub async fn reversals(&self) -> Result<Vec<ReversalRecord>> {
        let snapshot = self.store.begin().await?;
        Ok(snapshot.state.reversals)
    }
}
