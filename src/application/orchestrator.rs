use super::fees::calculate_commission;
use super::ledger::{EntryDraft, post_entry};
use super::transact;
use crate::domain::account::codes;
use crate::domain::entry::{Bilingual, LedgerEntryLine};
use crate::domain::ids::generate_reference;
use crate::domain::money::{Amount, Currency};
use crate::domain::ports::SharedLedgerStore;
use crate::domain::settings::FeeSettings;
use crate::domain::state::LedgerState;
use crate::domain::transaction::{
    FeeBreakdown, Party, Transaction, TransactionStatus, TransactionType,
};
use crate::domain::wallet::{AgentProfile, MerchantProfile, WalletKind};
use crate::error::{LedgerError, Result};
use chrono::Utc;
use rust_decimal::Decimal;

/// Returned by every money-movement operation.
#[derive(Debug, Clone)]
pub struct OperationReceipt {
    pub transaction_id: u64,
    pub reference_number: String,
    pub fees: FeeBreakdown,
}

/// Creates the Transaction row for a completed movement and returns its id
/// and reference number. Runs inside the caller's atomic unit.
pub(crate) fn record_transaction(
    state: &mut LedgerState,
    tx_type: TransactionType,
    sender: Party,
    receiver: Party,
    amount: Decimal,
    currency: Currency,
    fees: FeeBreakdown,
    note: Option<String>,
) -> (u64, String) {
    let created_at = Utc::now();
    let reference = loop {
        let candidate = generate_reference(tx_type.prefix(), created_at);
        if !state.transactions.contains_key(&candidate) {
            break candidate;
        }
    };
    let id = state.next_transaction_id;
    state.next_transaction_id += 1;
    state.transactions.insert(
        reference.clone(),
        Transaction {
            id,
            reference_number: reference.clone(),
            tx_type,
            status: TransactionStatus::Completed,
            sender,
            receiver,
            amount,
            currency,
            fees,
            note,
            ledger_entry_id: None,
            created_at,
        },
    );
    (id, reference)
}

fn push_fee_lines(lines: &mut Vec<LedgerEntryLine>, fees: &FeeBreakdown) {
    if fees.platform_fee > Decimal::ZERO {
        lines.push(LedgerEntryLine::credit(
            codes::PLATFORM_REVENUE,
            fees.platform_fee,
        ));
    }
    if fees.agent_fee > Decimal::ZERO {
        lines.push(LedgerEntryLine::credit(
            codes::AGENT_COMMISSION,
            fees.agent_fee,
        ));
    }
}

/// Higher-level money movement: validate, compute fees, then atomically
/// mutate the fast-path balances, create the Transaction row, and post the
/// matching journal entry.
pub struct TransactionOrchestrator {
    store: SharedLedgerStore,
}

impl TransactionOrchestrator {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self { store }
    }

    // -- participant registry -------------------------------------------

    pub async fn register_user(&self, user_id: u64) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state.users.insert(user_id);
            Ok(())
        })
        .await
    }

    pub async fn register_agent(&self, agent_id: u64) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state
                .agents
                .entry(agent_id)
                .or_insert_with(|| AgentProfile::new(agent_id));
            Ok(())
        })
        .await
    }

    pub async fn register_merchant(&self, merchant_id: u64) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state
                .merchants
                .entry(merchant_id)
                .or_insert_with(|| MerchantProfile::new(merchant_id));
            Ok(())
        })
        .await
    }

    // -- admin operations -----------------------------------------------

    /// Funds an agent's credit line from the system reserve. This is the
    /// only way money enters the system, which is what keeps the reserve
    /// check meaningful.
    pub async fn issue_agent_credit(
        &self,
        agent_id: u64,
        amount: Amount,
        currency: Currency,
        issued_by: &str,
    ) -> Result<OperationReceipt> {
        let issued_by = issued_by.to_string();
        let receipt = transact(self.store.as_ref(), |state| {
            let amount = amount.value();
            state.agent_mut(agent_id)?.current_credit.add(currency, amount);

            let (id, reference) = record_transaction(
                state,
                TransactionType::CreditIssue,
                Party::System,
                Party::Agent(agent_id),
                amount,
                currency,
                FeeBreakdown::free(amount),
                None,
            );

            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("Credit issued to agent {agent_id}"),
                        format!("إصدار رصيد للوكيل {agent_id}"),
                    ),
                    currency,
                    lines: vec![
                        LedgerEntryLine::debit(codes::SYSTEM_RESERVE, amount),
                        LedgerEntryLine::credit(codes::AGENT_CREDIT, amount),
                    ],
                    created_by: Some(issued_by.clone()),
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees: FeeBreakdown::free(amount),
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            agent_id,
            %currency,
            "agent credit issued"
        );
        Ok(receipt)
    }

    pub async fn update_settings(&self, settings: FeeSettings) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state.settings = settings.clone();
            Ok(())
        })
        .await
    }

    // -- customer operations --------------------------------------------

    /// Cash-in: the agent fronts credit, the user's wallet receives the
    /// net amount, fees split between platform and agent commission.
    pub async fn process_deposit(
        &self,
        user_id: u64,
        agent_id: u64,
        amount: Amount,
        currency: Currency,
    ) -> Result<OperationReceipt> {
        let receipt = transact(self.store.as_ref(), |state| {
            let amount = amount.value();
            state.settings.check_bounds(amount)?;
            if !state.users.contains(&user_id) {
                return Err(LedgerError::UserNotFound(user_id));
            }
            let fees = calculate_commission(&state.settings, amount, TransactionType::Deposit);

            let agent = state.agent_mut(agent_id)?;
            agent.draw_credit(currency, amount)?;
            agent.cash_collected.add(currency, amount);
            agent.total_deposits.add(currency, amount);

            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .credit(fees.net_amount);

            let (id, reference) = record_transaction(
                state,
                TransactionType::Deposit,
                Party::Agent(agent_id),
                Party::User(user_id),
                amount,
                currency,
                fees.clone(),
                None,
            );

            let mut lines = vec![
                LedgerEntryLine::debit(codes::AGENT_CREDIT, amount),
                LedgerEntryLine::credit(codes::USER_FUNDS, fees.net_amount),
            ];
            push_fee_lines(&mut lines, &fees);
            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("Deposit via agent {agent_id} for user {user_id}"),
                        format!("إيداع عبر الوكيل {agent_id} للمستخدم {user_id}"),
                    ),
                    currency,
                    lines,
                    created_by: None,
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees,
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            user_id,
            agent_id,
            "deposit completed"
        );
        Ok(receipt)
    }

    /// Cash-out: the user's wallet is debited in full, the agent hands
    /// over collected cash and earns the net back as credit.
    pub async fn process_withdrawal(
        &self,
        user_id: u64,
        agent_id: u64,
        amount: Amount,
        currency: Currency,
    ) -> Result<OperationReceipt> {
        let receipt = transact(self.store.as_ref(), |state| {
            let amount = amount.value();
            state.settings.check_bounds(amount)?;
            let fees = calculate_commission(&state.settings, amount, TransactionType::Withdraw);

            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .debit(amount)?;

            let agent = state.agent_mut(agent_id)?;
            agent.draw_cash(currency, amount)?;
            agent.current_credit.add(currency, fees.net_amount);
            agent.total_withdrawals.add(currency, amount);

            let (id, reference) = record_transaction(
                state,
                TransactionType::Withdraw,
                Party::User(user_id),
                Party::Agent(agent_id),
                amount,
                currency,
                fees.clone(),
                None,
            );

            let mut lines = vec![
                LedgerEntryLine::debit(codes::USER_FUNDS, amount),
                LedgerEntryLine::credit(codes::AGENT_CREDIT, fees.net_amount),
            ];
            push_fee_lines(&mut lines, &fees);
            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("Withdrawal via agent {agent_id} for user {user_id}"),
                        format!("سحب عبر الوكيل {agent_id} للمستخدم {user_id}"),
                    ),
                    currency,
                    lines,
                    created_by: None,
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees,
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            user_id,
            agent_id,
            "withdrawal completed"
        );
        Ok(receipt)
    }

    /// Wallet-to-wallet transfer. The sender covers amount plus fee; the
    /// fee is posted to platform revenue, never silently retained.
    ///
    /// OTP confirmation happens out of band: callers invoke this only
    /// after the sender has been verified.
    pub async fn process_transfer(
        &self,
        sender_id: u64,
        receiver_id: u64,
        amount: Amount,
        currency: Currency,
        note: Option<String>,
    ) -> Result<OperationReceipt> {
        let receipt = transact(self.store.as_ref(), |state| {
            if sender_id == receiver_id {
                return Err(LedgerError::Validation(
                    "Cannot transfer to the same user".to_string(),
                ));
            }
            let amount = amount.value();
            state.settings.check_bounds(amount)?;
            if !state.users.contains(&receiver_id) {
                return Err(LedgerError::UserNotFound(receiver_id));
            }
            let fees = calculate_commission(&state.settings, amount, TransactionType::Transfer);

            state
                .wallet_mut(sender_id, currency, WalletKind::Personal)?
                .debit(amount + fees.total_fee)?;
            state
                .wallet_mut(receiver_id, currency, WalletKind::Personal)?
                .credit(amount);

            let (id, reference) = record_transaction(
                state,
                TransactionType::Transfer,
                Party::User(sender_id),
                Party::User(receiver_id),
                amount,
                currency,
                fees.clone(),
                note.clone(),
            );

            let mut lines = vec![
                LedgerEntryLine::debit(codes::USER_FUNDS, amount + fees.total_fee),
                LedgerEntryLine::credit(codes::USER_FUNDS, amount),
            ];
            push_fee_lines(&mut lines, &fees);
            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("Transfer from user {sender_id} to user {receiver_id}"),
                        format!("تحويل من المستخدم {sender_id} إلى المستخدم {receiver_id}"),
                    ),
                    currency,
                    lines,
                    created_by: None,
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees,
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            sender_id,
            receiver_id,
            "transfer completed"
        );
        Ok(receipt)
    }

    /// QR payment from a user wallet to a merchant.
    pub async fn process_qr_payment(
        &self,
        payer_id: u64,
        merchant_id: u64,
        amount: Amount,
        currency: Currency,
        note: Option<String>,
    ) -> Result<OperationReceipt> {
        let receipt = transact(self.store.as_ref(), |state| {
            let amount = amount.value();
            state.settings.check_bounds(amount)?;
            let fees = calculate_commission(&state.settings, amount, TransactionType::QrPayment);

            state
                .wallet_mut(payer_id, currency, WalletKind::Personal)?
                .debit(amount)?;

            let merchant = state.merchant_mut(merchant_id)?;
            merchant.balances.add(currency, fees.net_amount);
            merchant.total_sales.add(currency, amount);
            merchant.total_transactions += 1;

            let (id, reference) = record_transaction(
                state,
                TransactionType::QrPayment,
                Party::User(payer_id),
                Party::Merchant(merchant_id),
                amount,
                currency,
                fees.clone(),
                note.clone(),
            );

            let mut lines = vec![
                LedgerEntryLine::debit(codes::USER_FUNDS, amount),
                LedgerEntryLine::credit(codes::MERCHANT_FUNDS, fees.net_amount),
            ];
            push_fee_lines(&mut lines, &fees);
            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("QR payment to merchant {merchant_id}"),
                        format!("دفع عبر رمز الاستجابة للتاجر {merchant_id}"),
                    ),
                    currency,
                    lines,
                    created_by: None,
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees,
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            payer_id,
            merchant_id,
            "qr payment completed"
        );
        Ok(receipt)
    }

    /// Moves funds between a user's own wallets. No fee, no counterparty.
    pub async fn process_internal_transfer(
        &self,
        user_id: u64,
        from: WalletKind,
        to: WalletKind,
        amount: Amount,
        currency: Currency,
    ) -> Result<OperationReceipt> {
        let receipt = transact(self.store.as_ref(), |state| {
            if from == to {
                return Err(LedgerError::Validation(
                    "Source and destination wallets are the same".to_string(),
                ));
            }
            let amount = amount.value();
            state.wallet_mut(user_id, currency, from)?.debit(amount)?;
            state.wallet_mut(user_id, currency, to)?.credit(amount);

            let (id, reference) = record_transaction(
                state,
                TransactionType::InternalTransfer,
                Party::User(user_id),
                Party::User(user_id),
                amount,
                currency,
                FeeBreakdown::free(amount),
                None,
            );

            // Both wallets sit under the same aggregate account; the entry
            // nets to zero there but keeps the movement on the audit trail.
            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("Internal transfer for user {user_id}"),
                        format!("تحويل داخلي للمستخدم {user_id}"),
                    ),
                    currency,
                    lines: vec![
                        LedgerEntryLine::debit(codes::USER_FUNDS, amount),
                        LedgerEntryLine::credit(codes::USER_FUNDS, amount),
                    ],
                    created_by: None,
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees: FeeBreakdown::free(amount),
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            user_id,
            "internal transfer completed"
        );
        Ok(receipt)
    }

    /// Bill-pay/top-up: the full amount leaves the wallet and lands in
    /// platform revenue.
    pub async fn process_service_purchase(
        &self,
        user_id: u64,
        amount: Amount,
        currency: Currency,
        note: Option<String>,
    ) -> Result<OperationReceipt> {
        let receipt = transact(self.store.as_ref(), |state| {
            let amount = amount.value();
            state.settings.check_bounds(amount)?;

            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .debit(amount)?;

            let (id, reference) = record_transaction(
                state,
                TransactionType::ServicePurchase,
                Party::User(user_id),
                Party::System,
                amount,
                currency,
                FeeBreakdown::free(amount),
                note.clone(),
            );

            post_entry(
                state,
                EntryDraft {
                    description: Bilingual::new(
                        format!("Service purchase by user {user_id}"),
                        format!("شراء خدمة بواسطة المستخدم {user_id}"),
                    ),
                    currency,
                    lines: vec![
                        LedgerEntryLine::debit(codes::USER_FUNDS, amount),
                        LedgerEntryLine::credit(codes::PLATFORM_REVENUE, amount),
                    ],
                    created_by: None,
                    transaction_ref: Some(reference.clone()),
                },
            )?;

            Ok(OperationReceipt {
                transaction_id: id,
                reference_number: reference,
                fees: FeeBreakdown::free(amount),
            })
        })
        .await?;
        tracing::info!(
            reference = %receipt.reference_number,
            user_id,
            "service purchase completed"
        );
        Ok(receipt)
    }

    // -- wallet holds ---------------------------------------------------

    pub async fn freeze_wallet(
        &self,
        user_id: u64,
        amount: Amount,
        currency: Currency,
    ) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .freeze(amount.value())
        })
        .await
    }

    pub async fn unfreeze_wallet(
        &self,
        user_id: u64,
        amount: Amount,
        currency: Currency,
    ) -> Result<()> {
        transact(self.store.as_ref(), |state| {
            state
                .wallet_mut(user_id, currency, WalletKind::Personal)?
                .unfreeze(amount.value())
        })
        .await
    }

    // -- reads ----------------------------------------------------------

    pub async fn wallet_balance(&self, user_id: u64, currency: Currency) -> Result<Decimal> {
        let snapshot = self.store.begin().await?;
        Ok(snapshot
            .state
            .wallet(user_id, currency, WalletKind::Personal)
            .map(|w| w.balance)
            .unwrap_or(Decimal::ZERO))
    }

    pub async fn transaction(&self, reference: &str) -> Result<Option<Transaction>> {
        let snapshot = self.store.begin().await?;
        Ok(snapshot.state.transactions.get(reference).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryLedgerStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn orchestrator() -> TransactionOrchestrator {
        let store: SharedLedgerStore = Arc::new(InMemoryLedgerStore::new());
        let orchestrator = TransactionOrchestrator::new(store);
        orchestrator.register_user(1).await.unwrap();
        orchestrator.register_user(2).await.unwrap();
        orchestrator.register_agent(10).await.unwrap();
        orchestrator
            .issue_agent_credit(10, Amount::new(dec!(1000)).unwrap(), Currency::Usd, "admin")
            .await
            .unwrap();
        orchestrator
    }

    #[tokio::test]
    async fn test_deposit_credits_net_amount() {
        let orchestrator = orchestrator().await;
        let receipt = orchestrator
            .process_deposit(1, 10, Amount::new(dec!(100)).unwrap(), Currency::Usd)
            .await
            .unwrap();

        assert_eq!(receipt.fees.total_fee, dec!(1.00));
        assert_eq!(
            orchestrator.wallet_balance(1, Currency::Usd).await.unwrap(),
            dec!(99.00)
        );
    }

    #[tokio::test]
    async fn test_deposit_unknown_user_is_rejected() {
        let orchestrator = orchestrator().await;
        let result = orchestrator
            .process_deposit(99, 10, Amount::new(dec!(100)).unwrap(), Currency::Usd)
            .await;
        assert!(matches!(result, Err(LedgerError::UserNotFound(99))));
    }

    #[tokio::test]
    async fn test_transfer_to_self_is_rejected() {
        let orchestrator = orchestrator().await;
        let result = orchestrator
            .process_transfer(1, 1, Amount::new(dec!(10)).unwrap(), Currency::Usd, None)
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_amount_bounds_enforced() {
        let orchestrator = orchestrator().await;
        let result = orchestrator
            .process_deposit(1, 10, Amount::new(dec!(0.50)).unwrap(), Currency::Usd)
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::AmountOutOfBounds { .. })
        ));
    }
}
