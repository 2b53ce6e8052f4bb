use super::money::{Currency, CurrencyMap};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum WalletKind {
    Personal,
    Business,
}

/// Fast-path balance holder for one (user, currency, kind) triple.
///
/// Mutated directly by the orchestrator inside the same atomic unit as the
/// formal ledger entry; the aggregate `USER_FUNDS` account tracks the same
/// money independently and the integrity verifier reconciles the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: u64,
    pub currency: Currency,
    pub kind: WalletKind,
    pub balance: Decimal,
    pub frozen_balance: Decimal,
}

impl Wallet {
    pub fn new(user_id: u64, currency: Currency, kind: WalletKind) -> Self {
        Self {
            user_id,
            currency,
            kind,
            balance: Decimal::ZERO,
            frozen_balance: Decimal::ZERO,
        }
    }

    pub fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// Debits spendable funds; checked before any mutation.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance >= amount {
            self.balance -= amount;
            Ok(())
        } else {
            Err(LedgerError::InsufficientBalance {
                available: self.balance,
                required: amount,
            })
        }
    }

    /// Moves spendable funds into the frozen bucket.
    pub fn freeze(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance >= amount {
            self.balance -= amount;
            self.frozen_balance += amount;
            Ok(())
        } else {
            Err(LedgerError::InsufficientBalance {
                available: self.balance,
                required: amount,
            })
        }
    }

    /// Releases frozen funds back to the spendable balance.
    pub fn unfreeze(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.frozen_balance >= amount {
            self.frozen_balance -= amount;
            self.balance += amount;
            Ok(())
        } else {
            Err(LedgerError::InsufficientBalance {
                available: self.frozen_balance,
                required: amount,
            })
        }
    }
}

/// Cash-in/cash-out agent: platform-issued credit funds deposits, physical
/// cash collected from users funds withdrawals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_id: u64,
    pub current_credit: CurrencyMap,
    pub cash_collected: CurrencyMap,
    pub total_deposits: CurrencyMap,
    pub total_withdrawals: CurrencyMap,
}

impl AgentProfile {
    pub fn new(agent_id: u64) -> Self {
        Self {
            agent_id,
            current_credit: CurrencyMap::new(),
            cash_collected: CurrencyMap::new(),
            total_deposits: CurrencyMap::new(),
            total_withdrawals: CurrencyMap::new(),
        }
    }

    /// Consumes issued credit; the agent fronts this to fund a deposit.
    pub fn draw_credit(&mut self, currency: Currency, amount: Decimal) -> Result<(), LedgerError> {
        let available = self.current_credit.get(currency);
        if available >= amount {
            self.current_credit.add(currency, -amount);
            Ok(())
        } else {
            Err(LedgerError::InsufficientAgentCredit {
                available,
                required: amount,
            })
        }
    }

    /// Consumes collected cash; the agent must physically hand this over.
    pub fn draw_cash(&mut self, currency: Currency, amount: Decimal) -> Result<(), LedgerError> {
        let available = self.cash_collected.get(currency);
        if available >= amount {
            self.cash_collected.add(currency, -amount);
            Ok(())
        } else {
            Err(LedgerError::InsufficientAgentCash {
                available,
                required: amount,
            })
        }
    }
}

/// QR merchant balance and sales counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantProfile {
    pub merchant_id: u64,
    pub balances: CurrencyMap,
    pub total_sales: CurrencyMap,
    pub total_transactions: u64,
}

impl MerchantProfile {
    pub fn new(merchant_id: u64) -> Self {
        Self {
            merchant_id,
            balances: CurrencyMap::new(),
            total_sales: CurrencyMap::new(),
            total_transactions: 0,
        }
    }
}
