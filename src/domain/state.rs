use super::account::{LedgerAccount, default_chart};
use super::entry::{GENESIS_HASH, LedgerEntry};
use super::money::Currency;
use super::reversal::ReversalRecord;
use super::settings::FeeSettings;
use super::transaction::Transaction;
use super::wallet::{AgentProfile, MerchantProfile, Wallet, WalletKind};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The full relational snapshot a storage transaction operates on.
///
/// Services mutate a working copy inside `transact`; the store swaps it in
/// atomically on commit, so no partial mutation is ever observable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub accounts: BTreeMap<String, LedgerAccount>,
    /// Append-only; index order is chain order.
    pub entries: Vec<LedgerEntry>,
    pub entry_numbers: BTreeSet<String>,
    /// Keyed by reference number.
    pub transactions: BTreeMap<String, Transaction>,
    pub reversals: Vec<ReversalRecord>,
    pub wallets: Vec<Wallet>,
    pub users: BTreeSet<u64>,
    pub agents: BTreeMap<u64, AgentProfile>,
    pub merchants: BTreeMap<u64, MerchantProfile>,
    pub settings: FeeSettings,
    pub next_transaction_id: u64,
    pub next_entry_id: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerState {
    /// Empty state seeded with the default chart of accounts.
    pub fn new() -> Self {
        let mut accounts = BTreeMap::new();
        for account in default_chart() {
            accounts.insert(account.code.clone(), account);
        }
        Self {
            accounts,
            entries: Vec::new(),
            entry_numbers: BTreeSet::new(),
            transactions: BTreeMap::new(),
            reversals: Vec::new(),
            wallets: Vec::new(),
            users: BTreeSet::new(),
            agents: BTreeMap::new(),
            merchants: BTreeMap::new(),
            settings: FeeSettings::default(),
            next_transaction_id: 1,
            next_entry_id: 1,
        }
    }

    /// Idempotent upsert by code; an existing account's balances are never
    /// overwritten.
    pub fn ensure_account(&mut self, account: LedgerAccount) -> &mut LedgerAccount {
        self.accounts
            .entry(account.code.clone())
            .or_insert(account)
    }

    pub fn account(&self, code: &str) -> Result<&LedgerAccount, LedgerError> {
        self.accounts
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    pub fn account_balance(&self, code: &str, currency: Currency) -> Result<Decimal, LedgerError> {
        Ok(self.account(code)?.balances.get(currency))
    }

    /// Applies a signed delta to one account balance. Fatal to the
    /// enclosing operation when the code does not resolve.
    pub fn adjust_balance(
        &mut self,
        code: &str,
        currency: Currency,
        delta: Decimal,
    ) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        account.balances.add(currency, delta);
        Ok(())
    }

    /// Hash of the most recently appended entry, or the genesis sentinel.
    pub fn last_entry_hash(&self) -> &str {
        self.entries
            .last()
            .map(|e| e.hash.as_str())
            .unwrap_or(GENESIS_HASH)
    }

    pub fn wallet(&self, user_id: u64, currency: Currency, kind: WalletKind) -> Option<&Wallet> {
        self.wallets
            .iter()
            .find(|w| w.user_id == user_id && w.currency == currency && w.kind == kind)
    }

    /// Wallet for a registered user, created lazily on first use.
    pub fn wallet_mut(
        &mut self,
        user_id: u64,
        currency: Currency,
        kind: WalletKind,
    ) -> Result<&mut Wallet, LedgerError> {
        if !self.users.contains(&user_id) {
            return Err(LedgerError::UserNotFound(user_id));
        }
        let index = self
            .wallets
            .iter()
            .position(|w| w.user_id == user_id && w.currency == currency && w.kind == kind);
        let index = match index {
            Some(i) => i,
            None => {
                self.wallets.push(Wallet::new(user_id, currency, kind));
                self.wallets.len() - 1
            }
        };
        Ok(&mut self.wallets[index])
    }

    pub fn agent_mut(&mut self, agent_id: u64) -> Result<&mut AgentProfile, LedgerError> {
        self.agents
            .get_mut(&agent_id)
            .ok_or(LedgerError::AgentNotFound(agent_id))
    }

    pub fn merchant_mut(&mut self, merchant_id: u64) -> Result<&mut MerchantProfile, LedgerError> {
        self.merchants
            .get_mut(&merchant_id)
            .ok_or(LedgerError::MerchantNotFound(merchant_id))
    }

    pub fn entry_by_id(&self, id: u64) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountType, codes};
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_state_carries_default_chart() {
        let state = LedgerState::new();
        assert!(state.accounts.contains_key(codes::SYSTEM_RESERVE));
        assert!(state.accounts.contains_key(codes::USER_FUNDS));
        assert_eq!(state.last_entry_hash(), GENESIS_HASH);
    }

    #[test]
    fn test_ensure_account_never_overwrites_balance() {
        let mut state = LedgerState::new();
        state
            .adjust_balance(codes::USER_FUNDS, Currency::Usd, dec!(500))
            .unwrap();

        state.ensure_account(LedgerAccount::new(
            codes::USER_FUNDS,
            "User funds (renamed)",
            AccountType::Liability,
            true,
        ));

        assert_eq!(
            state
                .account_balance(codes::USER_FUNDS, Currency::Usd)
                .unwrap(),
            dec!(500)
        );
    }

    #[test]
    fn test_adjust_unknown_account_is_fatal() {
        let mut state = LedgerState::new();
        let result = state.adjust_balance("9999", Currency::Usd, dec!(1));
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[test]
    fn test_wallet_requires_registered_user() {
        let mut state = LedgerState::new();
        assert!(matches!(
            state.wallet_mut(7, Currency::Usd, WalletKind::Personal),
            Err(LedgerError::UserNotFound(7))
        ));

        state.users.insert(7);
        let wallet = state
            .wallet_mut(7, Currency::Usd, WalletKind::Personal)
            .unwrap();
        assert_eq!(wallet.balance, dec!(0));

        // Lazily created once, then reused.
        state
            .wallet_mut(7, Currency::Usd, WalletKind::Personal)
            .unwrap();
        assert_eq!(state.wallets.len(), 1);
    }
}
