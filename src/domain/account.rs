use super::money::CurrencyMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// High-level account type (determines which side increases the balance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
    /// Internal-only counterweight account; all issued money nets against it.
    SystemReserve,
}

impl AccountType {
    /// Signed effect of a debit on the stored balance.
    ///
    /// Debits increase Asset/Expense and decrease the rest; credits do the
    /// inverse. The reserve is treated as credit-normal so that issuing
    /// money drives it negative, which is what the solvency check counts on.
    pub fn debit_sign(&self) -> Decimal {
        match self {
            AccountType::Asset | AccountType::Expense => Decimal::ONE,
            AccountType::Liability
            | AccountType::Equity
            | AccountType::Revenue
            | AccountType::SystemReserve => -Decimal::ONE,
        }
    }
}

/// A chart-of-accounts entry with one balance per supported currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub is_system: bool,
    pub balances: CurrencyMap,
}

impl LedgerAccount {
    pub fn new(code: &str, name: &str, account_type: AccountType, is_system: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            is_system,
            balances: CurrencyMap::new(),
        }
    }
}

/// Well-known internal account codes.
pub mod codes {
    pub const SYSTEM_RESERVE: &str = "1000";
    pub const USER_FUNDS: &str = "2100";
    pub const AGENT_CREDIT: &str = "2200";
    pub const MERCHANT_FUNDS: &str = "2300";
    pub const AGENT_COMMISSION: &str = "2400";
    pub const PLATFORM_REVENUE: &str = "4100";
}

/// The accounts every fresh ledger is seeded with.
pub fn default_chart() -> Vec<LedgerAccount> {
    vec![
        LedgerAccount::new(
            codes::SYSTEM_RESERVE,
            "System reserve",
            AccountType::SystemReserve,
            true,
        ),
        LedgerAccount::new(codes::USER_FUNDS, "User funds", AccountType::Liability, true),
        LedgerAccount::new(
            codes::AGENT_CREDIT,
            "Agent credit",
            AccountType::Liability,
            false,
        ),
        LedgerAccount::new(
            codes::MERCHANT_FUNDS,
            "Merchant funds",
            AccountType::Liability,
            false,
        ),
        LedgerAccount::new(
            codes::AGENT_COMMISSION,
            "Agent commission payable",
            AccountType::Liability,
            false,
        ),
        LedgerAccount::new(
            codes::PLATFORM_REVENUE,
            "Platform fee revenue",
            AccountType::Revenue,
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_sign_convention() {
        assert_eq!(AccountType::Asset.debit_sign(), dec!(1));
        assert_eq!(AccountType::Expense.debit_sign(), dec!(1));
        assert_eq!(AccountType::Liability.debit_sign(), dec!(-1));
        assert_eq!(AccountType::Revenue.debit_sign(), dec!(-1));
        assert_eq!(AccountType::SystemReserve.debit_sign(), dec!(-1));
    }

    #[test]
    fn test_default_chart_codes_are_unique() {
        let chart = default_chart();
        let mut codes: Vec<&str> = chart.iter().map(|a| a.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), chart.len());
    }
}
