use super::transaction::TransactionType;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fee parameters for one transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeRule {
    /// Percentage of the amount, e.g. `1` means 1%.
    pub percent: Decimal,
    /// Flat amount added on top of the percentage fee.
    pub fixed: Decimal,
}

impl FeeRule {
    pub const FREE: FeeRule = FeeRule {
        percent: Decimal::ZERO,
        fixed: Decimal::ZERO,
    };

    pub fn new(percent: Decimal, fixed: Decimal) -> Self {
        Self { percent, fixed }
    }
}

/// System-wide, runtime-updatable fee and limit configuration.
///
/// Lives inside the ledger state so that fee changes commit atomically with
/// respect to in-flight operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSettings {
    pub rules: BTreeMap<TransactionType, FeeRule>,
    /// Agent share of the total fee, as a percentage.
    pub agent_commission_percent: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
}

impl Default for FeeSettings {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(TransactionType::Deposit, FeeRule::new(dec!(1), dec!(0)));
        rules.insert(TransactionType::Withdraw, FeeRule::new(dec!(1.5), dec!(0)));
        rules.insert(TransactionType::Transfer, FeeRule::new(dec!(0.5), dec!(0)));
        rules.insert(TransactionType::QrPayment, FeeRule::FREE);
        rules.insert(TransactionType::ServicePurchase, FeeRule::FREE);
        Self {
            rules,
            agent_commission_percent: dec!(30),
            min_amount: dec!(1),
            max_amount: dec!(1_000_000),
        }
    }
}

impl FeeSettings {
    /// Fee rule for a type; types with no configured rule are free.
    pub fn rule(&self, tx_type: TransactionType) -> FeeRule {
        self.rules.get(&tx_type).copied().unwrap_or(FeeRule::FREE)
    }

    /// Enforces the configured `[min, max]` transaction bounds.
    pub fn check_bounds(&self, amount: Decimal) -> Result<(), LedgerError> {
        if amount < self.min_amount || amount > self.max_amount {
            return Err(LedgerError::AmountOutOfBounds {
                amount,
                min: self.min_amount,
                max: self.max_amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_type_is_free() {
        let settings = FeeSettings::default();
        assert_eq!(settings.rule(TransactionType::InternalTransfer), FeeRule::FREE);
    }

    #[test]
    fn test_bounds() {
        let settings = FeeSettings::default();
        assert!(settings.check_bounds(dec!(0.5)).is_err());
        assert!(settings.check_bounds(dec!(1)).is_ok());
        assert!(settings.check_bounds(dec!(1_000_000)).is_ok());
        assert!(matches!(
            settings.check_bounds(dec!(1_000_001)),
            Err(LedgerError::AmountOutOfBounds { .. })
        ));
    }
}
