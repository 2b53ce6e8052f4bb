use crate::error::LedgerError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tolerance for debit/credit equality and the reserve check.
pub const MONEY_EPSILON: Decimal = dec!(0.01);

/// Rounds a monetary value to 2 decimal places, half away from zero.
///
/// Every fee and balance mutation goes through this; mixing rounding
/// strategies is how ledgers accumulate drift past the 0.01 tolerance.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Syp,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Syp];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Syp => "SYP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "SYP" => Ok(Currency::Syp),
            other => Err(LedgerError::Validation(format!(
                "Unsupported currency: {other}"
            ))),
        }
    }
}

/// A positive monetary amount, normalized to 2 decimal places.
///
/// Orchestrator operations take `Amount` so that zero/negative inputs are
/// rejected at the boundary instead of deep inside a storage transaction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(round_money(value)))
        } else {
            Err(LedgerError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Per-currency balances. Missing currencies read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyMap(BTreeMap<Currency, Decimal>);

impl CurrencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, currency: Currency) -> Decimal {
        self.0.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn add(&mut self, currency: Currency, delta: Decimal) {
        *self.0.entry(currency).or_default() += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }
}
