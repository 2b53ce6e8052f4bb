use super::money::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
    QrPayment,
    InternalTransfer,
    ServicePurchase,
    CreditIssue,
    Refund,
}

impl TransactionType {
    /// Reference-number prefix, e.g. `DEP` for deposits.
    pub fn prefix(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEP",
            TransactionType::Withdraw => "WDR",
            TransactionType::Transfer => "TRF",
            TransactionType::QrPayment => "QRP",
            TransactionType::InternalTransfer => "ITR",
            TransactionType::ServicePurchase => "SRV",
            TransactionType::CreditIssue => "CRD",
            TransactionType::Refund => "REF",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::QrPayment => "QR_PAYMENT",
            TransactionType::InternalTransfer => "INTERNAL_TRANSFER",
            TransactionType::ServicePurchase => "SERVICE_PURCHASE",
            TransactionType::CreditIssue => "CREDIT_ISSUE",
            TransactionType::Refund => "REFUND",
        };
        f.write_str(name)
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAW" => Ok(TransactionType::Withdraw),
            "TRANSFER" => Ok(TransactionType::Transfer),
            "QR_PAYMENT" => Ok(TransactionType::QrPayment),
            "INTERNAL_TRANSFER" => Ok(TransactionType::InternalTransfer),
            "SERVICE_PURCHASE" => Ok(TransactionType::ServicePurchase),
            "CREDIT_ISSUE" => Ok(TransactionType::CreditIssue),
            "REFUND" => Ok(TransactionType::Refund),
            other => Err(LedgerError::Validation(format!(
                "Unknown transaction type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
}

/// A participant in a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    User(u64),
    Agent(u64),
    Merchant(u64),
    /// The platform itself (credit issuance, service purchases).
    System,
}

/// Fee split for one transaction. `net_amount` is what the receiving party
/// actually gets: `amount - total_fee`, with
/// `total_fee = platform_fee + agent_fee` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub platform_fee: Decimal,
    pub agent_fee: Decimal,
    pub total_fee: Decimal,
    pub net_amount: Decimal,
}

impl FeeBreakdown {
    /// No fee: the full amount passes through.
    pub fn free(amount: Decimal) -> Self {
        Self {
            platform_fee: Decimal::ZERO,
            agent_fee: Decimal::ZERO,
            total_fee: Decimal::ZERO,
            net_amount: amount,
        }
    }
}

/// A domain-level money movement. Financial fields never change after
/// creation; only `status` moves, and only `Completed -> Reversed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub reference_number: String,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub sender: Party,
    pub receiver: Party,
    pub amount: Decimal,
    pub currency: Currency,
    pub fees: FeeBreakdown,
    pub note: Option<String>,
    pub ledger_entry_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}
