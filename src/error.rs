use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    // Validation: rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unbalanced entry: debits {debits} != credits {credits}")]
    UnbalancedEntry { debits: Decimal, credits: Decimal },
    #[error("Ledger account not found: {0}")]
    AccountNotFound(String),
    #[error("Amount {amount} outside allowed bounds [{min}, {max}]")]
    AmountOutOfBounds {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },

    // Business rules: surfaced to the end user, never thrown as faults.
    #[error("User not found: {0}")]
    UserNotFound(u64),
    #[error("Agent not found: {0}")]
    AgentNotFound(u64),
    #[error("Merchant not found: {0}")]
    MerchantNotFound(u64),
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },
    #[error("Insufficient agent credit: available {available}, required {required}")]
    InsufficientAgentCredit {
        available: Decimal,
        required: Decimal,
    },
    #[error("Insufficient agent cash: available {available}, required {required}")]
    InsufficientAgentCash {
        available: Decimal,
        required: Decimal,
    },
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Transaction {0} is already reversed")]
    AlreadyReversed(String),

    // Integrity: reported, never auto-corrected.
    #[error("Hash chain broken at entry {0}")]
    ChainBroken(String),

    // Transient / storage.
    #[error("Storage commit conflict")]
    CommitConflict,
    #[error("Transaction failed: storage did not commit")]
    TransactionFailed,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Whether this failure should be surfaced to the end user as a
    /// `{success: false, error}` result rather than an internal fault.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            LedgerError::UserNotFound(_)
                | LedgerError::AgentNotFound(_)
                | LedgerError::MerchantNotFound(_)
                | LedgerError::InsufficientBalance { .. }
                | LedgerError::InsufficientAgentCredit { .. }
                | LedgerError::InsufficientAgentCash { .. }
                | LedgerError::TransactionNotFound(_)
                | LedgerError::AlreadyReversed(_)
                | LedgerError::AmountOutOfBounds { .. }
        )
    }

    /// Arabic user-facing message for business-rule failures.
    ///
    /// The English side is the `Display` impl. Internal and integrity
    /// errors deliberately have no localized message; callers show a
    /// generic error and operators read the logs.
    pub fn user_message_ar(&self) -> Option<String> {
        match self {
            LedgerError::UserNotFound(_) => Some("المستخدم غير موجود".to_string()),
            LedgerError::AgentNotFound(_) => Some("الوكيل غير موجود".to_string()),
            LedgerError::MerchantNotFound(_) => Some("التاجر غير موجود".to_string()),
            LedgerError::InsufficientBalance { available, .. } => {
                Some(format!("الرصيد غير كافٍ: المتاح {available}"))
            }
            LedgerError::InsufficientAgentCredit { available, .. } => {
                Some(format!("رصيد الوكيل غير كافٍ: المتاح {available}"))
            }
            LedgerError::InsufficientAgentCash { available, .. } => {
                Some(format!("النقد المتوفر لدى الوكيل غير كافٍ: المتاح {available}"))
            }
            LedgerError::TransactionNotFound(_) => Some("المعاملة غير موجودة".to_string()),
            LedgerError::AlreadyReversed(reference) => {
                Some(format!("تم عكس المعاملة {reference} مسبقًا"))
            }
            LedgerError::AmountOutOfBounds { min, max, .. } => Some(format!(
                "المبلغ خارج الحدود المسموح بها ({min} - {max})"
            )),
            _ => None,
        }
    }
}
