use super::entry::Bilingual;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable link between an original transaction and the compensating
/// transaction that reversed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversalRecord {
    pub original_reference: String,
    pub reversal_reference: String,
    pub reason: Bilingual,
    pub reversed_by: String,
    pub reversed_at: DateTime<Utc>,
}
