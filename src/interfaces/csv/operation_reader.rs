use crate::domain::money::Currency;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a back-office operations batch.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    RegisterUser,
    RegisterAgent,
    RegisterMerchant,
    IssueCredit,
    Deposit,
    Withdraw,
    Transfer,
    QrPayment,
    ServicePurchase,
}

/// CSV columns: `op, party, counterparty, amount, currency, note`.
///
/// `party` is the acting user/agent/merchant; `counterparty` is the agent,
/// receiver, or merchant depending on the operation. Registration rows
/// leave the money columns empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: OperationKind,
    pub party: u64,
    pub counterparty: Option<u64>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub note: Option<String>,
}

pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<OperationRecord, LedgerError>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, party, counterparty, amount, currency, note\n\
                    register-user, 1, , , ,\n\
                    deposit, 1, 10, 100.0, USD,";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<_> = reader.operations().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.op, OperationKind::RegisterUser);
        assert_eq!(first.party, 1);
        assert_eq!(first.amount, None);

        let second = results[1].as_ref().unwrap();
        assert_eq!(second.op, OperationKind::Deposit);
        assert_eq!(second.counterparty, Some(10));
        assert_eq!(second.amount, Some(dec!(100.0)));
        assert_eq!(second.currency, Some(Currency::Usd));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, party, counterparty, amount, currency, note\n\
                    teleport, 1, , 5, USD,";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<_> = reader.operations().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_transfer_with_note() {
        let data = "op, party, counterparty, amount, currency, note\n\
                    transfer, 1, 2, 25.50, SYP, rent";
        let reader = OperationReader::new(data.as_bytes());
        let record = reader.operations().next().unwrap().unwrap();

        assert_eq!(record.op, OperationKind::Transfer);
        assert_eq!(record.currency, Some(Currency::Syp));
        assert_eq!(record.note.as_deref(), Some("rent"));
    }
}
