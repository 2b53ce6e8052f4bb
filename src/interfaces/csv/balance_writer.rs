use crate::domain::wallet::Wallet;
use crate::error::LedgerError;
use std::io::Write;

/// Writes final wallet balances as CSV, one row per wallet.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(sink),
        }
    }

    pub fn write_wallets(&mut self, wallets: &[Wallet]) -> Result<(), LedgerError> {
        self.writer
            .write_record(["user", "currency", "kind", "balance", "frozen"])?;
        for wallet in wallets {
            self.writer.write_record([
                wallet.user_id.to_string(),
                wallet.currency.to_string(),
                format!("{:?}", wallet.kind).to_lowercase(),
                wallet.balance.to_string(),
                wallet.frozen_balance.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use crate::domain::wallet::WalletKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_header_and_rows() {
        let mut wallet = Wallet::new(1, Currency::Usd, WalletKind::Personal);
        wallet.credit(dec!(99.00));

        let mut out = Vec::new();
        BalanceWriter::new(&mut out)
            .write_wallets(std::slice::from_ref(&wallet))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("user,currency,kind,balance,frozen"));
        assert!(text.contains("1,USD,personal,99.00,0"));
    }
}
