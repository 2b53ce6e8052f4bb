use clap::Parser;
use hawala_ledger::application::orchestrator::TransactionOrchestrator;
use hawala_ledger::application::verify::IntegrityVerifier;
use hawala_ledger::domain::money::{Amount, Currency};
use hawala_ledger::domain::ports::SharedLedgerStore;
use hawala_ledger::error::LedgerError;
use hawala_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use hawala_ledger::interfaces::csv::balance_writer::BalanceWriter;
use hawala_ledger::interfaces::csv::operation_reader::{
    OperationKind, OperationReader, OperationRecord,
};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (requires the storage-rocksdb feature).
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn build_store(db_path: Option<PathBuf>) -> Result<SharedLedgerStore> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = hawala_ledger::infrastructure::rocksdb::RocksDbLedgerStore::open(path)
                .into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => Err(miette::miette!(
            "--db-path requires building with the storage-rocksdb feature"
        )),
        None => Ok(Arc::new(InMemoryLedgerStore::new())),
    }
}

fn required_amount(record: &OperationRecord) -> Result<Amount, LedgerError> {
    let value = record
        .amount
        .ok_or_else(|| LedgerError::Validation("Operation missing amount".to_string()))?;
    Amount::new(value)
}

fn required_currency(record: &OperationRecord) -> Result<Currency, LedgerError> {
    record
        .currency
        .ok_or_else(|| LedgerError::Validation("Operation missing currency".to_string()))
}

fn required_counterparty(record: &OperationRecord) -> Result<u64, LedgerError> {
    record
        .counterparty
        .ok_or_else(|| LedgerError::Validation("Operation missing counterparty".to_string()))
}

async fn apply(
    orchestrator: &TransactionOrchestrator,
    record: &OperationRecord,
) -> Result<(), LedgerError> {
    match record.op {
        OperationKind::RegisterUser => orchestrator.register_user(record.party).await,
        OperationKind::RegisterAgent => orchestrator.register_agent(record.party).await,
        OperationKind::RegisterMerchant => orchestrator.register_merchant(record.party).await,
        OperationKind::IssueCredit => orchestrator
            .issue_agent_credit(
                record.party,
                required_amount(record)?,
                required_currency(record)?,
                "batch",
            )
            .await
            .map(|_| ()),
        OperationKind::Deposit => orchestrator
            .process_deposit(
                record.party,
                required_counterparty(record)?,
                required_amount(record)?,
                required_currency(record)?,
            )
            .await
            .map(|_| ()),
        OperationKind::Withdraw => orchestrator
            .process_withdrawal(
                record.party,
                required_counterparty(record)?,
                required_amount(record)?,
                required_currency(record)?,
            )
            .await
            .map(|_| ()),
        OperationKind::Transfer => orchestrator
            .process_transfer(
                record.party,
                required_counterparty(record)?,
                required_amount(record)?,
                required_currency(record)?,
                record.note.clone(),
            )
            .await
            .map(|_| ()),
        OperationKind::QrPayment => orchestrator
            .process_qr_payment(
                record.party,
                required_counterparty(record)?,
                required_amount(record)?,
                required_currency(record)?,
                record.note.clone(),
            )
            .await
            .map(|_| ()),
        OperationKind::ServicePurchase => orchestrator
            .process_service_purchase(
                record.party,
                required_amount(record)?,
                required_currency(record)?,
                record.note.clone(),
            )
            .await
            .map(|_| ()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = build_store(cli.db_path)?;
    let orchestrator = TransactionOrchestrator::new(store.clone());

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for record in reader.operations() {
        match record {
            Ok(record) => {
                if let Err(e) = apply(&orchestrator, &record).await {
                    eprintln!("Error processing operation: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {e}");
            }
        }
    }

    // Final state: wallet balances as CSV, then the integrity report.
    let snapshot = store.begin().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer
        .write_wallets(&snapshot.state.wallets)
        .into_diagnostic()?;

    let verifier = IntegrityVerifier::new(store);
    let report = verifier.verify_system_balance().await.into_diagnostic()?;
    for check in &report.per_currency {
        println!(
            "{}: reserve {} + other {} = {} [{}]",
            check.currency,
            check.system_reserve,
            check.total_other,
            check.difference,
            if check.is_balanced {
                "BALANCED"
            } else {
                "IMBALANCED"
            }
        );
    }
    let chain = verifier.verify_hash_chain().await.into_diagnostic()?;
    println!(
        "chain: {} entries [{}]",
        chain.entries_checked,
        if chain.is_intact { "INTACT" } else { "BROKEN" }
    );

    Ok(())
}
