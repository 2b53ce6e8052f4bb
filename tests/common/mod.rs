#![allow(dead_code)]

use hawala_ledger::application::ledger::LedgerService;
use hawala_ledger::application::orchestrator::TransactionOrchestrator;
use hawala_ledger::application::reversal::ReversalService;
use hawala_ledger::application::verify::IntegrityVerifier;
use hawala_ledger::domain::money::{Amount, Currency};
use hawala_ledger::domain::ports::SharedLedgerStore;
use hawala_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub const USER_A: u64 = 1;
pub const USER_B: u64 = 2;
pub const AGENT: u64 = 10;
pub const MERCHANT: u64 = 20;

pub struct Fixture {
    pub store: SharedLedgerStore,
    pub orchestrator: TransactionOrchestrator,
    pub ledger: LedgerService,
    pub reversal: ReversalService,
    pub verifier: IntegrityVerifier,
}

pub fn amt(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

/// Two users, one agent funded with 1000 USD of credit, one merchant.
pub async fn fixture() -> Fixture {
    let store: SharedLedgerStore = Arc::new(InMemoryLedgerStore::new());
    let fixture = Fixture {
        orchestrator: TransactionOrchestrator::new(store.clone()),
        ledger: LedgerService::new(store.clone()),
        reversal: ReversalService::new(store.clone()),
        verifier: IntegrityVerifier::new(store.clone()),
        store,
    };

    fixture.orchestrator.register_user(USER_A).await.unwrap();
    fixture.orchestrator.register_user(USER_B).await.unwrap();
    fixture.orchestrator.register_agent(AGENT).await.unwrap();
    fixture
        .orchestrator
        .register_merchant(MERCHANT)
        .await
        .unwrap();
    fixture
        .orchestrator
        .issue_agent_credit(AGENT, amt(dec!(1000)), Currency::Usd, "admin")
        .await
        .unwrap();

    fixture
}
