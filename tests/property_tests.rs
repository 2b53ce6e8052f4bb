mod common;

use common::{AGENT, MERCHANT, USER_A, USER_B, amt};
use hawala_ledger::application::fees::calculate_commission;
use hawala_ledger::domain::entry::{LedgerEntryLine, check_balanced};
use hawala_ledger::domain::money::Currency;
use hawala_ledger::domain::settings::{FeeRule, FeeSettings};
use hawala_ledger::domain::transaction::TransactionType;
use hawala_ledger::error::LedgerError;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Any set of lines whose debits and credits sum to the same total is
    /// accepted.
    #[test]
    fn prop_balanced_entries_accepted(
        amounts in prop::collection::vec(1i64..1_000_000i64, 1..8)
    ) {
        let mut lines: Vec<LedgerEntryLine> = amounts
            .iter()
            .map(|&cents| LedgerEntryLine::debit("2100", money(cents)))
            .collect();
        let total: i64 = amounts.iter().sum();
        lines.push(LedgerEntryLine::credit("1000", money(total)));

        prop_assert!(check_balanced(&lines).is_ok());
    }

    /// Skewing the credit side by more than the 0.01 tolerance is always
    /// rejected, whatever the line set looks like.
    #[test]
    fn prop_unbalanced_entries_rejected(
        amounts in prop::collection::vec(1i64..1_000_000i64, 1..8),
        skew_cents in 2i64..10_000i64
    ) {
        let mut lines: Vec<LedgerEntryLine> = amounts
            .iter()
            .map(|&cents| LedgerEntryLine::debit("2100", money(cents)))
            .collect();
        let total: i64 = amounts.iter().sum();
        lines.push(LedgerEntryLine::credit("1000", money(total + skew_cents)));

        let is_unbalanced = matches!(
            check_balanced(&lines),
            Err(LedgerError::UnbalancedEntry { .. })
        );
        prop_assert!(is_unbalanced);
    }

    /// Fee arithmetic never leaks a cent: the split sums to the total and
    /// the total plus the net reconstructs the amount exactly.
    #[test]
    fn prop_fee_parts_sum_exactly(
        amount_cents in 100i64..100_000_000i64,
        percent_hundredths in 0i64..1_000i64,
        fixed_cents in 0i64..10_000i64,
        commission_hundredths in 0i64..10_000i64
    ) {
        let mut settings = FeeSettings::default();
        settings.rules.insert(
            TransactionType::Deposit,
            FeeRule::new(Decimal::new(percent_hundredths, 2), money(fixed_cents)),
        );
        settings.agent_commission_percent = Decimal::new(commission_hundredths, 2);

        let amount = money(amount_cents);
        let fees = calculate_commission(&settings, amount, TransactionType::Deposit);

        prop_assert_eq!(fees.platform_fee + fees.agent_fee, fees.total_fee);
        prop_assert_eq!(fees.net_amount + fees.total_fee, amount);
        prop_assert!(fees.platform_fee >= Decimal::ZERO);
        prop_assert!(fees.agent_fee >= Decimal::ZERO);
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Deposit(i64),
    Withdraw(i64),
    Transfer(i64),
    QrPayment(i64),
    ServicePurchase(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let cents = 100i64..10_000i64;
    prop_oneof![
        cents.clone().prop_map(Op::Deposit),
        cents.clone().prop_map(Op::Withdraw),
        cents.clone().prop_map(Op::Transfer),
        cents.clone().prop_map(Op::QrPayment),
        cents.prop_map(Op::ServicePurchase),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        ..ProptestConfig::default()
    })]

    /// After any sequence of operations — including ones that fail their
    /// business checks — the reserve nets to zero, the chain verifies, and
    /// no balance anywhere has gone negative.
    #[test]
    fn prop_solvency_and_no_negative_balances(
        ops in prop::collection::vec(op_strategy(), 1..25)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let f = common::fixture().await;

            for op in &ops {
                // Business-rule rejections are part of the property: they
                // must leave the books untouched.
                let _ = match *op {
                    Op::Deposit(cents) => f
                        .orchestrator
                        .process_deposit(USER_A, AGENT, amt(money(cents)), Currency::Usd)
                        .await
                        .map(|_| ()),
                    Op::Withdraw(cents) => f
                        .orchestrator
                        .process_withdrawal(USER_A, AGENT, amt(money(cents)), Currency::Usd)
                        .await
                        .map(|_| ()),
                    Op::Transfer(cents) => f
                        .orchestrator
                        .process_transfer(USER_A, USER_B, amt(money(cents)), Currency::Usd, None)
                        .await
                        .map(|_| ()),
                    Op::QrPayment(cents) => f
                        .orchestrator
                        .process_qr_payment(USER_A, MERCHANT, amt(money(cents)), Currency::Usd, None)
                        .await
                        .map(|_| ()),
                    Op::ServicePurchase(cents) => f
                        .orchestrator
                        .process_service_purchase(USER_A, amt(money(cents)), Currency::Usd, None)
                        .await
                        .map(|_| ()),
                };
            }

            let report = f.verifier.verify_system_balance().await.unwrap();
            assert!(report.is_balanced, "reserve imbalance: {report:?}");

            let chain = f.verifier.verify_hash_chain().await.unwrap();
            assert!(chain.is_intact);

            let state = f.store.begin().await.unwrap().state;
            for wallet in &state.wallets {
                assert!(wallet.balance >= Decimal::ZERO);
                assert!(wallet.frozen_balance >= Decimal::ZERO);
            }
            for agent in state.agents.values() {
                for (_, value) in agent.current_credit.iter() {
                    assert!(value >= Decimal::ZERO);
                }
                for (_, value) in agent.cash_collected.iter() {
                    assert!(value >= Decimal::ZERO);
                }
            }
            for merchant in state.merchants.values() {
                for (_, value) in merchant.balances.iter() {
                    assert!(value >= Decimal::ZERO);
                }
            }
        });
    }
}
