use crate::domain::money::round_money;
use crate::domain::settings::FeeSettings;
use crate::domain::transaction::{FeeBreakdown, TransactionType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Computes the fee split for one transaction.
///
/// All intermediate values are rounded to 2 dp half-up; `platform_fee` is
/// derived by subtraction so the three fee fields always sum exactly, which
/// keeps the resulting journal lines inside the 0.01 balance tolerance.
/// Transfers and QR payments involve no agent, so their agent share is
/// forced to zero regardless of configuration.
pub fn calculate_commission(
    settings: &FeeSettings,
    amount: Decimal,
    tx_type: TransactionType,
) -> FeeBreakdown {
    let rule = settings.rule(tx_type);

    let percentage_fee = round_money(amount * rule.percent / dec!(100));
    let total_fee = round_money(percentage_fee + rule.fixed);

    let agent_percent = match tx_type {
        TransactionType::Transfer | TransactionType::QrPayment => Decimal::ZERO,
        _ => settings.agent_commission_percent,
    };
    let agent_fee = round_money(total_fee * agent_percent / dec!(100));
    let platform_fee = total_fee - agent_fee;
    let net_amount = amount - total_fee;

    FeeBreakdown {
        platform_fee,
        agent_fee,
        total_fee,
        net_amount,
    }
}
