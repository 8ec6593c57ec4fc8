//! Closed-loop monthly simulators for debt payoff and investment growth.
//! Every money value is rounded to two decimals per step, not just at output;
//! per-step rounding is what keeps the schedule totals reproducible.

use serde::{Deserialize, Serialize};

use crate::domain::InvestmentEntity;
use crate::money::round2;

pub const DEFAULT_AMORTIZATION_MONTHS: usize = 360;
pub const DEFAULT_GROWTH_MONTHS: usize = 120;
/// Annual return assumed for investments that carry no expected rate.
pub const DEFAULT_RETURN_PERCENT: f64 = 7.0;

/// Balance below which a debt is considered paid off.
const PAYOFF_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthRow {
    pub month: u32,
    pub contribution: f64,
    pub earnings: f64,
    pub balance: f64,
}

/// Amortizes `balance` at `annual_rate_percent` with a fixed monthly payment.
/// The final payment is capped so the balance cannot go negative. A payment
/// that does not cover the interest charge never converges; the table then
/// terminates at `max_months` rather than looping.
pub fn simulate_amortization(
    balance: f64,
    annual_rate_percent: f64,
    monthly_payment: f64,
    max_months: usize,
) -> Vec<AmortizationRow> {
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let mut rows = Vec::new();
    let mut remaining = round2(balance);
    let mut month = 0u32;

    while remaining > PAYOFF_EPSILON && (month as usize) < max_months {
        month += 1;
        let interest = round2(remaining * monthly_rate);
        let payment = round2(monthly_payment.min(remaining + interest));
        let principal = round2(payment - interest);
        remaining = round2((remaining - principal).max(0.0));
        rows.push(AmortizationRow {
            month,
            payment,
            principal,
            interest,
            balance: remaining,
        });
    }

    if remaining > PAYOFF_EPSILON {
        tracing::warn!(
            remaining,
            max_months,
            "amortization did not converge within the month cap"
        );
    }
    rows
}

/// Projects `current_value` forward at `annual_return_percent` with a fixed
/// monthly contribution over a fixed horizon; no early termination.
pub fn simulate_growth(
    current_value: f64,
    monthly_contribution: f64,
    annual_return_percent: f64,
    months: usize,
) -> Vec<GrowthRow> {
    let monthly_rate = annual_return_percent / 100.0 / 12.0;
    let mut rows = Vec::with_capacity(months);
    let mut balance = round2(current_value);

    for month in 1..=months as u32 {
        let earnings = round2(balance * monthly_rate);
        balance = round2(balance + earnings + monthly_contribution);
        rows.push(GrowthRow {
            month,
            contribution: round2(monthly_contribution),
            earnings,
            balance,
        });
    }
    rows
}

/// Projects an investment forward from its current value, using its expected
/// return rate or the 7% default when none is set, and its contribution
/// converted to a monthly figure.
pub fn project_investment(investment: &InvestmentEntity, months: usize) -> Vec<GrowthRow> {
    let rate = investment
        .expected_return_rate
        .unwrap_or(DEFAULT_RETURN_PERCENT);
    let monthly_contribution = investment
        .frequency
        .monthly_estimate(investment.contribution_amount);
    simulate_growth(investment.current_value(), monthly_contribution, rate, months)
}
