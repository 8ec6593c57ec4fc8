use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CoreError, Result};
use crate::money::round2;

/// One payment applied to a debt. History entries are immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtPayment {
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub memo: String,
}

/// A debt with a running principal. `original_balance` is snapshotted at
/// creation and drives the percent-paid figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtEntity {
    pub id: Uuid,
    pub name: String,
    pub balance: f64,
    pub original_balance: f64,
    /// Annual interest rate, in percent.
    pub interest_rate: f64,
    pub minimum_payment: f64,
    #[serde(default)]
    pub payment_history: Vec<DebtPayment>,
}

impl DebtEntity {
    pub fn new(
        name: impl Into<String>,
        balance: f64,
        interest_rate: f64,
        minimum_payment: f64,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidInput("debt name must not be empty".into()));
        }
        if !balance.is_finite() || balance <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "debt balance must be a positive number, got {balance}"
            )));
        }
        if !interest_rate.is_finite() || interest_rate < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "interest rate must be non-negative, got {interest_rate}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            balance,
            original_balance: balance,
            interest_rate,
            minimum_payment,
            payment_history: Vec::new(),
        })
    }

    /// Appends a payment and decrements the running balance, clamped at zero.
    pub fn record_payment(
        &mut self,
        amount: f64,
        date: NaiveDate,
        memo: impl Into<String>,
    ) -> Result<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "payment amount must be a positive number, got {amount}"
            )));
        }
        self.payment_history.push(DebtPayment {
            amount,
            date,
            memo: memo.into(),
        });
        self.balance = round2((self.balance - amount).max(0.0));
        Ok(())
    }

    /// Share of the original balance already paid off, 0.0 to 100.0.
    pub fn percent_paid(&self) -> f64 {
        if self.original_balance <= 0.0 {
            return 0.0;
        }
        ((self.original_balance - self.balance) / self.original_balance * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn payments_append_and_reduce_balance() {
        let mut debt = DebtEntity::new("Car loan", 10000.0, 6.0, 250.0).unwrap();
        debt.record_payment(400.0, d(2024, 1, 15), "january").unwrap();
        debt.record_payment(400.0, d(2024, 2, 15), "february").unwrap();

        assert_eq!(debt.balance, 9200.0);
        assert_eq!(debt.original_balance, 10000.0);
        assert_eq!(debt.payment_history.len(), 2);
        assert_eq!(debt.percent_paid(), 8.0);
    }

    #[test]
    fn overpayment_clamps_at_zero() {
        let mut debt = DebtEntity::new("Last bit", 100.0, 0.0, 25.0).unwrap();
        debt.record_payment(250.0, d(2024, 1, 1), "payoff").unwrap();
        assert_eq!(debt.balance, 0.0);
        assert_eq!(debt.percent_paid(), 100.0);
    }

    #[test]
    fn rejects_non_positive_payment() {
        let mut debt = DebtEntity::new("Card", 500.0, 20.0, 25.0).unwrap();
        assert!(debt.record_payment(0.0, d(2024, 1, 1), "").is_err());
        assert!(debt.record_payment(-5.0, d(2024, 1, 1), "").is_err());
    }
}
