use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CoreError, Result};
use crate::money::round2;
use crate::schedule::Frequency;

/// One signed ledger entry for an investment: negative amounts are
/// contributions, positive amounts are earnings. Append-only, so the current
/// value is the sum of all entries by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningsEntry {
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentEntity {
    pub id: Uuid,
    pub name: String,
    pub contribution_amount: f64,
    pub frequency: Frequency,
    /// Annual expected return, in percent. `None` falls back to the 7%
    /// default at projection time.
    #[serde(default)]
    pub expected_return_rate: Option<f64>,
    #[serde(default)]
    pub earnings_history: Vec<EarningsEntry>,
}

impl InvestmentEntity {
    pub fn new(
        name: impl Into<String>,
        contribution_amount: f64,
        frequency: Frequency,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "investment name must not be empty".into(),
            ));
        }
        if !contribution_amount.is_finite() || contribution_amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "contribution amount must be a positive number, got {contribution_amount}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            contribution_amount,
            frequency,
            expected_return_rate: None,
            earnings_history: Vec::new(),
        })
    }

    /// Records money put in; stored negative by convention.
    pub fn record_contribution(
        &mut self,
        amount: f64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "contribution must be a positive number, got {amount}"
            )));
        }
        self.earnings_history.push(EarningsEntry {
            amount: -amount,
            date,
            description: description.into(),
        });
        Ok(())
    }

    /// Records growth (or loss, when negative relative to earnings sign).
    pub fn record_earnings(
        &mut self,
        amount: f64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<()> {
        if !amount.is_finite() {
            return Err(CoreError::InvalidInput("earnings must be a number".into()));
        }
        self.earnings_history.push(EarningsEntry {
            amount,
            date,
            description: description.into(),
        });
        Ok(())
    }

    pub fn current_value(&self) -> f64 {
        round2(self.earnings_history.iter().map(|e| e.amount).sum())
    }
}
