use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CoreError, Result};
use crate::money::round2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WalletKind {
    Cash,
    Checking,
    Savings,
    CreditCard,
}

/// A single signed posting. Append-only once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub memo: String,
}

/// A wallet account. The balance is derived: starting amount plus every
/// transaction dated on or after the enact date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub id: Uuid,
    pub name: String,
    pub kind: WalletKind,
    pub starting_amount: f64,
    pub enact_date: NaiveDate,
    #[serde(default)]
    pub transactions: Vec<WalletTransaction>,
}

impl WalletAccount {
    pub fn new(
        name: impl Into<String>,
        kind: WalletKind,
        starting_amount: f64,
        enact_date: NaiveDate,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidInput("wallet name must not be empty".into()));
        }
        if !starting_amount.is_finite() {
            return Err(CoreError::InvalidInput(
                "starting amount must be a number".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            kind,
            starting_amount,
            enact_date,
            transactions: Vec::new(),
        })
    }

    /// Appends a signed posting and returns its id.
    pub fn post(&mut self, date: NaiveDate, amount: f64, memo: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.transactions.push(WalletTransaction {
            id,
            date,
            amount,
            memo: memo.into(),
        });
        id
    }

    pub fn balance(&self) -> f64 {
        let posted: f64 = self
            .transactions
            .iter()
            .filter(|txn| txn.date >= self.enact_date)
            .map(|txn| txn.amount)
            .sum();
        round2(self.starting_amount + posted)
    }
}
