use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DebtEntity, InvestmentEntity, RecurringEntity, WalletAccount};
use crate::money::round2;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The owned state object holding every entity collection. Reads are plain
/// snapshots; mutations go through methods that bump `updated_at`, and any
/// mutation that depends on prior state (closing an amount-change interval,
/// replacing a suspension window) happens inside a single method call so a
/// reader never observes an inconsistent intermediate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub incomes: Vec<RecurringEntity>,
    #[serde(default)]
    pub expenses: Vec<RecurringEntity>,
    #[serde(default)]
    pub bills: Vec<RecurringEntity>,
    #[serde(default)]
    pub subscriptions: Vec<RecurringEntity>,
    #[serde(default)]
    pub debts: Vec<DebtEntity>,
    #[serde(default)]
    pub investments: Vec<InvestmentEntity>,
    #[serde(default)]
    pub wallets: Vec<WalletAccount>,
}

fn default_schema_version() -> u8 {
    CURRENT_SCHEMA_VERSION
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
            incomes: Vec::new(),
            expenses: Vec::new(),
            bills: Vec::new(),
            subscriptions: Vec::new(),
            debts: Vec::new(),
            investments: Vec::new(),
            wallets: Vec::new(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_income(&mut self, entity: RecurringEntity) -> Uuid {
        let id = entity.id;
        self.incomes.push(entity);
        self.touch();
        id
    }

    pub fn add_expense(&mut self, entity: RecurringEntity) -> Uuid {
        let id = entity.id;
        self.expenses.push(entity);
        self.touch();
        id
    }

    pub fn add_bill(&mut self, entity: RecurringEntity) -> Uuid {
        let id = entity.id;
        self.bills.push(entity);
        self.touch();
        id
    }

    pub fn add_subscription(&mut self, entity: RecurringEntity) -> Uuid {
        let id = entity.id;
        self.subscriptions.push(entity);
        self.touch();
        id
    }

    pub fn add_debt(&mut self, debt: DebtEntity) -> Uuid {
        let id = debt.id;
        self.debts.push(debt);
        self.touch();
        id
    }

    pub fn add_investment(&mut self, investment: InvestmentEntity) -> Uuid {
        let id = investment.id;
        self.investments.push(investment);
        self.touch();
        id
    }

    pub fn add_wallet(&mut self, wallet: WalletAccount) -> Uuid {
        let id = wallet.id;
        self.wallets.push(wallet);
        self.touch();
        id
    }

    pub fn wallet(&self, id: Uuid) -> Option<&WalletAccount> {
        self.wallets.iter().find(|w| w.id == id)
    }

    pub fn wallet_mut(&mut self, id: Uuid) -> Option<&mut WalletAccount> {
        self.wallets.iter_mut().find(|w| w.id == id)
    }

    /// All recurring entities, in sync order: incomes, expenses, bills,
    /// subscriptions.
    pub fn recurring_entities(&self) -> impl Iterator<Item = &RecurringEntity> {
        self.incomes
            .iter()
            .chain(self.expenses.iter())
            .chain(self.bills.iter())
            .chain(self.subscriptions.iter())
    }

    /// Wallet balances plus investment values, less outstanding debt.
    pub fn net_worth(&self) -> f64 {
        let wallets: f64 = self.wallets.iter().map(|w| w.balance()).sum();
        let investments: f64 = self.investments.iter().map(|i| i.current_value()).sum();
        let debts: f64 = self.debts.iter().map(|d| d.balance).sum();
        round2(wallets + investments - debts)
    }
}
