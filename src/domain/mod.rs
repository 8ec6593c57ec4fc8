//! Domain models: recurring entities, debts, investments, wallets, and the
//! owned `Book` state object they live in.

pub mod book;
pub mod debt;
pub mod investment;
pub mod recurring;
pub mod wallet;

pub use book::Book;
pub use debt::{DebtEntity, DebtPayment};
pub use investment::{EarningsEntry, InvestmentEntity};
pub use recurring::{AmountChange, EntityKind, RecurringEntity, Suspension};
pub use wallet::{WalletAccount, WalletKind, WalletTransaction};
