pub mod json_backend;

use std::collections::BTreeMap;

use crate::domain::Book;
use crate::errors::Result;
use crate::sync::SyncJournal;

pub use json_backend::JsonStorage;

/// Budget goals are a plain `{category -> monthly goal}` map, persisted
/// independently of entity state and consumed only by reporting.
pub type BudgetGoals = BTreeMap<String, f64>;

/// Abstraction over the persisted key-value store. Synchronous, last write
/// wins, no transactional guarantees. The journal and goals load leniently:
/// an absent record yields the default.
pub trait StorageBackend: Send + Sync {
    fn load_book(&self) -> Result<Option<Book>>;
    fn save_book(&self, book: &Book) -> Result<()>;
    fn load_journal(&self) -> Result<SyncJournal>;
    fn save_journal(&self, journal: &SyncJournal) -> Result<()>;
    fn load_goals(&self) -> Result<BudgetGoals>;
    fn save_goals(&self, goals: &BudgetGoals) -> Result<()>;
}
