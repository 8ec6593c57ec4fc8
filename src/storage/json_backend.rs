use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;

use crate::config::AppConfig;
use crate::domain::Book;
use crate::errors::{CoreError, Result};
use crate::sync::SyncJournal;

use super::{BudgetGoals, StorageBackend};

const BOOK_FILE: &str = "book.json";
const JOURNAL_FILE: &str = "sync_journal.json";
const GOALS_FILE: &str = "budget_goals.json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// JSON file storage: one document per record, written atomically by staging
/// to a temporary file and renaming over the target. The book gets a
/// timestamped backup before each overwrite, pruned to the retention count.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => default_root()?,
        };
        ensure_dir(&root)?;
        let backups_dir = root.join("backups");
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.data_dir.clone(), Some(config.backup_retention))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    fn backup_book_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup = self.backups_dir.join(format!("book_{timestamp}.json"));
        fs::copy(path, &backup)?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        let mut backups = self.list_backups()?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        backups.sort();
        backups.reverse();
        for stale in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backups_dir.join(stale));
        }
        Ok(())
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    fn load_record<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.record_path(file);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save_record<T: serde::Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.record_path(file);
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(&path, &json)
    }
}

impl StorageBackend for JsonStorage {
    fn load_book(&self) -> Result<Option<Book>> {
        self.load_record(BOOK_FILE)
    }

    fn save_book(&self, book: &Book) -> Result<()> {
        let path = self.record_path(BOOK_FILE);
        self.backup_book_file(&path)?;
        self.save_record(BOOK_FILE, book)
    }

    fn load_journal(&self) -> Result<SyncJournal> {
        Ok(self.load_record(JOURNAL_FILE)?.unwrap_or_default())
    }

    fn save_journal(&self, journal: &SyncJournal) -> Result<()> {
        self.save_record(JOURNAL_FILE, journal)
            .map_err(|err| CoreError::Persistence(format!("journal save failed: {err}")))
    }

    fn load_goals(&self) -> Result<BudgetGoals> {
        Ok(self.load_record(GOALS_FILE)?.unwrap_or_default())
    }

    fn save_goals(&self, goals: &BudgetGoals) -> Result<()> {
        self.save_record(GOALS_FILE, goals)
    }
}

fn default_root() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| CoreError::Persistence("no platform data directory available".into()))?;
    Ok(base.join("wealth_core"))
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{WalletAccount, WalletKind};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage =
            JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("json storage");
        (storage, temp)
    }

    #[test]
    fn absent_records_load_as_defaults() {
        let (storage, _guard) = storage_with_temp_dir();
        assert!(storage.load_book().unwrap().is_none());
        assert_eq!(storage.load_journal().unwrap(), SyncJournal::default());
        assert!(storage.load_goals().unwrap().is_empty());
    }

    #[test]
    fn book_roundtrips() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut book = Book::new();
        let enact = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        book.add_wallet(WalletAccount::new("Cash", WalletKind::Cash, 25.0, enact).unwrap());
        storage.save_book(&book).expect("save book");

        let loaded = storage.load_book().expect("load").expect("present");
        assert_eq!(loaded.wallets.len(), 1);
        assert_eq!(loaded.wallets[0].name, "Cash");
    }

    #[test]
    fn saving_twice_leaves_a_backup() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = Book::new();
        storage.save_book(&book).unwrap();
        storage.save_book(&book).unwrap();
        let backups = storage.list_backups().unwrap();
        assert!(!backups.is_empty(), "expected a timestamped backup");
    }

    #[test]
    fn goals_persist_independently_of_the_book() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut goals = BudgetGoals::new();
        goals.insert("Housing".into(), 1500.0);
        storage.save_goals(&goals).unwrap();

        assert!(storage.load_book().unwrap().is_none());
        assert_eq!(storage.load_goals().unwrap(), goals);
    }
}
