//! Ledger sync engine: posts newly-due occurrences of recurring entities to
//! their linked wallets exactly once per occurrence, journaling every posted
//! period key so repeated app loads never double-post.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Book, EntityKind, RecurringEntity};
use crate::errors::Result;
use crate::money::round2;
use crate::schedule::{occurrences_between, YearMonth};
use crate::storage::StorageBackend;

/// The processed-occurrence journal, persisted under a fixed key separate from
/// entity state. Incomes and expenses are keyed by occurrence date; bills and
/// subscriptions by calendar month. Per-entity key sets are append-only and
/// monotonically non-decreasing; a key present here is never posted again.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncJournal {
    #[serde(default)]
    pub incomes: BTreeMap<Uuid, BTreeSet<NaiveDate>>,
    #[serde(default)]
    pub expenses: BTreeMap<Uuid, BTreeSet<NaiveDate>>,
    #[serde(default)]
    pub bills: BTreeMap<Uuid, BTreeSet<YearMonth>>,
    #[serde(default)]
    pub subscriptions: BTreeMap<Uuid, BTreeSet<YearMonth>>,
}

impl SyncJournal {
    pub fn is_posted(&self, entity: &RecurringEntity, occurrence: NaiveDate) -> bool {
        match entity.kind {
            EntityKind::Income => contains_date(&self.incomes, entity.id, occurrence),
            EntityKind::Expense => contains_date(&self.expenses, entity.id, occurrence),
            EntityKind::Bill => contains_month(&self.bills, entity.id, occurrence),
            EntityKind::Subscription => contains_month(&self.subscriptions, entity.id, occurrence),
        }
    }

    pub fn mark_posted(&mut self, entity: &RecurringEntity, occurrence: NaiveDate) {
        mark_by_kind(self, entity.kind, entity.id, occurrence);
    }

    pub fn posted_count(&self) -> usize {
        self.incomes.values().map(BTreeSet::len).sum::<usize>()
            + self.expenses.values().map(BTreeSet::len).sum::<usize>()
            + self.bills.values().map(BTreeSet::len).sum::<usize>()
            + self.subscriptions.values().map(BTreeSet::len).sum::<usize>()
    }
}

fn contains_date(map: &BTreeMap<Uuid, BTreeSet<NaiveDate>>, id: Uuid, date: NaiveDate) -> bool {
    map.get(&id).is_some_and(|set| set.contains(&date))
}

fn contains_month(map: &BTreeMap<Uuid, BTreeSet<YearMonth>>, id: Uuid, date: NaiveDate) -> bool {
    map.get(&id)
        .is_some_and(|set| set.contains(&YearMonth::from_date(date)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub posted: usize,
    pub skipped_missing_wallet: usize,
    /// True when the in-memory guard suppressed a repeat run.
    pub already_ran: bool,
}

struct PendingPosting {
    wallet: Uuid,
    date: NaiveDate,
    amount: f64,
    memo: String,
    entity: Uuid,
}

/// One-shot startup task. The guard flag is owned here; within a session a
/// second `run` is a no-op, and across sessions the journal carries the
/// exactly-once state.
#[derive(Debug, Default)]
pub struct LedgerSync {
    completed: bool,
}

impl LedgerSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_run(&self) -> bool {
        self.completed
    }

    /// Walks every recurring entity and posts occurrences that are due (on or
    /// before `today`), have a linked wallet that exists, and are absent from
    /// the journal. Suspended occurrences do not post. Entities referencing a
    /// wallet that no longer exists are skipped with a warning; the run
    /// continues.
    pub fn run(&mut self, book: &mut Book, journal: &mut SyncJournal, today: NaiveDate) -> SyncReport {
        if self.completed {
            return SyncReport {
                already_ran: true,
                ..SyncReport::default()
            };
        }
        self.completed = true;

        let mut pending = Vec::new();
        let mut skipped_missing_wallet = 0usize;

        for entity in book.recurring_entities() {
            let Some(wallet_id) = entity.linked_wallet else {
                continue;
            };
            if book.wallet(wallet_id).is_none() {
                tracing::warn!(
                    entity = %entity.name,
                    wallet = %wallet_id,
                    "linked wallet no longer exists; skipping sync for entity"
                );
                skipped_missing_wallet += 1;
                continue;
            }
            for occurrence in
                occurrences_between(entity.anchor_date, entity.frequency, entity.anchor_date, today)
            {
                if entity.is_suspended_at(occurrence) {
                    continue;
                }
                if journal.is_posted(entity, occurrence) {
                    continue;
                }
                // Journaled immediately so a second occurrence mapping to the
                // same period key (a weekly bill within one month) cannot pass
                // the check above; only the wallet mutation is deferred.
                journal.mark_posted(entity, occurrence);
                let effective = entity.amount_at(occurrence);
                let amount = if entity.kind.is_inflow() {
                    round2(effective)
                } else {
                    round2(-effective)
                };
                pending.push(PendingPosting {
                    wallet: wallet_id,
                    date: occurrence,
                    amount,
                    memo: format!("auto-sync: {} ({})", entity.name, entity.kind.label()),
                    entity: entity.id,
                });
            }
        }

        let mut posted = 0usize;
        for posting in pending {
            let Some(wallet) = book.wallet_mut(posting.wallet) else {
                continue;
            };
            wallet.post(posting.date, posting.amount, posting.memo.clone());
            tracing::debug!(
                entity = %posting.entity,
                date = %posting.date,
                amount = posting.amount,
                "posted occurrence to wallet"
            );
            posted += 1;
        }

        tracing::info!(posted, skipped_missing_wallet, "ledger sync complete");
        SyncReport {
            posted,
            skipped_missing_wallet,
            already_ran: false,
        }
    }
}

fn mark_by_kind(journal: &mut SyncJournal, kind: EntityKind, entity: Uuid, occurrence: NaiveDate) {
    match kind {
        EntityKind::Income => {
            journal.incomes.entry(entity).or_default().insert(occurrence);
        }
        EntityKind::Expense => {
            journal.expenses.entry(entity).or_default().insert(occurrence);
        }
        EntityKind::Bill => {
            journal
                .bills
                .entry(entity)
                .or_default()
                .insert(YearMonth::from_date(occurrence));
        }
        EntityKind::Subscription => {
            journal
                .subscriptions
                .entry(entity)
                .or_default()
                .insert(YearMonth::from_date(occurrence));
        }
    }
}

/// Startup entry point: runs the sync, then persists the journal. Journal
/// append and persistence are two separate steps with no atomic combination;
/// a crash between them re-derives a stale journal on the next run and may
/// re-post. Under normal operation the journal makes posting exactly-once.
pub fn run_startup_sync(
    sync: &mut LedgerSync,
    book: &mut Book,
    journal: &mut SyncJournal,
    storage: &dyn StorageBackend,
    today: NaiveDate,
) -> Result<SyncReport> {
    let report = sync.run(book, journal, today);
    if !report.already_ran {
        storage.save_journal(journal)?;
    }
    Ok(report)
}
