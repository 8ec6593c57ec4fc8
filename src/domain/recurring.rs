use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CoreError, Result};
use crate::schedule::{Frequency, YearMonth};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntityKind {
    Income,
    Expense,
    Bill,
    Subscription,
}

impl EntityKind {
    /// Incomes post positive amounts to a wallet; everything else posts
    /// negative.
    pub fn is_inflow(&self) -> bool {
        matches!(self, EntityKind::Income)
    }

    /// Bills and subscriptions are journaled per calendar month; incomes and
    /// expenses per occurrence date.
    pub fn month_keyed(&self) -> bool {
        matches!(self, EntityKind::Bill | EntityKind::Subscription)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Income => "income",
            EntityKind::Expense => "expense",
            EntityKind::Bill => "bill",
            EntityKind::Subscription => "subscription",
        }
    }
}

/// One effective-dated amount interval. Insertion order is chronological; the
/// open interval (end = None) is closed the instant a newer change starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmountChange {
    pub amount: f64,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

/// A suspension or cancellation window. At most one per entity; starting a new
/// one overwrites the previous. Unlike amount changes, no history is kept for
/// these windows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suspension {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub indefinite: bool,
    #[serde(default)]
    pub note: String,
}

/// A recurring income source, expense, bill, or subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringEntity {
    pub id: Uuid,
    pub name: String,
    pub kind: EntityKind,
    pub amount: f64,
    pub frequency: Frequency,
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub pre_tax: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub linked_wallet: Option<Uuid>,
    #[serde(default)]
    pub variable_pricing: bool,
    #[serde(default)]
    pub monthly_price_overrides: BTreeMap<YearMonth, f64>,
    #[serde(default)]
    pub amount_change_history: Vec<AmountChange>,
    #[serde(default)]
    pub suspension: Option<Suspension>,
    #[serde(default)]
    pub paid_months: BTreeSet<YearMonth>,
}

impl RecurringEntity {
    /// Creates a new entity, validating at the boundary so malformed amounts
    /// and names never enter the core.
    pub fn new(
        name: impl Into<String>,
        kind: EntityKind,
        amount: f64,
        frequency: Frequency,
        anchor_date: NaiveDate,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_amount(amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            kind,
            amount,
            frequency,
            anchor_date,
            pre_tax: false,
            category: None,
            linked_wallet: None,
            variable_pricing: false,
            monthly_price_overrides: BTreeMap::new(),
            amount_change_history: Vec::new(),
            suspension: None,
            paid_months: BTreeSet::new(),
        })
    }

    pub fn with_wallet(mut self, wallet: Uuid) -> Self {
        self.linked_wallet = Some(wallet);
        self
    }

    pub fn with_pre_tax(mut self, pre_tax: bool) -> Self {
        self.pre_tax = pre_tax;
        self
    }

    /// Resolves the effective amount for `date`: a variable-pricing override
    /// for that month wins, then the amount-change interval containing the
    /// date, then the base amount.
    pub fn amount_at(&self, date: NaiveDate) -> f64 {
        if self.variable_pricing {
            let ym = YearMonth::from_date(date);
            if let Some(amount) = self.monthly_price_overrides.get(&ym) {
                return *amount;
            }
        }
        for change in &self.amount_change_history {
            if change.start <= date && change.end.map_or(true, |end| end >= date) {
                return change.amount;
            }
        }
        self.amount
    }

    /// True when a suspension window covers `date`. A window whose `from` is
    /// still in the future is not yet active; both boundaries are inclusive.
    pub fn is_suspended_at(&self, date: NaiveDate) -> bool {
        match &self.suspension {
            None => false,
            Some(window) => {
                if date < window.from {
                    return false;
                }
                window.indefinite || window.to.map_or(false, |to| date <= to)
            }
        }
    }

    /// Records a price change effective on `start`. The previously open
    /// interval is closed at `start` minus one day in the same mutation, so a
    /// reader can never observe two open intervals.
    pub fn record_amount_change(&mut self, amount: f64, start: NaiveDate) -> Result<()> {
        validate_amount(amount)?;
        if let Some(last) = self.amount_change_history.last() {
            if last.start >= start {
                return Err(CoreError::InvalidInput(format!(
                    "amount change for `{}` must start after {}",
                    self.name, last.start
                )));
            }
        }
        if let Some(open) = self
            .amount_change_history
            .iter_mut()
            .find(|change| change.end.is_none())
        {
            open.end = Some(start - Duration::days(1));
        }
        self.amount_change_history.push(AmountChange {
            amount,
            start,
            end: None,
        });
        Ok(())
    }

    /// Starts a suspension window, overwriting any existing one.
    pub fn suspend(
        &mut self,
        from: NaiveDate,
        to: Option<NaiveDate>,
        indefinite: bool,
        note: impl Into<String>,
    ) {
        self.suspension = Some(Suspension {
            from,
            to,
            indefinite,
            note: note.into(),
        });
    }

    pub fn clear_suspension(&mut self) {
        self.suspension = None;
    }

    pub fn set_price_override(&mut self, month: YearMonth, amount: f64) -> Result<()> {
        validate_amount(amount)?;
        self.monthly_price_overrides.insert(month, amount);
        Ok(())
    }

    /// Flips the user-facing "settled" marker for a month. Independent of the
    /// sync journal; a user can mark a bill paid with no linked wallet.
    pub fn toggle_paid_month(&mut self, month: YearMonth) -> bool {
        if self.paid_months.remove(&month) {
            false
        } else {
            self.paid_months.insert(month);
            true
        }
    }

    pub fn is_paid(&self, month: YearMonth) -> bool {
        self.paid_months.contains(&month)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidInput("name must not be empty".into()));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::InvalidInput(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly_bill(amount: f64) -> RecurringEntity {
        RecurringEntity::new(
            "Internet",
            EntityKind::Bill,
            amount,
            Frequency::Monthly,
            d(2024, 1, 5),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_input_at_boundary() {
        assert!(RecurringEntity::new("", EntityKind::Bill, 10.0, Frequency::Monthly, d(2024, 1, 1))
            .is_err());
        assert!(
            RecurringEntity::new("Rent", EntityKind::Bill, 0.0, Frequency::Monthly, d(2024, 1, 1))
                .is_err()
        );
        assert!(RecurringEntity::new(
            "Rent",
            EntityKind::Bill,
            f64::NAN,
            Frequency::Monthly,
            d(2024, 1, 1)
        )
        .is_err());
    }

    #[test]
    fn amount_before_first_change_is_base() {
        let mut bill = monthly_bill(100.0);
        bill.record_amount_change(150.0, d(2024, 6, 1)).unwrap();
        assert_eq!(bill.amount_at(d(2024, 5, 31)), 100.0);
        assert_eq!(bill.amount_at(d(2020, 1, 1)), 100.0);
    }

    #[test]
    fn price_change_closes_prior_interval_at_day_before() {
        let mut bill = monthly_bill(100.0);
        bill.record_amount_change(100.0, d(2024, 1, 5)).unwrap();
        bill.record_amount_change(150.0, d(2024, 6, 1)).unwrap();

        assert_eq!(bill.amount_at(d(2024, 5, 31)), 100.0);
        assert_eq!(bill.amount_at(d(2024, 6, 1)), 150.0);
        assert_eq!(bill.amount_at(d(2025, 1, 1)), 150.0);
        assert_eq!(bill.amount_change_history[0].end, Some(d(2024, 5, 31)));

        let open: Vec<_> = bill
            .amount_change_history
            .iter()
            .filter(|c| c.end.is_none())
            .collect();
        assert_eq!(open.len(), 1, "exactly one open interval after a change");
    }

    #[test]
    fn rejects_out_of_order_changes() {
        let mut bill = monthly_bill(100.0);
        bill.record_amount_change(150.0, d(2024, 6, 1)).unwrap();
        assert!(bill.record_amount_change(90.0, d(2024, 6, 1)).is_err());
        assert!(bill.record_amount_change(90.0, d(2024, 3, 1)).is_err());
    }

    #[test]
    fn variable_override_wins_over_history() {
        let mut bill = monthly_bill(100.0);
        bill.variable_pricing = true;
        bill.record_amount_change(150.0, d(2024, 1, 1)).unwrap();
        bill.set_price_override(YearMonth::new(2024, 3), 42.5).unwrap();

        assert_eq!(bill.amount_at(d(2024, 3, 15)), 42.5);
        assert_eq!(bill.amount_at(d(2024, 4, 15)), 150.0);
    }

    #[test]
    fn suspension_boundaries_are_inclusive() {
        let mut bill = monthly_bill(100.0);
        bill.suspend(d(2024, 3, 10), Some(d(2024, 4, 10)), false, "paused");

        assert!(!bill.is_suspended_at(d(2024, 3, 9)));
        assert!(bill.is_suspended_at(d(2024, 3, 10)));
        assert!(bill.is_suspended_at(d(2024, 4, 10)));
        assert!(!bill.is_suspended_at(d(2024, 4, 11)));
    }

    #[test]
    fn indefinite_suspension_never_ends() {
        let mut bill = monthly_bill(100.0);
        bill.suspend(d(2024, 3, 10), None, true, "cancelled");
        assert!(!bill.is_suspended_at(d(2024, 3, 9)));
        assert!(bill.is_suspended_at(d(2030, 1, 1)));

        // A bounded window with no end date is never active past `from`.
        bill.suspend(d(2024, 5, 1), None, false, "half-open");
        assert!(!bill.is_suspended_at(d(2024, 5, 1)));
    }

    #[test]
    fn new_suspension_overwrites_previous() {
        let mut bill = monthly_bill(100.0);
        bill.suspend(d(2024, 1, 1), Some(d(2024, 2, 1)), false, "first");
        bill.suspend(d(2024, 6, 1), None, true, "second");
        assert!(!bill.is_suspended_at(d(2024, 1, 15)));
        assert!(bill.is_suspended_at(d(2024, 6, 1)));
    }

    #[test]
    fn paid_month_toggle_is_reversible() {
        let mut bill = monthly_bill(50.0);
        let march = YearMonth::new(2024, 3);

        assert!(bill.toggle_paid_month(march));
        assert!(bill.is_paid(march));
        assert!(!bill.toggle_paid_month(march));
        assert!(!bill.is_paid(march));
        assert!(bill.paid_months.is_empty());
    }
}
