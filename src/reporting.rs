//! Occurrence accumulator: walks the frequency calendar over a bounded window,
//! applies per-occurrence amount resolution and suspension checks, and sums the
//! results for the reporting views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::RecurringEntity;
use crate::money::round2;
use crate::schedule::{occurrences_between, YearMonth};

pub const TITHE_RATE: f64 = 0.10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthTotal {
    pub month: YearMonth,
    pub total: f64,
}

/// Sums every occurrence of `entities` falling within `[start, end]`. Each
/// occurrence contributes its effective amount unless suspended, in which case
/// it contributes zero. When `up_to` is given, occurrences after it are
/// excluded — the "received so far this month" views only count occurrences at
/// or before now.
pub fn period_total(
    entities: &[RecurringEntity],
    start: NaiveDate,
    end: NaiveDate,
    up_to: Option<NaiveDate>,
) -> f64 {
    period_total_iter(entities.iter(), start, end, up_to)
}

fn period_total_iter<'a>(
    entities: impl Iterator<Item = &'a RecurringEntity>,
    start: NaiveDate,
    end: NaiveDate,
    up_to: Option<NaiveDate>,
) -> f64 {
    let mut total = 0.0;
    for entity in entities {
        for occurrence in occurrences_between(entity.anchor_date, entity.frequency, start, end) {
            if let Some(cutoff) = up_to {
                if occurrence > cutoff {
                    continue;
                }
            }
            if entity.is_suspended_at(occurrence) {
                continue;
            }
            total += entity.amount_at(occurrence);
        }
    }
    round2(total)
}

/// Period total for one calendar month. This is the entry point the UI calls
/// for the monthly dashboard figures.
pub fn compute_monthly_total(
    entities: &[RecurringEntity],
    month: YearMonth,
    up_to: Option<NaiveDate>,
) -> f64 {
    period_total(entities, month.first_day(), month.last_day(), up_to)
}

/// Twelve monthly totals ending at `as_of`, oldest first.
pub fn compute_twelve_month_series(
    entities: &[RecurringEntity],
    as_of: YearMonth,
) -> Vec<MonthTotal> {
    let mut months = Vec::with_capacity(12);
    let mut month = as_of;
    for _ in 0..12 {
        months.push(month);
        month = month.previous();
    }
    months.reverse();

    months
        .into_iter()
        .map(|month| MonthTotal {
            month,
            total: compute_monthly_total(entities, month, None),
        })
        .collect()
}

/// Ten percent of the post-tax income received in `month`. Pre-tax incomes are
/// excluded from both the total and the tithe base.
pub fn tithe_recommendation(
    incomes: &[RecurringEntity],
    month: YearMonth,
    up_to: Option<NaiveDate>,
) -> f64 {
    let post_tax = period_total_iter(
        incomes.iter().filter(|income| !income.pre_tax),
        month.first_day(),
        month.last_day(),
        up_to,
    );
    round2(post_tax * TITHE_RATE)
}

/// Steady-state monthly figure across `entities`, using the rate-divisor
/// approximations (this is where bimonthly entities participate, at 0.5x).
/// Suspended entities contribute nothing.
pub fn monthly_estimate_total(entities: &[RecurringEntity], as_of: NaiveDate) -> f64 {
    let total: f64 = entities
        .iter()
        .filter(|entity| !entity.is_suspended_at(as_of))
        .map(|entity| entity.frequency.monthly_estimate(entity.amount_at(as_of)))
        .sum();
    round2(total)
}

/// One category line of the budget report: the user's monthly goal against the
/// steady-state monthly estimate of the entities filed under that category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetLine {
    pub category: String,
    pub goal: f64,
    pub actual: f64,
}

impl BudgetLine {
    pub fn over_budget(&self) -> bool {
        self.actual > self.goal
    }
}

/// Compares per-category monthly estimates against the independently persisted
/// `{category -> monthly goal}` map. Categories with neither a goal nor any
/// entities are absent from the result.
pub fn budget_report(
    entities: &[RecurringEntity],
    goals: &BTreeMap<String, f64>,
    as_of: NaiveDate,
) -> Vec<BudgetLine> {
    let mut actuals: BTreeMap<String, f64> = BTreeMap::new();
    for entity in entities {
        let Some(category) = entity.category.as_deref() else {
            continue;
        };
        if entity.is_suspended_at(as_of) {
            continue;
        }
        *actuals.entry(category.to_string()).or_default() +=
            entity.frequency.monthly_estimate(entity.amount_at(as_of));
    }

    let mut categories: Vec<String> = goals.keys().cloned().collect();
    for category in actuals.keys() {
        if !goals.contains_key(category) {
            categories.push(category.clone());
        }
    }
    categories.sort();

    categories
        .into_iter()
        .map(|category| BudgetLine {
            goal: goals.get(&category).copied().unwrap_or(0.0),
            actual: round2(actuals.get(&category).copied().unwrap_or(0.0)),
            category,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;
    use crate::schedule::Frequency;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly_income(amount: f64, anchor: NaiveDate) -> RecurringEntity {
        RecurringEntity::new("Salary", EntityKind::Income, amount, Frequency::Monthly, anchor)
            .unwrap()
    }

    #[test]
    fn monthly_income_counts_once_per_month() {
        let incomes = vec![monthly_income(3000.0, d(2024, 1, 15))];
        let total = compute_monthly_total(&incomes, YearMonth::new(2024, 2), None);
        assert_eq!(total, 3000.0);
    }

    #[test]
    fn cutoff_excludes_not_yet_due_occurrences() {
        let incomes = vec![monthly_income(3000.0, d(2024, 1, 15))];
        let total =
            compute_monthly_total(&incomes, YearMonth::new(2024, 1), Some(d(2024, 1, 10)));
        assert_eq!(total, 0.0);

        let total_after =
            compute_monthly_total(&incomes, YearMonth::new(2024, 1), Some(d(2024, 1, 15)));
        assert_eq!(total_after, 3000.0);
    }

    #[test]
    fn suspended_occurrences_contribute_zero() {
        let mut income = monthly_income(3000.0, d(2024, 1, 15));
        income.suspend(d(2024, 2, 1), Some(d(2024, 2, 28)), false, "unpaid leave");
        let incomes = vec![income];

        assert_eq!(
            compute_monthly_total(&incomes, YearMonth::new(2024, 2), None),
            0.0
        );
        assert_eq!(
            compute_monthly_total(&incomes, YearMonth::new(2024, 3), None),
            3000.0
        );
    }

    #[test]
    fn twelve_month_series_ends_at_as_of() {
        let incomes = vec![monthly_income(1000.0, d(2023, 1, 1))];
        let series = compute_twelve_month_series(&incomes, YearMonth::new(2024, 6));

        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month, YearMonth::new(2023, 7));
        assert_eq!(series[11].month, YearMonth::new(2024, 6));
        assert!(series.iter().all(|entry| entry.total == 1000.0));
    }

    #[test]
    fn tithe_excludes_pre_tax_incomes() {
        let post_tax = monthly_income(2000.0, d(2024, 1, 1));
        let pre_tax = monthly_income(5000.0, d(2024, 1, 1)).with_pre_tax(true);
        let incomes = vec![post_tax, pre_tax];

        assert_eq!(
            tithe_recommendation(&incomes, YearMonth::new(2024, 2), None),
            200.0
        );
    }

    #[test]
    fn estimate_total_applies_rate_divisors() {
        let weekly =
            RecurringEntity::new("Groceries", EntityKind::Expense, 100.0, Frequency::Weekly, d(2024, 1, 1))
                .unwrap();
        let bimonthly =
            RecurringEntity::new("Water", EntityKind::Bill, 60.0, Frequency::Bimonthly, d(2024, 1, 1))
                .unwrap();
        let entities = vec![weekly, bimonthly];

        // 100 * 4.33 + 60 * 0.5
        assert_eq!(monthly_estimate_total(&entities, d(2024, 3, 1)), 463.0);
    }

    #[test]
    fn budget_report_flags_overruns() {
        let mut rent =
            RecurringEntity::new("Rent", EntityKind::Expense, 1200.0, Frequency::Monthly, d(2024, 1, 1))
                .unwrap();
        rent.category = Some("Housing".into());
        let mut coffee =
            RecurringEntity::new("Coffee", EntityKind::Expense, 30.0, Frequency::Weekly, d(2024, 1, 1))
                .unwrap();
        coffee.category = Some("Dining".into());

        let mut goals = BTreeMap::new();
        goals.insert("Housing".to_string(), 1500.0);
        goals.insert("Dining".to_string(), 100.0);

        let report = budget_report(&[rent, coffee], &goals, d(2024, 3, 1));
        assert_eq!(report.len(), 2);
        let dining = report.iter().find(|line| line.category == "Dining").unwrap();
        assert!(dining.over_budget(), "129.90 weekly estimate exceeds 100 goal");
        let housing = report.iter().find(|line| line.category == "Housing").unwrap();
        assert!(!housing.over_budget());
    }
}
