//! Frequency calendar: expands a (frequency, anchor date) pair into concrete
//! occurrence dates, and converts per-occurrence amounts into steady-state
//! monthly estimates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Hard cap on any date walk. Exceeding it is a defensive condition: the walk
/// is truncated and a warning logged rather than looping indefinitely.
pub const MAX_WALK_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    OneTime,
    Weekly,
    Biweekly,
    Monthly,
    /// Every other month. Carries no discrete occurrence semantics; it only
    /// participates in monthly estimates as a 0.5x rate divisor.
    Bimonthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Returns the occurrence following `from`, or `None` for kinds without a
    /// successor (`OneTime`, `Bimonthly`).
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::OneTime | Frequency::Bimonthly => None,
            Frequency::Weekly => Some(from + Duration::days(7)),
            Frequency::Biweekly => Some(from + Duration::days(14)),
            Frequency::Monthly => Some(shift_month(from, 1)),
            Frequency::Quarterly => Some(shift_month(from, 3)),
            Frequency::Yearly => Some(shift_month(from, 12)),
        }
    }

    /// Converts a per-occurrence amount to a steady-state monthly figure. The
    /// weekly and biweekly multipliers are deliberate approximations (4.33 is
    /// roughly 52/12) and are relied on by numeric-compatibility tests.
    pub fn monthly_estimate(&self, amount: f64) -> f64 {
        match self {
            Frequency::OneTime => 0.0,
            Frequency::Weekly => amount * 4.33,
            Frequency::Biweekly => amount * 2.17,
            Frequency::Monthly => amount,
            Frequency::Bimonthly => amount * 0.5,
            Frequency::Quarterly => amount / 3.0,
            Frequency::Yearly => amount / 12.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::OneTime => "One-time",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Biweekly",
            Frequency::Monthly => "Monthly",
            Frequency::Bimonthly => "Bimonthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }
}

/// All occurrences of `(anchor, frequency)` falling within `[start, end]`,
/// in ascending order. An anchor past the window end yields nothing. OneTime
/// yields the anchor itself iff it lies in the window. The walk is bounded by
/// [`MAX_WALK_STEPS`]; a truncated walk logs a warning and returns what was
/// accumulated so far.
pub fn occurrences_between(
    anchor: NaiveDate,
    frequency: Frequency,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    if anchor > end || start > end {
        return Vec::new();
    }
    match frequency {
        // No discrete occurrences; bimonthly entities only participate in
        // monthly estimates.
        Frequency::Bimonthly => return Vec::new(),
        Frequency::OneTime => {
            return if anchor >= start && anchor <= end {
                vec![anchor]
            } else {
                Vec::new()
            };
        }
        _ => {}
    }

    let mut result = Vec::new();
    let mut date = anchor;
    let mut guard = 0usize;
    while date <= end {
        if guard >= MAX_WALK_STEPS {
            tracing::warn!(
                %anchor,
                frequency = frequency.label(),
                "occurrence walk exceeded step cap; returning truncated result"
            );
            break;
        }
        if date >= start {
            result.push(date);
        }
        date = match frequency.next_occurrence(date) {
            Some(next) => next,
            None => break,
        };
        guard += 1;
    }
    result
}

/// A calendar month, the period key for price overrides, paid markers, and the
/// bill/subscription side of the sync journal. Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap())
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        NaiveDate::from_ymd_opt(self.year, self.month, days_in_month(self.year, self.month))
            .unwrap_or(first)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| format!("invalid period key `{value}`"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in period key `{value}`"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in period key `{value}`"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in period key `{value}`"));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    (first_next - Duration::days(1)).day()
}
