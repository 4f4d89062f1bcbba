use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, SalesError};
use crate::models::{GroupAggregate, PeriodAggregate, Summary, Transaction};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Exact-match selector that can also mean "every value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn from_opt(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Self::Only(v.trim().to_string()),
            _ => Self::All,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(v) => v,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SalesError::InvalidFilter(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Build a range from optional user bounds. A missing end falls back to
    /// the table's own bounds; no bounds at all means no date predicate.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Option<Self>> {
        if from.is_none() && to.is_none() {
            return Ok(None);
        }
        let start = from
            .or(bounds.map(|(min, _)| min))
            .unwrap_or(NaiveDate::MIN);
        let end = to.or(bounds.map(|(_, max)| max)).unwrap_or(NaiveDate::MAX);
        Self::new(start, end).map(Some)
    }
}

/// Conjunction of the user-selected predicates. The default matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub date_range: Option<DateRange>,
    pub currency: Selection,
    pub salesperson: Selection,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_currency(mut self, currency: Selection) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn with_salesperson(mut self, salesperson: Selection) -> Self {
        self.salesperson = salesperson;
        self
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        self.date_range.map_or(true, |r| r.contains(t.date))
            && self.currency.matches(&t.currency)
            && self.salesperson.matches(&t.salesperson)
    }

    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.currency.is_all() && self.salesperson.is_all()
    }
}

// ---------------------------------------------------------------------------
// Grouping dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Client,
    Salesperson,
    Currency,
}

impl GroupKey {
    pub fn of<'a>(&self, t: &'a Transaction) -> &'a str {
        match self {
            Self::Client => &t.client,
            Self::Salesperson => &t.salesperson,
            Self::Currency => &t.currency,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Salesperson => "Salesperson",
            Self::Currency => "Currency",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Month,
    Semester,
    Year,
}

impl Period {
    /// Sortable bucket for a date: (year, index within year).
    fn bucket(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            Self::Month => (date.year(), date.month()),
            Self::Semester => (date.year(), if date.month() <= 6 { 1 } else { 2 }),
            Self::Year => (date.year(), 0),
        }
    }

    fn key(&self, (year, idx): (i32, u32)) -> String {
        match self {
            Self::Month => format!("{year:04}-{idx:02}"),
            Self::Semester => format!("{year:04}-S{idx}"),
            Self::Year => format!("{year:04}"),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Month => Self::Semester,
            Self::Semester => Self::Year,
            Self::Year => Self::Month,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Semester => "semester",
            Self::Year => "year",
        }
    }
}

impl FromStr for Period {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(Self::Month),
            "semester" | "half" => Ok(Self::Semester),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(SalesError::InvalidFilter(format!(
                "unknown period '{other}' (expected month, semester or year)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline operations
// ---------------------------------------------------------------------------

fn mean(total: f64, count: usize) -> f64 {
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}

/// Rows matching every predicate, in input order.
pub fn filter(table: &[Transaction], filters: &FilterSet) -> Vec<Transaction> {
    table.iter().filter(|t| filters.matches(t)).cloned().collect()
}

pub fn summarize(table: &[Transaction]) -> Summary {
    let total_value: f64 = table.iter().map(|t| t.amount_usd).sum();
    let count = table.len();
    let unique_clients = table
        .iter()
        .map(|t| t.client.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    Summary {
        total_value,
        count,
        mean_value: mean(total_value, count),
        unique_clients,
    }
}

/// Per-period totals in chronological order, with a running cumulative total.
pub fn group_by_period(table: &[Transaction], period: Period) -> Vec<PeriodAggregate> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for t in table {
        let entry = buckets.entry(period.bucket(t.date)).or_insert((0.0, 0));
        entry.0 += t.amount_usd;
        entry.1 += 1;
    }

    let mut running = 0.0f64;
    buckets
        .into_iter()
        .map(|(bucket, (total, count))| {
            running += total;
            PeriodAggregate {
                period: period.key(bucket),
                total_value: total,
                count,
                mean_value: mean(total, count),
                cumulative_value: running,
            }
        })
        .collect()
}

/// Every group for `key`, ordered by key.
pub fn group_by(table: &[Transaction], key: GroupKey) -> Vec<GroupAggregate> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for t in table {
        let entry = groups.entry(key.of(t)).or_insert((0.0, 0));
        entry.0 += t.amount_usd;
        entry.1 += 1;
    }

    let grand_total: f64 = groups.values().map(|(total, _)| total).sum();
    groups
        .into_iter()
        .map(|(k, (total, count))| GroupAggregate {
            key: k.to_string(),
            total_value: total,
            count,
            mean_value: mean(total, count),
            share_pct: if grand_total != 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// The `n` groups with the highest total value. Equal totals keep key order.
pub fn top_n_by_value(table: &[Transaction], n: usize, key: GroupKey) -> Vec<GroupAggregate> {
    let mut groups = group_by(table, key);
    groups.sort_by(|a, b| {
        b.total_value
            .total_cmp(&a.total_value)
            .then_with(|| a.key.cmp(&b.key))
    });
    groups.truncate(n);
    groups
}

/// Sorted distinct values of a dimension; the choices offered besides "all".
pub fn distinct_values(table: &[Transaction], key: GroupKey) -> Vec<String> {
    table
        .iter()
        .map(|t| key.of(t))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn date_bounds(table: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let min = table.iter().map(|t| t.date).min()?;
    let max = table.iter().map(|t| t.date).max()?;
    Some((min, max))
}

/// One client's purchases ordered by date.
pub fn client_timeline(table: &[Transaction], client: &str) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = table.iter().filter(|t| t.client == client).cloned().collect();
    rows.sort_by_key(|t| t.date);
    rows
}

// ---------------------------------------------------------------------------
// Consistency notes
// ---------------------------------------------------------------------------

/// Pre-aggregated tables that are shown next to filtered data but are not
/// themselves filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreAggregated {
    Salespeople,
    Semesters,
}

/// Informational notes for a pre-aggregated table under the active filters.
/// The tables are left as-is; the notes only tell the reader what is ignored.
pub fn consistency_notes(filters: &FilterSet, table: PreAggregated) -> Vec<&'static str> {
    let mut notes = Vec::new();
    match table {
        PreAggregated::Salespeople => {
            if !filters.currency.is_all() {
                notes.push(
                    "Note: the salesperson table shows USD-converted values regardless of the currency filter.",
                );
            }
        }
        PreAggregated::Semesters => {
            if !filters.currency.is_all() {
                notes.push(
                    "Note: the semester comparison shows USD-converted values regardless of the currency filter.",
                );
            }
            if !filters.salesperson.is_all() {
                notes.push(
                    "Note: the semester comparison includes every salesperson for the top clients.",
                );
            }
        }
    }
    notes
}
