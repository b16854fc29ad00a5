use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::ledger::Totals;
use crate::projection::LedgerRow;
use crate::types::SortDirection;

/// one date's aggregated cash flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLedgerEntry {
    pub date: NaiveDate,
    pub income: Money,
    /// positive magnitude of the day's outgoings
    pub expenses: Money,
    pub net: Money,
    pub transactions: Vec<LedgerRow>,
}

impl DailyLedgerEntry {
    fn new(date: NaiveDate, transactions: Vec<LedgerRow>) -> Self {
        let totals = Totals::from_rows(&transactions);
        Self {
            date,
            income: totals.income,
            expenses: totals.expense,
            net: totals.net,
            transactions,
        }
    }

    /// row descriptions in bucket order
    pub fn details(&self) -> Vec<&str> {
        self.transactions
            .iter()
            .map(|row| {
                if row.description.is_empty() {
                    row.category.as_str()
                } else {
                    row.description.as_str()
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyView {
    pub entries: Vec<DailyLedgerEntry>,
    pub totals: Totals,
}

impl DailyView {
    /// bucket already-filtered rows; totals come from the buckets themselves
    pub fn from_rows(rows: Vec<LedgerRow>, direction: SortDirection) -> Self {
        let entries = group_by_day(rows, direction);
        let mut totals = Totals::default();
        for entry in &entries {
            totals.income += entry.income;
            totals.expense += entry.expenses;
        }
        totals.net = totals.income - totals.expense;
        Self { entries, totals }
    }
}

/// one entry per date present in `rows`; rows keep their relative order inside a bucket
pub fn group_by_day(rows: Vec<LedgerRow>, direction: SortDirection) -> Vec<DailyLedgerEntry> {
    let mut buckets: BTreeMap<NaiveDate, Vec<LedgerRow>> = BTreeMap::new();
    for row in rows {
        buckets.entry(row.date).or_default().push(row);
    }
    let entries = buckets
        .into_iter()
        .map(|(date, transactions)| DailyLedgerEntry::new(date, transactions));
    match direction {
        SortDirection::Ascending => entries.collect(),
        SortDirection::Descending => entries.rev().collect(),
    }
}
