pub mod daily;
pub mod reconcile;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::calendar::DateWindow;
use crate::decimal::Money;
use crate::projection::LedgerRow;
use crate::records::Transaction;
use crate::types::{PropertyId, SortDirection, SortKey, TransactionKind, ViewMode};

pub use daily::{group_by_day, DailyLedgerEntry, DailyView};
pub use reconcile::Reconciler;

/// type filter as offered to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    /// rows whose normalized amount is positive
    Income,
    /// rows whose normalized amount is negative
    Expense,
    /// rows declared with exactly this kind
    Kind(TransactionKind),
}

impl TypeFilter {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "income" => TypeFilter::Income,
            "expense" | "expenses" => TypeFilter::Expense,
            _ => TypeFilter::Kind(TransactionKind::parse(label)),
        }
    }

    pub fn matches(&self, row: &LedgerRow) -> bool {
        match self {
            TypeFilter::Income => row.signed_amount().is_positive(),
            TypeFilter::Expense => row.signed_amount().is_negative(),
            TypeFilter::Kind(kind) => &row.kind == kind,
        }
    }
}

/// one ledger request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerQuery {
    pub window: DateWindow,
    pub property_id: Option<PropertyId>,
    pub type_filter: Option<TypeFilter>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub view: ViewMode,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl LedgerQuery {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            property_id: None,
            type_filter: None,
            category: None,
            search: None,
            view: ViewMode::List,
            sort_key: SortKey::Date,
            sort_direction: SortDirection::Ascending,
        }
    }

    pub fn for_property(mut self, property_id: PropertyId) -> Self {
        self.property_id = Some(property_id);
        self
    }

    pub fn with_type(mut self, filter: TypeFilter) -> Self {
        self.type_filter = Some(filter);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn daily(mut self) -> Self {
        self.view = ViewMode::Daily;
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.sort_direction = direction;
        self
    }

    /// every filter except the window, which projection already honours
    pub fn matches(&self, row: &LedgerRow) -> bool {
        if !self.window.contains(row.date) {
            return false;
        }
        if self.property_id.is_some_and(|id| id != row.property_id) {
            return false;
        }
        if let Some(filter) = &self.type_filter {
            if !filter.matches(row) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !row.category.trim().eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let hit = row.description.to_lowercase().contains(&needle)
                || row.category.to_lowercase().contains(&needle)
                || row
                    .payee
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// stable sort; equal keys keep their input order in both directions
pub fn sort_rows(rows: &mut [LedgerRow], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &LedgerRow, b: &LedgerRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Amount => a.signed_amount().cmp(&b.signed_amount()),
        SortKey::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        SortKey::Description => a.description.to_lowercase().cmp(&b.description.to_lowercase()),
    }
}

/// income/expense totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub income: Money,
    /// positive magnitude of outgoings
    pub expense: Money,
    pub net: Money,
}

impl Totals {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a LedgerRow>) -> Self {
        let mut totals = Totals::default();
        for row in rows {
            totals.add_signed(row.signed_amount());
        }
        totals
    }

    pub(crate) fn add_signed(&mut self, signed: Money) {
        if signed.is_positive() {
            self.income += signed;
        } else if signed.is_negative() {
            self.expense += signed.abs();
        }
        self.net = self.income - self.expense;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListView {
    pub rows: Vec<LedgerRow>,
    pub totals: Totals,
}

/// result of a ledger request
///
/// Totals in either view are computed from exactly the rows it holds, through
/// [`crate::sign::signed_amount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum LedgerOutcome {
    List(ListView),
    Daily(DailyView),
    /// daily view refused; the caller should ask for a narrower range
    RangeTooLarge { requested_days: i64, max_days: u32 },
}

impl LedgerOutcome {
    pub fn totals(&self) -> Option<&Totals> {
        match self {
            LedgerOutcome::List(view) => Some(&view.totals),
            LedgerOutcome::Daily(view) => Some(&view.totals),
            LedgerOutcome::RangeTooLarge { .. } => None,
        }
    }

    /// every rendered row, in rendering order
    pub fn rows(&self) -> Vec<&LedgerRow> {
        match self {
            LedgerOutcome::List(view) => view.rows.iter().collect(),
            LedgerOutcome::Daily(view) => view
                .entries
                .iter()
                .flat_map(|entry| entry.transactions.iter())
                .collect(),
            LedgerOutcome::RangeTooLarge { .. } => Vec::new(),
        }
    }

    pub fn is_range_too_large(&self) -> bool {
        matches!(self, LedgerOutcome::RangeTooLarge { .. })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// stored transactions whose reminder falls inside `window`, soonest first
pub fn upcoming_reminders(transactions: &[Transaction], window: DateWindow) -> Vec<&Transaction> {
    let mut due: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.reminder_date.is_some_and(|d| window.contains(d)))
        .collect();
    due.sort_by_key(|t| t.reminder_date.unwrap_or(NaiveDate::MAX));
    due
}
