use chrono::{Datelike, Duration, Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// inclusive date range a ledger query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Deserialize)]
struct RawWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawWindow> for DateWindow {
    type Error = LedgerError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        DateWindow::new(raw.from, raw.to)
    }
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if to < from {
            return Err(LedgerError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// single-day window
    pub fn day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// first of the current month through today
    pub fn month_to_date(time: &SafeTimeProvider) -> Self {
        let today = time.now().date_naive();
        let first = today.with_day(1).unwrap_or(today);
        Self { from: first, to: today }
    }

    /// the last `days` days ending today, inclusive
    pub fn trailing_days(days: u32, time: &SafeTimeProvider) -> Self {
        let today = time.now().date_naive();
        let span = i64::from(days.max(1)) - 1;
        Self {
            from: today
                .checked_sub_signed(Duration::days(span))
                .unwrap_or(NaiveDate::MIN),
            to: today,
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// number of calendar days covered, both ends included
    pub fn day_count(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    /// overlap with `[start, end]`, or None when they do not meet
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> Option<DateWindow> {
        let from = self.from.max(start);
        let to = self.to.min(end);
        if from > to {
            None
        } else {
            Some(DateWindow { from, to })
        }
    }

    /// every date in the window in ascending order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}

/// add calendar months, clamping to the last day of a shorter month
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}
