use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::SortDirection;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// widest window (inclusive days) the daily view will expand
    pub daily_view_max_days: u32,
    /// end date assumed for leases and loans without one
    pub open_ended_sentinel: NaiveDate,
    /// running loan balance at or below this counts as repaid
    pub balance_epsilon: Money,
    /// upper bound on payments walked for a single loan
    pub max_schedule_periods: u32,
    pub default_sort: SortDirection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_view_max_days: 400,
            open_ended_sentinel: NaiveDate::from_ymd_opt(2999, 12, 31).unwrap_or(NaiveDate::MAX),
            balance_epsilon: Money::from_decimal(dec!(0.005)),
            max_schedule_periods: 36_600,
            default_sort: SortDirection::Ascending,
        }
    }
}

impl EngineConfig {
    /// tighter daily cap for constrained consumers (e.g. embedded dashboards)
    pub fn conservative() -> Self {
        Self {
            daily_view_max_days: 180,
            ..Self::default()
        }
    }

    pub fn with_daily_view_max_days(mut self, days: u32) -> Self {
        self.daily_view_max_days = days;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.daily_view_max_days == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "daily_view_max_days must be at least 1".to_string(),
            });
        }
        if self.max_schedule_periods == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "max_schedule_periods must be at least 1".to_string(),
            });
        }
        if self.balance_epsilon.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: "balance_epsilon cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}
