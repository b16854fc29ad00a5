use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::ledger::{sort_rows, DailyView, LedgerOutcome, LedgerQuery, ListView, Totals};
use crate::projection::{LedgerRow, LoanAmortizationProjector, RentalProjector};
use crate::records::{Loan, PortfolioSnapshot, Property};
use crate::types::{Granularity, ViewMode};

/// combines stored transactions with rental and loan projections for one query
///
/// Stateless between calls: every query re-projects only its own window and
/// never touches the snapshot, so concurrent callers can share one.
pub struct Reconciler {
    config: EngineConfig,
    rentals: RentalProjector,
    loans: LoanAmortizationProjector,
}

impl Reconciler {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rentals: RentalProjector::new(&config),
            loans: LoanAmortizationProjector::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rental_projector(&self) -> &RentalProjector {
        &self.rentals
    }

    pub fn loan_projector(&self) -> &LoanAmortizationProjector {
        &self.loans
    }

    /// stored rows, then rental rows, then loan rows, all inside the query window
    pub fn candidate_rows(
        &self,
        snapshot: &PortfolioSnapshot,
        query: &LedgerQuery,
        granularity: Granularity,
    ) -> Vec<LedgerRow> {
        let window = query.window;
        let mut rows: Vec<LedgerRow> = Vec::new();

        let mut undated = 0usize;
        for txn in &snapshot.transactions {
            match LedgerRow::from_transaction(txn) {
                Some(row) if window.contains(row.date) => rows.push(row),
                Some(_) => {}
                None => undated += 1,
            }
        }
        if undated > 0 {
            debug!(undated, "stored transactions without a usable date left out");
        }

        let in_scope: Vec<Property> = snapshot
            .properties
            .iter()
            .filter(|p| query.property_id.map_or(true, |id| id == p.id))
            .cloned()
            .collect();

        for property in &in_scope {
            rows.extend(self.rentals.project(property, &snapshot.rentals, window, granularity));
        }

        let loans: Vec<Loan> = snapshot
            .loans
            .iter()
            .filter(|l| query.property_id.map_or(true, |id| id == l.property_id))
            .cloned()
            .collect();
        rows.extend(self.loans.project(&loans, &in_scope, window));

        rows
    }

    /// run a ledger query
    pub fn reconcile(&self, snapshot: &PortfolioSnapshot, query: &LedgerQuery) -> LedgerOutcome {
        let granularity = match query.view {
            ViewMode::List => Granularity::Native,
            ViewMode::Daily => {
                let requested_days = query.window.day_count();
                let max_days = self.config.daily_view_max_days;
                if requested_days > i64::from(max_days) {
                    info!(requested_days, max_days, "daily view refused, range too large");
                    return LedgerOutcome::RangeTooLarge {
                        requested_days,
                        max_days,
                    };
                }
                Granularity::Daily
            }
        };

        let mut rows: Vec<LedgerRow> = self
            .candidate_rows(snapshot, query, granularity)
            .into_iter()
            .filter(|row| query.matches(row))
            .collect();
        sort_rows(&mut rows, query.sort_key, query.sort_direction);

        debug!(rows = rows.len(), view = ?query.view, "ledger reconciled");

        match query.view {
            ViewMode::List => LedgerOutcome::List(ListView {
                totals: Totals::from_rows(&rows),
                rows,
            }),
            ViewMode::Daily => LedgerOutcome::Daily(DailyView::from_rows(rows, query.sort_direction)),
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            rentals: RentalProjector::new(&config),
            loans: LoanAmortizationProjector::new(&config),
            config,
        }
    }
}
