use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calendar::DateWindow;
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::frequency;
use crate::projection::{synthetic_id, Leg, LedgerRow};
use crate::records::{Property, Rental};
use crate::types::{Granularity, TransactionKind};

pub const RENT_CATEGORY: &str = "Rent";
pub const MANAGEMENT_FEE_CATEGORY: &str = "Management Fee";

/// expands leases into income rows (and management-fee expense rows)
pub struct RentalProjector {
    open_ended_sentinel: NaiveDate,
}

impl RentalProjector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            open_ended_sentinel: config.open_ended_sentinel,
        }
    }

    /// project every lease of `property` into `window`, ordered by date
    ///
    /// Concurrent leases each keep their own rows; nothing is summed here.
    pub fn project(
        &self,
        property: &Property,
        rentals: &[Rental],
        window: DateWindow,
        granularity: Granularity,
    ) -> Vec<LedgerRow> {
        let mut rows: Vec<LedgerRow> = rentals
            .iter()
            .filter(|rental| rental.property_id == property.id)
            .flat_map(|rental| self.project_rental(rental, window, granularity))
            .collect();
        rows.sort_by_key(|row| row.date);
        rows
    }

    /// project a single lease, clipped to `[max(start, from), min(end, to)]`
    ///
    /// Native rows fall on the lease's due dates (`start + n periods`), so the
    /// income of a lease over a period does not depend on how that period is split
    /// into queries.
    pub fn project_rental(
        &self,
        rental: &Rental,
        window: DateWindow,
        granularity: Granularity,
    ) -> Vec<LedgerRow> {
        let Some(start) = rental.start_date else {
            warn!(rental_id = %rental.id, "rental has no usable start date, skipping");
            return Vec::new();
        };
        let end = rental.end_date.unwrap_or(self.open_ended_sentinel);
        if end < start {
            debug!(rental_id = %rental.id, %start, %end, "lease ends before it starts");
            return Vec::new();
        }
        let Some(active) = window.clip(start, end) else {
            return Vec::new();
        };

        let normalized = frequency::normalize_with(rental.frequency, rental.amount);
        if normalized.amount.is_zero() {
            debug!(rental_id = %rental.id, "zero rent, nothing to project");
            return Vec::new();
        }
        let fee_percentage = fee_percentage(rental);

        let mut rows = Vec::new();
        match granularity {
            Granularity::Native => {
                // due dates stay on the lease's own schedule whatever the window
                let Some(mut n) = rental.frequency.first_index_on_or_after(start, active.from()) else {
                    return rows;
                };
                while let Some(date) = rental.frequency.occurrence(start, n) {
                    if date > active.to() {
                        break;
                    }
                    self.push_legs(&mut rows, rental, date, normalized.amount, None, fee_percentage);
                    let Some(next) = n.checked_add(1) else {
                        break;
                    };
                    n = next;
                }
            }
            Granularity::Daily => {
                for date in active.days() {
                    self.push_legs(
                        &mut rows,
                        rental,
                        date,
                        normalized.daily_amount,
                        Some(normalized.daily_amount),
                        fee_percentage,
                    );
                }
            }
        }
        rows
    }

    fn push_legs(
        &self,
        rows: &mut Vec<LedgerRow>,
        rental: &Rental,
        date: NaiveDate,
        amount: Money,
        daily_equivalent: Option<Money>,
        fee_percentage: Option<Decimal>,
    ) {
        let label = lease_label(rental);
        rows.push(LedgerRow {
            id: synthetic_id(rental.id, Leg::Rent, date),
            property_id: rental.property_id,
            kind: TransactionKind::Income,
            category: RENT_CATEGORY.to_string(),
            description: format!("Rent: {label}"),
            date,
            amount,
            payee: None,
            reminder_date: None,
            is_auto_generated: true,
            source_id: Some(rental.id),
            original_amount: Some(rental.amount),
            original_frequency: Some(rental.frequency),
            daily_equivalent,
        });

        if let Some(percentage) = fee_percentage {
            let fee = amount.percentage(percentage);
            rows.push(LedgerRow {
                id: synthetic_id(rental.id, Leg::ManagementFee, date),
                property_id: rental.property_id,
                kind: TransactionKind::Expense,
                category: MANAGEMENT_FEE_CATEGORY.to_string(),
                description: format!("Management fee ({percentage}%): {label}"),
                date,
                amount: fee,
                payee: None,
                reminder_date: None,
                is_auto_generated: true,
                source_id: Some(rental.id),
                original_amount: Some(rental.amount.percentage(percentage)),
                original_frequency: Some(rental.frequency),
                daily_equivalent: daily_equivalent.map(|daily| daily.percentage(percentage)),
            });
        }
    }
}

fn fee_percentage(rental: &Rental) -> Option<Decimal> {
    match rental.management_fee_percentage {
        Some(p) if p > Decimal::ZERO => Some(p),
        Some(p) if p < Decimal::ZERO => {
            warn!(rental_id = %rental.id, percentage = %p, "negative management fee ignored");
            None
        }
        _ => None,
    }
}

fn lease_label(rental: &Rental) -> String {
    let tenant = if rental.tenant_name.trim().is_empty() {
        "Tenant"
    } else {
        rental.tenant_name.trim()
    };
    match rental.room.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(room) => format!("{tenant} ({room})"),
        None => tenant.to_string(),
    }
}
