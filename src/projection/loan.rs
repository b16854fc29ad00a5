use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::DateWindow;
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::frequency::sanitize_amount;
use crate::projection::{synthetic_id, Leg, LedgerRow};
use crate::records::{Loan, Property};
use crate::types::{LoanStatus, TransactionKind};

pub const INTEREST_CATEGORY: &str = "Loan Interest";
pub const PRINCIPAL_CATEGORY: &str = "Loan Principal";
pub const LOAN_FEE_CATEGORY: &str = "Loan Fees";

/// one payment period of a loan walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub beginning_balance: Money,
    /// interest + principal + fee for the period
    pub payment_amount: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub fee_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// walks loans from their true start and emits interest/principal/fee rows
///
/// The running balance has no closed form that survives inconsistent records,
/// so every projection replays the loan from `start_date` even when only a
/// late window is requested. Payments fall due one period after the anchor.
pub struct LoanAmortizationProjector {
    open_ended_sentinel: NaiveDate,
    balance_epsilon: Money,
    max_periods: u32,
}

impl LoanAmortizationProjector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            open_ended_sentinel: config.open_ended_sentinel,
            balance_epsilon: config.balance_epsilon,
            max_periods: config.max_schedule_periods,
        }
    }

    /// last date the loan can produce payments, None when it should not project at all
    fn schedule_end(&self, loan: &Loan) -> Option<NaiveDate> {
        match loan.status {
            LoanStatus::Active => Some(loan.effective_end().unwrap_or(self.open_ended_sentinel)),
            LoanStatus::PaidOff | LoanStatus::Refinanced => {
                let end = loan.effective_end();
                if end.is_none() {
                    debug!(loan_id = %loan.id, status = loan.status.as_str(), "closed loan without end date, not projected");
                }
                end
            }
        }
    }

    /// every payment from the loan's start through `until`
    pub fn schedule(&self, loan: &Loan, until: NaiveDate) -> Vec<ScheduledPayment> {
        let Some(start) = loan.start_date else {
            warn!(loan_id = %loan.id, "loan has no usable start date, skipping");
            return Vec::new();
        };
        let Some(end) = self.schedule_end(loan) else {
            return Vec::new();
        };
        let horizon = end.min(until);
        if horizon < start {
            return Vec::new();
        }

        let periodic_rate = loan.frequency.periodic_rate(loan.annual_rate());
        let payment = sanitize_amount(loan.payment_amount);
        let fee = loan
            .fee_amount
            .map(sanitize_amount)
            .unwrap_or(Money::ZERO);

        let mut payments = Vec::new();
        let mut balance = sanitize_amount(loan.original_amount);
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_principal = Money::ZERO;

        for n in 1..=self.max_periods {
            if balance <= self.balance_epsilon {
                break;
            }
            let Some(payment_date) = loan.frequency.occurrence(start, n) else {
                break;
            };
            if payment_date > horizon {
                break;
            }

            let interest_portion = balance.apply_rate(periodic_rate);
            // a payment below the interest due amortizes nothing
            let mut principal_portion = (payment - interest_portion).max(Money::ZERO).min(balance);
            let mut ending_balance = balance - principal_portion;
            if ending_balance <= self.balance_epsilon {
                principal_portion += ending_balance;
                ending_balance = Money::ZERO;
            }

            cumulative_interest += interest_portion;
            cumulative_principal += principal_portion;

            payments.push(ScheduledPayment {
                payment_number: n,
                payment_date,
                beginning_balance: balance,
                payment_amount: interest_portion + principal_portion + fee,
                interest_portion,
                principal_portion,
                fee_portion: fee,
                ending_balance,
                cumulative_interest,
                cumulative_principal,
            });

            balance = ending_balance;

            if n == self.max_periods {
                warn!(loan_id = %loan.id, periods = n, "loan walk hit the period limit");
            }
        }

        payments
    }

    /// running balance after every payment due on or before `date`
    pub fn balance_as_of(&self, loan: &Loan, date: NaiveDate) -> Money {
        if loan.status != LoanStatus::Active
            && loan.effective_end().map_or(true, |end| end <= date)
        {
            return Money::ZERO;
        }
        let Some(start) = loan.start_date else {
            return loan.current_balance.unwrap_or(loan.original_amount);
        };
        if date < start {
            return Money::ZERO;
        }
        self.schedule(loan, date)
            .last()
            .map_or(sanitize_amount(loan.original_amount), |p| p.ending_balance)
    }

    /// rows for every loan secured on one of `properties`, ordered by date
    pub fn project(&self, loans: &[Loan], properties: &[Property], window: DateWindow) -> Vec<LedgerRow> {
        let mut rows = Vec::new();
        for loan in loans {
            if !properties.iter().any(|p| p.id == loan.property_id) {
                warn!(loan_id = %loan.id, property_id = %loan.property_id, "loan references an unknown property, skipping");
                continue;
            }
            rows.extend(self.project_loan(loan, window));
        }
        rows.sort_by_key(|row| row.date);
        rows
    }

    /// rows for one loan, clipped to `[max(start, from), min(end, to)]`
    pub fn project_loan(&self, loan: &Loan, window: DateWindow) -> Vec<LedgerRow> {
        let mut rows = Vec::new();
        for payment in self.schedule(loan, window.to()) {
            if payment.payment_date < window.from() {
                continue;
            }
            let date = payment.payment_date;
            let legs = [
                (Leg::Interest, TransactionKind::Interest, INTEREST_CATEGORY, payment.interest_portion),
                (Leg::Principal, TransactionKind::Principal, PRINCIPAL_CATEGORY, payment.principal_portion),
                (Leg::LoanFee, TransactionKind::Fees, LOAN_FEE_CATEGORY, payment.fee_portion),
            ];
            for (leg, kind, category, amount) in legs {
                if !amount.is_positive() {
                    continue;
                }
                rows.push(LedgerRow {
                    id: synthetic_id(loan.id, leg, date),
                    property_id: loan.property_id,
                    kind,
                    category: category.to_string(),
                    description: describe(loan, category, payment.payment_number),
                    date,
                    amount,
                    payee: (!loan.lender.is_empty()).then(|| loan.lender.clone()),
                    reminder_date: None,
                    is_auto_generated: true,
                    source_id: Some(loan.id),
                    original_amount: Some(loan.payment_amount),
                    original_frequency: Some(loan.frequency),
                    daily_equivalent: None,
                });
            }
        }
        rows
    }
}

fn describe(loan: &Loan, category: &str, payment_number: u32) -> String {
    if loan.lender.is_empty() {
        format!("{category} #{payment_number}")
    } else {
        format!("{category} #{payment_number} ({})", loan.lender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use crate::sign::signed_amount;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn projector() -> LoanAmortizationProjector {
        LoanAmortizationProjector::new(&EngineConfig::default())
    }

    fn loan_for(property: &Property) -> Loan {
        // 12% annual, monthly: 1% per period
        Loan::new(
            property.id,
            Money::from_major(10_000),
            dec!(12),
            Money::from_major(1_000),
            Frequency::Monthly,
            date(2024, 1, 1),
        )
    }

    #[test]
    fn test_first_period_split() {
        let property = Property::new("House", Money::from_major(1));
        let schedule = projector().schedule(&loan_for(&property), date(2024, 2, 1));

        assert_eq!(schedule.len(), 1);
        let first = &schedule[0];
        assert_eq!(first.payment_date, date(2024, 2, 1));
        assert_eq!(first.interest_portion, Money::from_major(100));
        assert_eq!(first.principal_portion, Money::from_major(900));
        assert_eq!(first.ending_balance, Money::from_major(9_100));
    }

    #[test]
    fn test_balance_monotonic_and_fully_amortized() {
        let property = Property::new("House", Money::from_major(1));
        let schedule = projector().schedule(&loan_for(&property), date(2030, 1, 1));

        assert_eq!(schedule.len(), 11);
        for pair in schedule.windows(2) {
            assert!(pair[1].ending_balance <= pair[0].ending_balance);
            assert_eq!(pair[1].beginning_balance, pair[0].ending_balance);
        }
        let last = schedule.last().unwrap();
        assert_eq!(last.ending_balance, Money::ZERO);
        assert_eq!(last.cumulative_principal, Money::from_major(10_000));
        assert!(last.principal_portion < Money::from_major(1_000));
    }

    #[test]
    fn test_negative_amortization_keeps_balance() {
        let property = Property::new("House", Money::from_major(1));
        let loan = Loan::new(
            property.id,
            Money::from_major(10_000),
            dec!(12),
            Money::from_major(50),
            Frequency::Monthly,
            date(2024, 1, 1),
        );
        let schedule = projector().schedule(&loan, date(2024, 6, 30));

        assert_eq!(schedule.len(), 5);
        assert!(schedule.iter().all(|p| p.principal_portion == Money::ZERO));
        assert!(schedule.iter().all(|p| p.ending_balance == Money::from_major(10_000)));
        assert!(schedule.iter().all(|p| p.interest_portion == Money::from_major(100)));
    }

    #[test]
    fn test_late_window_replays_from_start() {
        let property = Property::new("House", Money::from_major(1));
        let loan = loan_for(&property);
        let window = DateWindow::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();

        let rows = projector().project_loan(&loan, window);
        let full = projector().schedule(&loan, date(2024, 6, 30));
        let june = full.iter().find(|p| p.payment_date == date(2024, 6, 1)).unwrap();

        let interest = rows.iter().find(|r| r.kind == TransactionKind::Interest).unwrap();
        assert_eq!(interest.amount, june.interest_portion);
        assert!(interest.amount < Money::from_major(100));
        assert!(rows.iter().all(|r| window.contains(r.date)));
    }

    #[test]
    fn test_principal_rows_do_not_count() {
        let property = Property::new("House", Money::from_major(1));
        let loan = loan_for(&property).with_fee(Money::from_major(10)).with_lender("Big Bank");
        // payments fall due on Feb 1, Mar 1 and Apr 1
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 4, 30)).unwrap();
        let rows = projector().project(&[loan], &[property], window);

        let principal: Vec<_> = rows.iter().filter(|r| r.kind == TransactionKind::Principal).collect();
        assert_eq!(principal.len(), 3);
        assert!(principal.iter().all(|r| signed_amount(*r) == Money::ZERO));

        let fees: Vec<_> = rows.iter().filter(|r| r.kind == TransactionKind::Fees).collect();
        assert_eq!(fees.len(), 3);
        assert!(fees.iter().all(|r| signed_amount(*r) == Money::from_major(-10)));
        assert!(rows.iter().all(|r| r.payee.as_deref() == Some("Big Bank")));
    }

    #[test]
    fn test_window_before_start_is_empty() {
        let property = Property::new("House", Money::from_major(1));
        let window = DateWindow::new(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
        assert!(projector().project_loan(&loan_for(&property), window).is_empty());
    }

    #[test]
    fn test_term_and_status_bound_projection() {
        let property = Property::new("House", Money::from_major(1));
        let interest_only = Loan::new(
            property.id,
            Money::from_major(100_000),
            dec!(6),
            Money::from_major(500),
            Frequency::Monthly,
            date(2024, 1, 1),
        );
        let window = DateWindow::new(date(2024, 1, 1), date(2026, 12, 31)).unwrap();

        let termed = interest_only.clone().with_term_months(6);
        assert_eq!(projector().schedule(&termed, window.to()).len(), 6);

        let paid_off = interest_only.clone().with_status(LoanStatus::PaidOff);
        assert!(projector().project_loan(&paid_off, window).is_empty());

        let refinanced = interest_only
            .with_status(LoanStatus::Refinanced)
            .with_end_date(date(2024, 4, 15));
        let dates: Vec<_> = projector()
            .project_loan(&refinanced, window)
            .iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)]);
    }

    #[test]
    fn test_orphan_loans_are_skipped() {
        let property = Property::new("House", Money::from_major(1));
        let stranger = Property::new("Elsewhere", Money::from_major(1));
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert!(projector().project(&[loan_for(&stranger)], &[property], window).is_empty());
    }

    #[test]
    fn test_balance_as_of() {
        let property = Property::new("House", Money::from_major(1));
        let loan = loan_for(&property);
        assert_eq!(projector().balance_as_of(&loan, date(2023, 12, 31)), Money::ZERO);
        assert_eq!(projector().balance_as_of(&loan, date(2024, 1, 15)), Money::from_major(10_000));
        assert_eq!(projector().balance_as_of(&loan, date(2024, 2, 1)), Money::from_major(9_100));
        assert_eq!(projector().balance_as_of(&loan, date(2026, 1, 1)), Money::ZERO);
        let closed = loan.with_status(LoanStatus::PaidOff).with_end_date(date(2024, 3, 1));
        assert_eq!(projector().balance_as_of(&closed, date(2024, 6, 1)), Money::ZERO);
    }

    #[test]
    fn test_zero_rate_loan_is_pure_principal() {
        let property = Property::new("House", Money::from_major(1));
        let loan = Loan::new(
            property.id,
            Money::from_major(1_200),
            dec!(0),
            Money::from_major(100),
            Frequency::Weekly,
            date(2024, 1, 1),
        );
        let schedule = projector().schedule(&loan, date(2030, 1, 1));
        assert_eq!(schedule.len(), 12);
        assert!(schedule.iter().all(|p| p.interest_portion == Money::ZERO));
        assert_eq!(schedule[0].payment_date, date(2024, 1, 8));
    }
}
