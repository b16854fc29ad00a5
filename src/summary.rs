use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::frequency::sanitize_amount;
use crate::projection::LoanAmortizationProjector;
use crate::records::{PortfolioSnapshot, Property};
use crate::types::PropertyId;

/// point-in-time figures for one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub property_id: PropertyId,
    pub name: String,
    /// purchase price plus acquisition costs
    pub cost_basis: Money,
    pub current_value: Money,
    pub outstanding_debt: Money,
    pub equity: Money,
    pub capital_growth: Money,
    /// gross rent per year of the leases active on the summary date
    pub annual_rent: Money,
    pub active_leases: usize,
    pub active_loans: usize,
    /// annual rent over current value; None when the property has no value
    pub gross_yield: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub as_of: NaiveDate,
    pub properties: Vec<PropertySummary>,
    pub total_cost_basis: Money,
    pub total_value: Money,
    pub total_debt: Money,
    pub total_equity: Money,
    pub total_capital_growth: Money,
    pub total_annual_rent: Money,
    pub gross_yield: Option<Rate>,
}

impl PortfolioSummary {
    pub fn build(snapshot: &PortfolioSnapshot, as_of: NaiveDate) -> Self {
        Self::build_with(snapshot, as_of, &EngineConfig::default())
    }

    pub fn build_with(snapshot: &PortfolioSnapshot, as_of: NaiveDate, config: &EngineConfig) -> Self {
        let loans = LoanAmortizationProjector::new(config);
        let properties: Vec<PropertySummary> = snapshot
            .properties
            .iter()
            .map(|property| summarize(snapshot, property, as_of, &loans))
            .collect();

        let total_cost_basis: Money = properties.iter().map(|p| p.cost_basis).sum();
        let total_value: Money = properties.iter().map(|p| p.current_value).sum();
        let total_debt: Money = properties.iter().map(|p| p.outstanding_debt).sum();
        let total_equity: Money = properties.iter().map(|p| p.equity).sum();
        let total_capital_growth: Money = properties.iter().map(|p| p.capital_growth).sum();
        let total_annual_rent: Money = properties.iter().map(|p| p.annual_rent).sum();

        debug!(%as_of, properties = properties.len(), "portfolio summary built");

        Self {
            as_of,
            gross_yield: gross_yield(total_annual_rent, total_value),
            properties,
            total_cost_basis,
            total_value,
            total_debt,
            total_equity,
            total_capital_growth,
            total_annual_rent,
        }
    }

    /// summary as of the provider's current date
    pub fn build_now(snapshot: &PortfolioSnapshot, time: &SafeTimeProvider) -> Self {
        Self::build(snapshot, time.now().date_naive())
    }

    pub fn property(&self, id: PropertyId) -> Option<&PropertySummary> {
        self.properties.iter().find(|p| p.property_id == id)
    }
}

fn summarize(
    snapshot: &PortfolioSnapshot,
    property: &Property,
    as_of: NaiveDate,
    loans: &LoanAmortizationProjector,
) -> PropertySummary {
    let cost_basis = property.cost_basis();
    let current_value = property.valuation();

    let mut active_loans = 0;
    let mut outstanding_debt = Money::ZERO;
    for loan in snapshot.loans_for(property.id) {
        let balance = loans.balance_as_of(loan, as_of);
        if balance.is_positive() {
            active_loans += 1;
            outstanding_debt += balance;
        }
    }

    let mut active_leases = 0;
    let mut annual_rent = Money::ZERO;
    for rental in snapshot.rentals_for(property.id).filter(|r| r.is_active_on(as_of)) {
        active_leases += 1;
        annual_rent += rental.frequency.annual_equivalent(sanitize_amount(rental.amount));
    }

    PropertySummary {
        property_id: property.id,
        name: property.name.clone(),
        cost_basis,
        current_value,
        outstanding_debt,
        equity: current_value - outstanding_debt,
        capital_growth: current_value - cost_basis,
        annual_rent,
        active_leases,
        active_loans,
        gross_yield: gross_yield(annual_rent, current_value),
    }
}

fn gross_yield(annual_rent: Money, value: Money) -> Option<Rate> {
    if value.is_zero() {
        return None;
    }
    Some(Rate::from_decimal(
        (annual_rent.as_decimal() / value.as_decimal()).round_dp(8),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use crate::records::{Loan, Rental};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot() -> PortfolioSnapshot {
        let house = Property::new("House", Money::from_major(480_000))
            .with_acquisition_cost("Stamp duty", Money::from_major(20_000))
            .with_current_value(Money::from_major(600_000));
        let lot = Property::new("Vacant lot", Money::from_major(50_000));

        let rentals = vec![
            Rental::new(house.id, Money::from_major(300), Frequency::Weekly, date(2023, 1, 1)),
            Rental::new(house.id, Money::from_major(400), Frequency::Weekly, date(2023, 6, 1)),
            Rental::new(house.id, Money::from_major(900), Frequency::Monthly, date(2022, 1, 1))
                .with_end_date(date(2023, 12, 31)),
        ];
        let loans = vec![Loan::new(
            house.id,
            Money::from_major(10_000),
            dec!(12),
            Money::from_major(1_000),
            Frequency::Monthly,
            date(2024, 1, 1),
        )];

        PortfolioSnapshot {
            properties: vec![house, lot],
            rentals,
            loans,
            transactions: Vec::new(),
        }
    }

    #[test]
    fn test_property_figures() {
        let snapshot = snapshot();
        let house_id = snapshot.properties[0].id;
        let summary = PortfolioSummary::build(&snapshot, date(2024, 2, 15));
        let house = summary.property(house_id).unwrap();

        assert_eq!(house.cost_basis, Money::from_major(500_000));
        assert_eq!(house.current_value, Money::from_major(600_000));
        assert_eq!(house.capital_growth, Money::from_major(100_000));
        // one payment on Feb 1: 100 interest, 900 principal
        assert_eq!(house.outstanding_debt, Money::from_major(9_100));
        assert_eq!(house.equity, Money::from_major(590_900));
        // expired monthly lease excluded; 700 a week is 100 a day
        assert_eq!(house.active_leases, 2);
        assert_eq!(house.annual_rent, Money::from_major(36_500));
        assert_eq!(house.gross_yield, Some(Rate::from_decimal(dec!(0.06083333))));
    }

    #[test]
    fn test_unvalued_property_has_no_yield() {
        let mut snapshot = snapshot();
        snapshot.properties[1].purchase_price = Money::ZERO;
        let lot_id = snapshot.properties[1].id;
        let summary = PortfolioSummary::build(&snapshot, date(2024, 2, 15));
        let lot = summary.property(lot_id).unwrap();
        assert_eq!(lot.gross_yield, None);
        assert_eq!(lot.annual_rent, Money::ZERO);
        assert_eq!(lot.outstanding_debt, Money::ZERO);
    }

    #[test]
    fn test_totals_sum_properties() {
        let summary = PortfolioSummary::build(&snapshot(), date(2024, 2, 15));
        assert_eq!(summary.total_value, Money::from_major(650_000));
        assert_eq!(summary.total_cost_basis, Money::from_major(550_000));
        assert_eq!(summary.total_debt, Money::from_major(9_100));
        assert_eq!(summary.total_equity, Money::from_major(640_900));
        assert_eq!(summary.total_capital_growth, Money::from_major(100_000));
        assert_eq!(summary.total_annual_rent, Money::from_major(36_500));
    }

    #[test]
    fn test_build_now_uses_injected_clock() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap(),
        ));
        let summary = PortfolioSummary::build_now(&snapshot(), &time);
        assert_eq!(summary.as_of, date(2024, 2, 15));
        assert_eq!(summary.total_debt, Money::from_major(9_100));
    }
}
