/// daily ledger - bucket a month by day, export it, and hit the range guard
use property_ledger_rs::chrono::NaiveDate;
use property_ledger_rs::{
    export, DateWindow, LedgerOutcome, LedgerQuery, PortfolioSnapshot, Reconciler,
};

const RECORDS: &str = r#"{
    "properties": [
        {"id": "prop-1", "address": "3/22 Bay St", "basePropertyCost": "610000"}
    ],
    "rentals": [
        {"id": "r-1", "propertyId": "prop-1", "tenantName": "Room A", "amount": 280, "frequency": "per week", "leaseStartDate": "2024-01-15"},
        {"id": "r-2", "propertyId": "prop-1", "tenantName": "Room B", "amount": "1,300", "frequency": "pcm", "leaseStartDate": "2024-02-01", "leaseEndDate": "2024-12-31"}
    ],
    "loans": [
        {"id": "l-1", "propertyId": "prop-1", "lender": "Coastal CU", "originalAmount": 450000, "interestRate": 5.9, "monthlyPayment": 2700, "startDate": "2023-11-20", "loanTerm": 360}
    ],
    "transactions": [
        {"id": "t-1", "propertyId": "prop-1", "type": "insurance", "category": "Insurance", "description": "Building cover", "amount": -1240, "date": "2024-04-03"},
        {"id": "t-2", "propertyId": "prop-1", "type": "principal", "category": "Loan", "description": "Lump sum", "amount": 5000, "date": "2024-04-10"}
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    property_ledger_rs::logging::init_tracing();

    let snapshot = PortfolioSnapshot::from_json(RECORDS)?;
    let reconciler = Reconciler::default();

    let april = DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 4, 1).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2024, 4, 30).ok_or("bad date")?,
    )?;
    let outcome = reconciler.reconcile(&snapshot, &LedgerQuery::new(april).daily());
    export::write_outcome_csv(std::io::stdout(), &outcome)?;

    let two_years = DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2025, 12, 31).ok_or("bad date")?,
    )?;
    if let LedgerOutcome::RangeTooLarge { requested_days, max_days } =
        reconciler.reconcile(&snapshot, &LedgerQuery::new(two_years).daily())
    {
        println!("daily view needs a narrower range: {requested_days} days requested, {max_days} allowed");
    }

    Ok(())
}
