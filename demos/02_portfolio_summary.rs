/// portfolio summary - equity, debt and yield as of a controlled date
use property_ledger_rs::chrono::{TimeZone, Utc};
use property_ledger_rs::summary::PortfolioSummary;
use property_ledger_rs::{PortfolioSnapshot, SafeTimeProvider, TimeSource};

const RECORDS: &str = r#"{
    "properties": [
        {"id": "p-1", "name": "Harbour View", "purchasePrice": 720000, "currentValue": 815000,
         "acquisitionCosts": [{"name": "Stamp duty", "amount": 28500}, {"name": "Legal", "amount": 1900}]},
        {"id": "p-2", "name": "Mill Cottage", "purchasePrice": 340000}
    ],
    "rentals": [
        {"id": "r-1", "propertyId": "p-1", "amount": 780, "frequency": "weekly", "startDate": "2023-03-01"},
        {"id": "r-2", "propertyId": "p-2", "monthlyRent": 1650, "startDate": "2022-09-01"}
    ],
    "loans": [
        {"id": "l-1", "propertyId": "p-1", "originalAmount": 576000, "interestRate": 6.05, "regularPaymentAmount": 1610, "frequency": "fortnightly", "startDate": "2023-02-15", "loanTerm": 360},
        {"id": "l-2", "propertyId": "p-2", "originalAmount": 200000, "interestRate": 5.4, "monthlyPayment": 1400, "startDate": "2019-06-01", "status": "refinanced", "endDate": "2023-06-01"}
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    property_ledger_rs::logging::init_tracing();

    let snapshot = PortfolioSnapshot::from_json(RECORDS)?;
    let now = Utc
        .with_ymd_and_hms(2024, 7, 1, 0, 0, 0)
        .single()
        .ok_or("bad timestamp")?;
    let time = SafeTimeProvider::new(TimeSource::Test(now));

    let summary = PortfolioSummary::build_now(&snapshot, &time);
    for property in &summary.properties {
        println!(
            "{:<14} value {:>12}  debt {:>12}  equity {:>12}  yield {}",
            property.name,
            property.current_value.to_cents_string(),
            property.outstanding_debt.to_cents_string(),
            property.equity.to_cents_string(),
            property
                .gross_yield
                .map_or_else(|| "n/a".to_string(), |y| y.to_string()),
        );
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
