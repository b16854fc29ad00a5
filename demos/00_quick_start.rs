/// quick start - project one lease and one loan into a month of ledger rows
use property_ledger_rs::chrono::NaiveDate;
use property_ledger_rs::{
    DateWindow, Frequency, LedgerQuery, Loan, Money, PortfolioSnapshot, Property, Reconciler,
    Rental, Transaction,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    property_ledger_rs::logging::init_tracing();

    let house = Property::new("14 Wattle Rd", Money::from_major(520_000));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;

    let snapshot = PortfolioSnapshot {
        rentals: vec![Rental::new(house.id, Money::from_major(650), Frequency::Weekly, start)
            .with_tenant("J. Moreau")
            .with_management_fee(dec!(7))],
        loans: vec![Loan::new(
            house.id,
            Money::from_major(400_000),
            dec!(6.2),
            Money::from_major(2_450),
            Frequency::Monthly,
            start,
        )
        .with_lender("Harbour Bank")],
        transactions: vec![Transaction::new(
            house.id,
            "repair",
            Money::from_major(180),
            NaiveDate::from_ymd_opt(2024, 3, 12).ok_or("bad date")?,
        )
        .with_description("Replace smoke alarm")],
        properties: vec![house],
    };

    let march = DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2024, 3, 31).ok_or("bad date")?,
    )?;

    let reconciler = Reconciler::default();
    let outcome = reconciler.reconcile(&snapshot, &LedgerQuery::new(march));

    for row in outcome.rows() {
        println!("{}  {:<40} {:>12}", row.date, row.description, row.signed_amount().to_cents_string());
    }
    if let Some(totals) = outcome.totals() {
        println!(
            "income {}  expenses {}  net {}",
            totals.income.to_cents_string(),
            totals.expense.to_cents_string(),
            totals.net.to_cents_string()
        );
    }

    Ok(())
}
