use std::io;

use crate::errors::Result;
use crate::ledger::{DailyLedgerEntry, LedgerOutcome};
use crate::projection::LedgerRow;

pub const DAILY_HEADER: [&str; 5] = ["Date", "Income", "Expenses", "Net", "Details"];
pub const ROWS_HEADER: [&str; 6] = ["Date", "Type", "Category", "Description", "Amount", "Auto Generated"];

/// one record per day bucket, amounts at 2 dp
pub fn write_daily_csv<W: io::Write>(writer: W, entries: &[DailyLedgerEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(DAILY_HEADER)?;
    for entry in entries {
        wtr.write_record([
            entry.date.format("%Y-%m-%d").to_string(),
            entry.income.to_cents_string(),
            entry.expenses.to_cents_string(),
            entry.net.to_cents_string(),
            entry.details().join("; "),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// flat rows with their signed amount, so a spreadsheet sum matches the ledger total
pub fn write_rows_csv<'a, W: io::Write>(
    writer: W,
    rows: impl IntoIterator<Item = &'a LedgerRow>,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ROWS_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.kind.as_str().to_string(),
            row.category.clone(),
            row.description.clone(),
            row.signed_amount().to_cents_string(),
            if row.is_auto_generated { "yes" } else { "no" }.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// whichever view the outcome holds; a refused range writes only the header
pub fn write_outcome_csv<W: io::Write>(writer: W, outcome: &LedgerOutcome) -> Result<()> {
    match outcome {
        LedgerOutcome::Daily(view) => write_daily_csv(writer, &view.entries),
        LedgerOutcome::List(view) => write_rows_csv(writer, &view.rows),
        LedgerOutcome::RangeTooLarge { .. } => write_rows_csv(writer, std::iter::empty()),
    }
}
