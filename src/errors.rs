use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange {
        from: NaiveDate,
        to: NaiveDate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("csv export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
