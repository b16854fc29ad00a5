pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod export;
pub mod frequency;
pub mod ledger;
pub mod logging;
pub mod projection;
pub mod records;
pub mod sign;
pub mod summary;
pub mod types;

// re-export key types
pub use calendar::DateWindow;
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use frequency::{Frequency, NormalizedAmount};
pub use ledger::{
    DailyLedgerEntry, DailyView, LedgerOutcome, LedgerQuery, ListView, Reconciler, Totals,
    TypeFilter,
};
pub use projection::{LedgerRow, LoanAmortizationProjector, RentalProjector, ScheduledPayment};
pub use records::{AcquisitionCost, Loan, PortfolioSnapshot, Property, Rental, Transaction};
pub use summary::{PortfolioSummary, PropertySummary};
pub use types::{
    Classification, Granularity, LoanId, LoanStatus, PropertyId, RentalId, SortDirection,
    SortKey, TransactionId, TransactionKind, ViewMode,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
