use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a property
pub type PropertyId = Uuid;

/// unique identifier for a rental (lease)
pub type RentalId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a stored or projected transaction
pub type TransactionId = Uuid;

/// declared transaction type
///
/// The persistence layer stores `type` as free text. Known spellings map onto a
/// closed variant; anything else is kept verbatim in `Other` so the sign
/// normalizer can fall back to the raw amount's sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionKind {
    Income,
    Rent,
    Rental,
    OtherIncome,
    Expense,
    Maintenance,
    Repair,
    Fees,
    Insurance,
    Tax,
    ManagementFee,
    Interest,
    Principal,
    Other(String),
}

impl TransactionKind {
    pub fn parse(label: &str) -> Self {
        let key = label.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "income" => TransactionKind::Income,
            "rent" => TransactionKind::Rent,
            "rental" => TransactionKind::Rental,
            "other_income" => TransactionKind::OtherIncome,
            "expense" => TransactionKind::Expense,
            "maintenance" => TransactionKind::Maintenance,
            "repair" => TransactionKind::Repair,
            "fees" => TransactionKind::Fees,
            "insurance" => TransactionKind::Insurance,
            "tax" => TransactionKind::Tax,
            "management_fee" => TransactionKind::ManagementFee,
            "interest" => TransactionKind::Interest,
            "principal" => TransactionKind::Principal,
            _ => TransactionKind::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Rent => "rent",
            TransactionKind::Rental => "rental",
            TransactionKind::OtherIncome => "other_income",
            TransactionKind::Expense => "expense",
            TransactionKind::Maintenance => "maintenance",
            TransactionKind::Repair => "repair",
            TransactionKind::Fees => "fees",
            TransactionKind::Insurance => "insurance",
            TransactionKind::Tax => "tax",
            TransactionKind::ManagementFee => "management_fee",
            TransactionKind::Interest => "interest",
            TransactionKind::Principal => "principal",
            TransactionKind::Other(label) => label,
        }
    }
}

impl From<String> for TransactionKind {
    fn from(label: String) -> Self {
        TransactionKind::parse(&label)
    }
}

impl From<&str> for TransactionKind {
    fn from(label: &str) -> Self {
        TransactionKind::parse(label)
    }
}

impl From<TransactionKind> for String {
    fn from(kind: TransactionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// profit/loss classification of a transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// counted as income, always positive
    Income,
    /// counted as expense, always negative
    Expense,
    /// real cash movement excluded from profit and loss
    Ignored,
    /// custom type, sign taken from the raw amount
    Unclassified,
}

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum LoanStatus {
    #[default]
    Active,
    PaidOff,
    Refinanced,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::PaidOff => "paid_off",
            LoanStatus::Refinanced => "refinanced",
        }
    }
}

impl From<String> for LoanStatus {
    fn from(label: String) -> Self {
        let key = label.trim().to_ascii_lowercase().replace([' ', '-', '_'], "");
        match key.as_str() {
            "paidoff" | "closed" | "repaid" => LoanStatus::PaidOff,
            "refinanced" => LoanStatus::Refinanced,
            _ => LoanStatus::Active,
        }
    }
}

impl From<LoanStatus> for String {
    fn from(status: LoanStatus) -> Self {
        status.as_str().to_string()
    }
}

/// how finely recurring streams are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// one entry per payment at the record's own frequency
    #[default]
    Native,
    /// one daily-equivalent entry per calendar day
    Daily,
}

/// ledger presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Daily,
}

/// column a ledger is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
    Category,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}
