use crate::decimal::Money;
use crate::records::Transaction;
use crate::types::{Classification, TransactionKind};

/// anything carrying a declared type and a raw amount
pub trait Signed {
    fn kind(&self) -> &TransactionKind;
    fn raw_amount(&self) -> Money;
}

impl Signed for Transaction {
    fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    fn raw_amount(&self) -> Money {
        self.amount
    }
}

pub fn classify(kind: &TransactionKind) -> Classification {
    use TransactionKind::*;

    match kind {
        Principal => Classification::Ignored,
        Income | Rent | Rental | OtherIncome => Classification::Income,
        Expense | Maintenance | Repair | Fees | Insurance | Tax | ManagementFee | Interest => {
            Classification::Expense
        }
        Other(_) => Classification::Unclassified,
    }
}

/// signed amount for a kind/amount pair
pub fn normalize(kind: &TransactionKind, amount: Money) -> Money {
    match classify(kind) {
        Classification::Ignored => Money::ZERO,
        Classification::Income => amount.abs(),
        Classification::Expense => Money::ZERO - amount.abs(),
        Classification::Unclassified => amount,
    }
}

/// signed value used for every total, precedence:
///
/// | tier | kinds | result |
/// |---|---|---|
/// | 1 | principal | 0 (excluded from profit and loss) |
/// | 2 | income, rent, rental, other_income | `+abs(amount)` |
/// | 3 | expense, maintenance, repair, fees, insurance, tax, management_fee, interest | `-abs(amount)` |
/// | 4 | anything else | raw amount's own sign |
pub fn signed_amount<T: Signed + ?Sized>(record: &T) -> Money {
    normalize(record.kind(), record.raw_amount())
}
