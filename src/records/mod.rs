pub mod lenient;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::frequency::Frequency;
use crate::types::{LoanId, LoanStatus, PropertyId, RentalId, TransactionId, TransactionKind};

/// one line of purchase-time cost (stamp duty, legal fees, inspections, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionCost {
    #[serde(default, alias = "name", deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::money")]
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(deserialize_with = "lenient::id")]
    pub id: PropertyId,
    #[serde(default, alias = "address", deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, alias = "basePropertyCost", deserialize_with = "lenient::money")]
    pub purchase_price: Money,
    #[serde(default, deserialize_with = "lenient::optional_money")]
    pub current_value: Option<Money>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub acquisition_costs: Vec<AcquisitionCost>,
}

impl Property {
    pub fn new(name: impl Into<String>, purchase_price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            purchase_price,
            current_value: None,
            purchase_date: None,
            acquisition_costs: Vec::new(),
        }
    }

    pub fn with_current_value(mut self, value: Money) -> Self {
        self.current_value = Some(value);
        self
    }

    pub fn with_purchase_date(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn with_acquisition_cost(mut self, description: impl Into<String>, amount: Money) -> Self {
        self.acquisition_costs.push(AcquisitionCost {
            description: description.into(),
            amount,
        });
        self
    }

    /// purchase price plus every acquisition cost line
    pub fn cost_basis(&self) -> Money {
        self.purchase_price + self.acquisition_costs.iter().map(|c| c.amount).sum::<Money>()
    }

    /// current value, or the cost basis when no valuation exists yet
    pub fn valuation(&self) -> Money {
        self.current_value.unwrap_or_else(|| self.cost_basis())
    }
}

/// rental lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RentalRecord")]
pub struct Rental {
    pub id: RentalId,
    pub property_id: PropertyId,
    pub tenant_name: String,
    pub amount: Money,
    pub frequency: Frequency,
    /// absent when the stored start date was missing or malformed
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub management_fee_percentage: Option<Decimal>,
    pub room: Option<String>,
}

impl Rental {
    pub fn new(property_id: PropertyId, amount: Money, frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            tenant_name: String::new(),
            amount,
            frequency,
            start_date: Some(start_date),
            end_date: None,
            management_fee_percentage: None,
            room: None,
        }
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_name = tenant.into();
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_management_fee(mut self, percentage: Decimal) -> Self {
        self.management_fee_percentage = Some(percentage);
        self
    }

    /// whether the lease covers `date`, treating a missing end as open-ended
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self.start_date {
            Some(start) => start <= date && self.end_date.map_or(true, |end| date <= end),
            None => false,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RentalRecord {
    #[serde(deserialize_with = "lenient::id")]
    id: RentalId,
    #[serde(deserialize_with = "lenient::id")]
    property_id: PropertyId,
    #[serde(default, deserialize_with = "lenient::text")]
    tenant_name: String,
    #[serde(default, deserialize_with = "lenient::optional_money")]
    amount: Option<Money>,
    #[serde(default, deserialize_with = "lenient::optional_money")]
    monthly_rent: Option<Money>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    lease_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    lease_end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    management_fee_percentage: Option<Decimal>,
    #[serde(default, alias = "roomDescription", alias = "unit", deserialize_with = "lenient::optional_text")]
    room: Option<String>,
}

impl From<RentalRecord> for Rental {
    fn from(record: RentalRecord) -> Self {
        let (amount, frequency) = match (record.amount, record.monthly_rent) {
            (Some(amount), _) => (amount, record.frequency.as_deref().map(Frequency::from_label)),
            (None, Some(monthly)) => (
                monthly,
                Some(record.frequency.as_deref().map_or(Frequency::Monthly, Frequency::from_label)),
            ),
            (None, None) => (Money::ZERO, record.frequency.as_deref().map(Frequency::from_label)),
        };
        Rental {
            id: record.id,
            property_id: record.property_id,
            tenant_name: record.tenant_name,
            amount,
            frequency: frequency.unwrap_or_else(|| Frequency::from_label("")),
            start_date: record.lease_start_date.or(record.start_date),
            end_date: record.lease_end_date.or(record.end_date),
            management_fee_percentage: record.management_fee_percentage,
            room: record.room,
        }
    }
}

/// loan secured against one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LoanRecord")]
pub struct Loan {
    pub id: LoanId,
    pub property_id: PropertyId,
    pub lender: String,
    pub original_amount: Money,
    /// balance last reported by the lender; informational only
    pub current_balance: Option<Money>,
    /// annual rate in percent, e.g. 6.25
    pub interest_rate: Decimal,
    pub payment_amount: Money,
    pub frequency: Frequency,
    pub term_months: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: LoanStatus,
    /// account-keeping fee charged with every payment
    pub fee_amount: Option<Money>,
}

impl Loan {
    pub fn new(
        property_id: PropertyId,
        original_amount: Money,
        interest_rate: Decimal,
        payment_amount: Money,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            lender: String::new(),
            original_amount,
            current_balance: None,
            interest_rate,
            payment_amount,
            frequency,
            term_months: None,
            start_date: Some(start_date),
            end_date: None,
            status: LoanStatus::Active,
            fee_amount: None,
        }
    }

    pub fn with_lender(mut self, lender: impl Into<String>) -> Self {
        self.lender = lender.into();
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn with_fee(mut self, fee: Money) -> Self {
        self.fee_amount = Some(fee);
        self
    }

    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = status;
        self
    }

    pub fn annual_rate(&self) -> Rate {
        Rate::from_percent(self.interest_rate)
    }

    /// explicit end date, else start plus term, else None (open-ended)
    pub fn effective_end(&self) -> Option<NaiveDate> {
        self.end_date.or_else(|| {
            let start = self.start_date?;
            crate::calendar::add_months(start, self.term_months?)
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanRecord {
    #[serde(deserialize_with = "lenient::id")]
    id: LoanId,
    #[serde(deserialize_with = "lenient::id")]
    property_id: PropertyId,
    #[serde(default, alias = "lenderName", deserialize_with = "lenient::text")]
    lender: String,
    #[serde(default, alias = "principal", deserialize_with = "lenient::money")]
    original_amount: Money,
    #[serde(default, deserialize_with = "lenient::optional_money")]
    current_balance: Option<Money>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    interest_rate: Option<Decimal>,
    #[serde(default, alias = "paymentAmount", deserialize_with = "lenient::optional_money")]
    regular_payment_amount: Option<Money>,
    #[serde(default, deserialize_with = "lenient::optional_money")]
    monthly_payment: Option<Money>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    frequency: Option<String>,
    #[serde(default, alias = "loanTerm", deserialize_with = "lenient::optional_u32")]
    term_months: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    status: Option<String>,
    #[serde(default, alias = "feeAmount", alias = "accountFee", deserialize_with = "lenient::optional_money")]
    fee: Option<Money>,
}

impl From<LoanRecord> for Loan {
    fn from(record: LoanRecord) -> Self {
        let (payment_amount, frequency) = match (record.regular_payment_amount, record.monthly_payment) {
            (Some(payment), _) => (payment, record.frequency.as_deref().map(Frequency::from_label)),
            (None, Some(monthly)) => (
                monthly,
                Some(record.frequency.as_deref().map_or(Frequency::Monthly, Frequency::from_label)),
            ),
            (None, None) => (Money::ZERO, record.frequency.as_deref().map(Frequency::from_label)),
        };
        Loan {
            id: record.id,
            property_id: record.property_id,
            lender: record.lender,
            original_amount: record.original_amount,
            current_balance: record.current_balance,
            interest_rate: record.interest_rate.unwrap_or(Decimal::ZERO),
            payment_amount,
            frequency: frequency.unwrap_or_else(|| Frequency::from_label("")),
            term_months: record.term_months,
            start_date: record.start_date,
            end_date: record.end_date,
            status: record.status.map(LoanStatus::from).unwrap_or_default(),
            fee_amount: record.fee,
        }
    }
}

/// manually entered transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(deserialize_with = "lenient::id")]
    pub id: TransactionId,
    #[serde(deserialize_with = "lenient::id")]
    pub property_id: PropertyId,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: TransactionKind,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// raw amount; its sign is not reliable across sources
    #[serde(default, deserialize_with = "lenient::money")]
    pub amount: Money,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub payee: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub reminder_date: Option<NaiveDate>,
}

fn default_kind() -> TransactionKind {
    TransactionKind::Other(String::new())
}

impl Transaction {
    pub fn new(property_id: PropertyId, kind: impl Into<TransactionKind>, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            kind: kind.into(),
            category: String::new(),
            description: String::new(),
            amount,
            date: Some(date),
            payee: None,
            reminder_date: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    pub fn with_reminder(mut self, date: NaiveDate) -> Self {
        self.reminder_date = Some(date);
        self
    }
}

/// every record the engine reads for one query
///
/// Read-only input. Field names follow the camelCase JSON of the storage
/// backends, historical aliases included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    #[serde(default, deserialize_with = "skip_bad_records")]
    pub properties: Vec<Property>,
    #[serde(default, deserialize_with = "skip_bad_records")]
    pub rentals: Vec<Rental>,
    #[serde(default, deserialize_with = "skip_bad_records")]
    pub loans: Vec<Loan>,
    #[serde(default, deserialize_with = "skip_bad_records")]
    pub transactions: Vec<Transaction>,
}

impl PortfolioSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn rentals_for(&self, id: PropertyId) -> impl Iterator<Item = &Rental> {
        self.rentals.iter().filter(move |r| r.property_id == id)
    }

    pub fn loans_for(&self, id: PropertyId) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(move |l| l.property_id == id)
    }
}

/// parse a JSON array of records, dropping (and logging) entries that do not fit `T`
pub fn parse_records<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    Ok(collect_records(values))
}

fn collect_records<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

fn skip_bad_records<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(collect_records(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_property_aliases_and_cost_basis() {
        let property: Property = serde_json::from_value(json!({
            "id": "p-1",
            "address": "12 Harbour St",
            "basePropertyCost": "450000",
            "currentValue": 520000,
            "purchaseDate": "2021-07-01T00:00:00Z",
            "acquisitionCosts": [
                {"name": "Stamp duty", "amount": 17990},
                {"description": "Conveyancing", "amount": "1,450.50"}
            ]
        }))
        .unwrap();

        assert_eq!(property.name, "12 Harbour St");
        assert_eq!(property.purchase_price, Money::from_major(450_000));
        assert_eq!(property.purchase_date, Some(date(2021, 7, 1)));
        assert_eq!(property.cost_basis(), Money::from_decimal(dec!(469440.50)));
        assert_eq!(property.valuation(), Money::from_major(520_000));
    }

    #[test]
    fn test_rental_monthly_rent_alias_implies_monthly() {
        let rental: Rental = serde_json::from_value(json!({
            "id": "r-1",
            "propertyId": "p-1",
            "tenantName": "Ana",
            "monthlyRent": 2100,
            "startDate": "2024-01-01",
            "managementFeePercentage": "7.5"
        }))
        .unwrap();

        assert_eq!(rental.frequency, Frequency::Monthly);
        assert_eq!(rental.amount, Money::from_major(2_100));
        assert_eq!(rental.start_date, Some(date(2024, 1, 1)));
        assert_eq!(rental.end_date, None);
        assert_eq!(rental.management_fee_percentage, Some(dec!(7.5)));
        assert_eq!(rental.property_id, lenient::id_from_str("p-1"));
    }

    #[test]
    fn test_rental_lease_fields_take_precedence() {
        let rental: Rental = serde_json::from_value(json!({
            "id": "r-2",
            "propertyId": "p-1",
            "amount": 450,
            "frequency": "per week",
            "leaseStartDate": "2024-02-01",
            "startDate": "2023-01-01",
            "leaseEndDate": "garbage",
            "room": "Room 2"
        }))
        .unwrap();

        assert_eq!(rental.frequency, Frequency::Weekly);
        assert_eq!(rental.start_date, Some(date(2024, 2, 1)));
        assert_eq!(rental.end_date, None);
        assert_eq!(rental.room.as_deref(), Some("Room 2"));
    }

    #[test]
    fn test_loan_record_defaults() {
        let loan: Loan = serde_json::from_value(json!({
            "id": "l-1",
            "propertyId": "p-1",
            "originalAmount": 300000,
            "interestRate": 6.1,
            "monthlyPayment": "1818.00",
            "startDate": "2022-03-15",
            "loanTerm": 360,
            "status": "Paid Off"
        }))
        .unwrap();

        assert_eq!(loan.frequency, Frequency::Monthly);
        assert_eq!(loan.payment_amount, Money::from_major(1_818));
        assert_eq!(loan.term_months, Some(360));
        assert_eq!(loan.status, LoanStatus::PaidOff);
        assert_eq!(loan.effective_end(), Some(date(2052, 3, 15)));
    }

    #[test]
    fn test_transaction_type_and_bad_date() {
        let txn: Transaction = serde_json::from_value(json!({
            "id": "t-1",
            "propertyId": "p-1",
            "type": "Repair",
            "category": "Plumbing",
            "amount": 320,
            "date": "not a date"
        }))
        .unwrap();

        assert_eq!(txn.kind, TransactionKind::Repair);
        assert_eq!(txn.date, None);
        assert_eq!(txn.payee, None);
    }

    #[test]
    fn test_parse_records_skips_malformed_entries() {
        let json = r#"[
            {"id": "t-1", "propertyId": "p-1", "type": "rent", "amount": 500, "date": "2024-01-01"},
            "not an object",
            {"id": "t-2", "propertyId": "p-1", "type": "tax", "amount": -90, "date": "2024-01-02"}
        ]"#;
        let txns: Vec<Transaction> = parse_records(json).unwrap();
        assert_eq!(txns.len(), 2);
        assert!(parse_records::<Transaction>("{oops").is_err());
    }

    #[test]
    fn test_snapshot_from_json() {
        let snapshot = PortfolioSnapshot::from_json(
            r#"{
                "properties": [{"id": "p-1", "purchasePrice": 100}],
                "rentals": [{"id": "r-1", "propertyId": "p-1", "amount": 10, "frequency": "weekly", "startDate": "2024-01-01"}]
            }"#,
        )
        .unwrap();
        let property_id = snapshot.properties[0].id;
        assert_eq!(snapshot.rentals_for(property_id).count(), 1);
        assert!(snapshot.loans.is_empty());
        assert!(snapshot.property(property_id).is_some());
    }
}
