use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use crate::decimal::Money;

/// amount from a number, a numeric string ("$1,250.00") or null; unusable values become None
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Null => None,
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).and_then(Decimal::from_f64))
        }
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' ' | '£' | '€'))
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            let parsed = Decimal::from_str(&cleaned).ok();
            if parsed.is_none() {
                warn!(value = %s, "unparseable amount, treating as absent");
            }
            parsed
        }
        other => {
            warn!(value = %other, "unexpected amount shape, treating as absent");
            None
        }
    }
}

pub fn date_from_str(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    text.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

pub fn date_from_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => {
            let parsed = date_from_str(s);
            if parsed.is_none() {
                warn!(value = %s, "malformed date, treating as absent");
            }
            parsed
        }
        other => {
            warn!(value = %other, "unexpected date shape, treating as absent");
            None
        }
    }
}

/// parse a UUID, or derive a stable one from any other identifier text
pub fn id_from_str(text: &str) -> Uuid {
    Uuid::parse_str(text.trim()).unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, text.trim().as_bytes()))
}

pub fn money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_money(deserializer)?.unwrap_or(Money::ZERO))
}

pub fn optional_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value).map(Money::from_decimal))
}

pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

pub fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(decimal_from_value)
        .and_then(|d| u32::from_str(&d.trunc().to_string()).ok()))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(date_from_value))
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

pub fn id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => id_from_str(&s),
        Some(Value::Number(n)) => id_from_str(&n.to_string()),
        _ => Uuid::nil(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_amount_shapes() {
        assert_eq!(decimal_from_value(&json!(12.5)), Some(dec!(12.5)));
        assert_eq!(decimal_from_value(&json!(-40)), Some(dec!(-40)));
        assert_eq!(decimal_from_value(&json!("$1,250.75")), Some(dec!(1250.75)));
        assert_eq!(decimal_from_value(&json!("n/a")), None);
        assert_eq!(decimal_from_value(&json!(null)), None);
        assert_eq!(decimal_from_value(&json!({"value": 3})), None);
    }

    #[test]
    fn test_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(date_from_value(&json!("2024-03-09")), expected);
        assert_eq!(date_from_value(&json!("2024-03-09T10:00:00Z")), expected);
        assert_eq!(date_from_value(&json!("2024-03-09T10:00:00.000")), expected);
        assert_eq!(date_from_value(&json!("2024-03-09 10:00")), expected);
        assert_eq!(date_from_value(&json!("09/03/2024")), None);
        assert_eq!(date_from_value(&json!("")), None);
    }

    #[test]
    fn test_ids_are_stable_for_non_uuid_text() {
        let a = id_from_str("prop-17");
        let b = id_from_str("prop-17");
        assert_eq!(a, b);
        assert_ne!(a, id_from_str("prop-18"));

        let uuid = Uuid::new_v4();
        assert_eq!(id_from_str(&uuid.to_string()), uuid);
    }
}
