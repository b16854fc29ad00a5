use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::calendar::{add_days, add_months};
use crate::decimal::{Money, Rate};

pub const DAYS_PER_YEAR: u32 = 365;

/// canonical payment frequency
///
/// Each variant carries an exact periods-per-year fraction. The same table feeds
/// daily equivalents (`amount * periods_per_year / 365`) and loan periodic rates
/// (`annual_rate / periods_per_year`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Fortnightly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Fortnightly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Annual,
    ];

    /// strict recognition of a loosely formatted label
    pub fn recognize(label: &str) -> Option<Frequency> {
        let cleaned = label
            .trim()
            .to_ascii_lowercase()
            .replace(['.', '/'], "")
            .replace(['-', '_'], " ");
        let mut key = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        for prefix in ["per ", "every ", "each "] {
            if let Some(rest) = key.strip_prefix(prefix) {
                key = rest.to_string();
            }
        }

        let frequency = match key.as_str() {
            "daily" | "day" | "pd" | "everyday" => Frequency::Daily,
            "weekly" | "week" | "wk" | "pw" => Frequency::Weekly,
            "fortnightly" | "fortnight" | "biweekly" | "bi weekly" | "two weeks" | "2 weeks"
            | "pf" => Frequency::Fortnightly,
            "monthly" | "month" | "mo" | "pm" | "pcm" | "calendar month" => Frequency::Monthly,
            "quarterly" | "quarter" | "pq" | "3 months" | "three months" => Frequency::Quarterly,
            "annual" | "annually" | "yearly" | "year" | "pa" | "annum" | "py" => Frequency::Annual,
            _ => return None,
        };
        Some(frequency)
    }

    /// canonicalize any label, falling back to weekly when it is not recognized
    pub fn from_label(label: &str) -> Frequency {
        match Frequency::recognize(label) {
            Some(frequency) => frequency,
            None => {
                warn!(label, "unrecognized frequency label, treating as weekly");
                Frequency::Weekly
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Fortnightly => "fortnightly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annual => "annual",
        }
    }

    /// periods per year as (numerator, denominator)
    fn periods_per_year_ratio(&self) -> (u32, u32) {
        match self {
            Frequency::Daily => (DAYS_PER_YEAR, 1),
            Frequency::Weekly => (DAYS_PER_YEAR, 7),
            Frequency::Fortnightly => (DAYS_PER_YEAR, 14),
            Frequency::Monthly => (12, 1),
            Frequency::Quarterly => (4, 1),
            Frequency::Annual => (1, 1),
        }
    }

    pub fn periods_per_year(&self) -> Decimal {
        let (num, den) = self.periods_per_year_ratio();
        Decimal::from(num) / Decimal::from(den)
    }

    /// per-day rate of a periodic amount
    pub fn daily_equivalent(&self, amount: Money) -> Money {
        let (num, den) = self.periods_per_year_ratio();
        Money::from_decimal(
            amount.as_decimal() * Decimal::from(num) / Decimal::from(DAYS_PER_YEAR * den),
        )
    }

    /// yearly total of a periodic amount (daily equivalent x 365, without intermediate rounding)
    pub fn annual_equivalent(&self, amount: Money) -> Money {
        let (num, den) = self.periods_per_year_ratio();
        Money::from_decimal(amount.as_decimal() * Decimal::from(num) / Decimal::from(den))
    }

    /// interest rate for one payment period of an annual rate
    pub fn periodic_rate(&self, annual: Rate) -> Rate {
        let (num, den) = self.periods_per_year_ratio();
        Rate::from_decimal(annual.as_decimal() * Decimal::from(den) / Decimal::from(num))
    }

    /// date of the `n`th payment counted from `anchor` (n = 0 is the anchor itself)
    pub fn occurrence(&self, anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => add_days(anchor, i64::from(n)),
            Frequency::Weekly => add_days(anchor, 7 * i64::from(n)),
            Frequency::Fortnightly => add_days(anchor, 14 * i64::from(n)),
            Frequency::Monthly => add_months(anchor, n),
            Frequency::Quarterly => add_months(anchor, n.checked_mul(3)?),
            Frequency::Annual => add_months(anchor, n.checked_mul(12)?),
        }
    }

    /// index of the first occurrence from `anchor` that falls on or after `date`
    pub fn first_index_on_or_after(&self, anchor: NaiveDate, date: NaiveDate) -> Option<u32> {
        if date <= anchor {
            return Some(0);
        }
        // floor estimate, never past the answer
        let estimate = match self {
            Frequency::Daily => (date - anchor).num_days(),
            Frequency::Weekly => (date - anchor).num_days() / 7,
            Frequency::Fortnightly => (date - anchor).num_days() / 14,
            Frequency::Monthly | Frequency::Quarterly | Frequency::Annual => {
                let months = i64::from(date.year() - anchor.year()) * 12 + i64::from(date.month())
                    - i64::from(anchor.month());
                let step = match self {
                    Frequency::Quarterly => 3,
                    Frequency::Annual => 12,
                    _ => 1,
                };
                months / step
            }
        };
        let mut n = u32::try_from(estimate).ok()?;
        while self.occurrence(anchor, n)? < date {
            n = n.checked_add(1)?;
        }
        Some(n)
    }
}

impl From<String> for Frequency {
    fn from(label: String) -> Self {
        Frequency::from_label(&label)
    }
}

impl From<&str> for Frequency {
    fn from(label: &str) -> Self {
        Frequency::from_label(label)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// result of normalizing a label/amount pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAmount {
    pub canonical: Frequency,
    pub amount: Money,
    pub daily_amount: Money,
}

/// clamp a periodic amount to a usable value; negatives become zero
pub fn sanitize_amount(amount: Money) -> Money {
    if amount.is_negative() {
        warn!(%amount, "negative periodic amount, treating as zero");
        return Money::ZERO;
    }
    amount
}

/// canonicalize a label and convert the amount to its daily equivalent
pub fn normalize(label: &str, amount: Money) -> NormalizedAmount {
    normalize_with(Frequency::from_label(label), amount)
}

/// same as [`normalize`] for an already canonical frequency
pub fn normalize_with(canonical: Frequency, amount: Money) -> NormalizedAmount {
    let amount = sanitize_amount(amount);
    NormalizedAmount {
        canonical,
        amount,
        daily_amount: canonical.daily_equivalent(amount),
    }
}

/// float entry point; NaN and infinities normalize to zero
pub fn normalize_f64(label: &str, amount: f64) -> NormalizedAmount {
    let money = Money::from_f64(amount).unwrap_or_else(|| {
        warn!(amount, "non-finite periodic amount, treating as zero");
        Money::ZERO
    });
    normalize(label, money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_label_recognition() {
        let cases = [
            ("Weekly", Frequency::Weekly),
            ("per week", Frequency::Weekly),
            ("pw", Frequency::Weekly),
            ("p/w", Frequency::Weekly),
            ("fortnightly", Frequency::Fortnightly),
            ("Bi-Weekly", Frequency::Fortnightly),
            ("pcm", Frequency::Monthly),
            ("per calendar month", Frequency::Monthly),
            ("quarterly", Frequency::Quarterly),
            ("annual", Frequency::Annual),
            ("Yearly", Frequency::Annual),
            ("p.a.", Frequency::Annual),
            ("daily", Frequency::Daily),
        ];
        for (label, expected) in cases {
            assert_eq!(Frequency::recognize(label), Some(expected), "label {label}");
        }
    }

    #[test]
    fn test_unknown_label_falls_back_to_weekly() {
        assert_eq!(Frequency::recognize("every blue moon"), None);
        assert_eq!(Frequency::from_label("every blue moon"), Frequency::Weekly);
        assert_eq!(Frequency::from_label(""), Frequency::Weekly);
    }

    #[test]
    fn test_weekly_daily_equivalent() {
        let normalized = normalize("Weekly", Money::from_major(700));
        assert_eq!(normalized.canonical, Frequency::Weekly);
        assert_eq!(normalized.daily_amount, Money::from_major(100));
    }

    #[test]
    fn test_daily_equivalent_times_year_matches_periods() {
        let amount = Money::from_major(1_234);
        for frequency in Frequency::ALL {
            let daily = frequency.daily_equivalent(amount);
            let annual_from_daily = daily.as_decimal() * dec!(365);
            let annual_from_periods = amount.as_decimal() * frequency.periods_per_year();
            let diff = (annual_from_daily - annual_from_periods).abs();
            assert!(diff < dec!(0.0001), "{frequency}: diff {diff}");
        }
    }

    #[test]
    fn test_monthly_uses_twelve_over_365() {
        let daily = Frequency::Monthly.daily_equivalent(Money::from_major(365));
        assert_eq!(daily, Money::from_major(12));
        let daily = Frequency::Quarterly.daily_equivalent(Money::from_major(365));
        assert_eq!(daily, Money::from_major(4));
    }

    #[test]
    fn test_negative_and_non_finite_amounts_normalize_to_zero() {
        assert_eq!(normalize("weekly", Money::from_major(-70)).daily_amount, Money::ZERO);
        assert_eq!(normalize_f64("weekly", f64::NAN).amount, Money::ZERO);
        assert_eq!(normalize_f64("weekly", f64::NEG_INFINITY).daily_amount, Money::ZERO);
    }

    #[test]
    fn test_periodic_rate() {
        let annual = Rate::from_percent(dec!(12));
        assert_eq!(Frequency::Monthly.periodic_rate(annual).as_decimal(), dec!(0.01));
        assert_eq!(Frequency::Quarterly.periodic_rate(annual).as_decimal(), dec!(0.03));
        assert_eq!(Frequency::Annual.periodic_rate(annual).as_decimal(), dec!(0.12));
    }

    #[test]
    fn test_occurrence_steps_from_anchor() {
        let anchor = date(2024, 1, 31);
        assert_eq!(Frequency::Monthly.occurrence(anchor, 1), Some(date(2024, 2, 29)));
        assert_eq!(Frequency::Monthly.occurrence(anchor, 2), Some(date(2024, 3, 31)));
        assert_eq!(Frequency::Quarterly.occurrence(anchor, 1), Some(date(2024, 4, 30)));
        assert_eq!(Frequency::Fortnightly.occurrence(anchor, 1), Some(date(2024, 2, 14)));
        assert_eq!(Frequency::Annual.occurrence(anchor, 1), Some(date(2025, 1, 31)));
    }

    #[test]
    fn test_first_index_on_or_after() {
        let anchor = date(2024, 1, 3);
        let weekly = Frequency::Weekly;
        assert_eq!(weekly.first_index_on_or_after(anchor, date(2023, 12, 1)), Some(0));
        assert_eq!(weekly.first_index_on_or_after(anchor, date(2024, 1, 3)), Some(0));
        assert_eq!(weekly.first_index_on_or_after(anchor, date(2024, 1, 5)), Some(1));
        assert_eq!(weekly.first_index_on_or_after(anchor, date(2024, 1, 10)), Some(1));

        let month_end = date(2024, 1, 31);
        let monthly = Frequency::Monthly;
        // Feb 29 is the clamped second due date
        assert_eq!(monthly.first_index_on_or_after(month_end, date(2024, 2, 29)), Some(1));
        assert_eq!(monthly.first_index_on_or_after(month_end, date(2024, 3, 1)), Some(2));

        let quarterly = Frequency::Quarterly;
        assert_eq!(quarterly.first_index_on_or_after(date(2024, 1, 15), date(2024, 4, 16)), Some(2));
        assert_eq!(Frequency::Annual.first_index_on_or_after(date(2020, 6, 1), date(2100, 2, 10)), Some(80));
    }

    #[test]
    fn test_serde_accepts_loose_labels() {
        let frequency: Frequency = serde_json::from_str("\"per month\"").unwrap();
        assert_eq!(frequency, Frequency::Monthly);
        assert_eq!(serde_json::to_string(&Frequency::Fortnightly).unwrap(), "\"fortnightly\"");
    }
}
