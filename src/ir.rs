use std::fmt;

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A cleaned sale in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    pub store_id: String,
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub quantity: Option<i64>,
    pub order_id: Option<String>,
    pub product: Option<String>,
}

impl SaleRecord {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year = year.parse().ok()?;
        let month = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Aggregated sales of one store in one month. Unique per (store_id, year_month).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    pub store_id: String,
    pub year_month: YearMonth,
    pub total_revenue: Decimal,
    pub total_quantity: i64,
    pub total_orders: u64,
    pub report_generated: NaiveDateTime,
}

impl MonthlySummary {
    /// Whether both summaries carry the same totals, ignoring when they were generated
    pub fn same_totals(&self, other: &MonthlySummary) -> bool {
        self.store_id == other.store_id
            && self.year_month == other.year_month
            && self.total_revenue == other.total_revenue
            && self.total_quantity == other.total_quantity
            && self.total_orders == other.total_orders
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub total_quantity: i64,
    pub number_of_stores: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Round a money amount to cents and pin the scale so it always renders with two decimals
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        assert_eq!("2024-03", YearMonth::from_date(date).to_string());
    }

    #[test]
    fn year_month_parse() {
        assert_eq!(
            Some(YearMonth {
                year: 2024,
                month: 11
            }),
            YearMonth::parse("2024-11")
        );
        assert_eq!(None, YearMonth::parse("2024-13"));
        assert_eq!(None, YearMonth::parse("2024-1"));
        assert_eq!(None, YearMonth::parse("202411"));
    }

    #[test]
    fn year_months_order_chronologically() {
        let dec = YearMonth::parse("2023-12").unwrap();
        let jan = YearMonth::parse("2024-01").unwrap();
        assert!(dec < jan);
    }

    #[test]
    fn to_cents_pins_scale() {
        assert_eq!("12.50", to_cents(Decimal::new(125, 1)).to_string());
        assert_eq!("7.00", to_cents(Decimal::new(7, 0)).to_string());
        // Banker's rounding
        assert_eq!("0.12", to_cents(Decimal::new(125, 3)).to_string());
        assert_eq!("0.14", to_cents(Decimal::new(135, 3)).to_string());
    }
}
