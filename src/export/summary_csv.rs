use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

use crate::ir::{to_cents, MonthlySummary, REPORT_TIMESTAMP_FORMAT};

#[derive(Serialize)]
struct SummaryRow<'a> {
    store_id: &'a str,
    year_month: String,
    #[serde(with = "rust_decimal::serde::str")]
    total_revenue: Decimal,
    total_quantity: i64,
    total_orders: u64,
    report_generated: String,
}

impl<'a> From<&'a MonthlySummary> for SummaryRow<'a> {
    fn from(summary: &'a MonthlySummary) -> Self {
        Self {
            store_id: &summary.store_id,
            year_month: summary.year_month.to_string(),
            total_revenue: to_cents(summary.total_revenue),
            total_quantity: summary.total_quantity,
            total_orders: summary.total_orders,
            report_generated: summary
                .report_generated
                .format(REPORT_TIMESTAMP_FORMAT)
                .to_string(),
        }
    }
}

pub fn write_summary_csv(output: impl Write, summaries: &[MonthlySummary]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    if summaries.is_empty() {
        // serde only emits the header together with the first record
        writer.write_record([
            "store_id",
            "year_month",
            "total_revenue",
            "total_quantity",
            "total_orders",
            "report_generated",
        ])?;
    }
    for summary in summaries {
        writer.serialize(SummaryRow::from(summary))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ir::YearMonth;

    #[test]
    fn empty_summary_has_header() {
        let mut output = Vec::new();
        write_summary_csv(&mut output, &[]).unwrap();
        assert_eq!(
            "store_id,year_month,total_revenue,total_quantity,total_orders,report_generated\n",
            String::from_utf8(output).unwrap()
        );
    }

    #[test]
    fn revenue_has_two_decimals() {
        let summary = MonthlySummary {
            store_id: "Store, Downtown".to_string(),
            year_month: YearMonth::parse("2024-12").unwrap(),
            total_revenue: Decimal::new(7, 0),
            total_quantity: 0,
            total_orders: 3,
            report_generated: NaiveDate::from_ymd_opt(2025, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        };
        let mut output = Vec::new();
        write_summary_csv(&mut output, &[summary]).unwrap();
        assert_eq!(
            "store_id,year_month,total_revenue,total_quantity,total_orders,report_generated\n\
             \"Store, Downtown\",2024-12,7.00,0,3,2025-01-02 03:04:05\n",
            String::from_utf8(output).unwrap()
        );
    }
}
