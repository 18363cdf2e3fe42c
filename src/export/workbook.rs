use anyhow::Result;
use chrono::Datelike as _;
use rust_decimal::{prelude::ToPrimitive as _, Decimal};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

use super::{format_money, format_thousands, Report};
use crate::ir::{MonthlySummary, Overview, SaleRecord, REPORT_TIMESTAMP_FORMAT};

const SUMMARY_SHEET: &str = "Monthly Summary";
const RAW_DATA_SHEET: &str = "Raw Data";
const OVERVIEW_SHEET: &str = "Overview";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn write_workbook(path: &Path, report: &Report<'_>) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    write_summary_sheet(
        workbook.add_worksheet().set_name(SUMMARY_SHEET)?,
        &header,
        &money,
        report.summaries,
    )?;
    write_raw_data_sheet(
        workbook.add_worksheet().set_name(RAW_DATA_SHEET)?,
        &header,
        &money,
        report.sales,
    )?;
    write_overview_sheet(
        workbook.add_worksheet().set_name(OVERVIEW_SHEET)?,
        &header,
        report.overview,
    )?;

    workbook.save(path)?;
    Ok(())
}

fn write_header_row(worksheet: &mut Worksheet, header: &Format, titles: &[&str]) -> Result<()> {
    for (col, title) in titles.iter().enumerate() {
        worksheet.write_string_with_format(0, u16::try_from(col)?, *title, header)?;
        worksheet.set_column_width(u16::try_from(col)?, 16)?;
    }
    Ok(())
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    header: &Format,
    money: &Format,
    summaries: &[MonthlySummary],
) -> Result<()> {
    write_header_row(
        worksheet,
        header,
        &[
            "store_id",
            "year_month",
            "total_revenue",
            "total_quantity",
            "total_orders",
            "report_generated",
        ],
    )?;
    for (index, summary) in summaries.iter().enumerate() {
        let row = u32::try_from(index + 1)?;
        worksheet.write_string(row, 0, &summary.store_id)?;
        worksheet.write_string(row, 1, summary.year_month.to_string())?;
        worksheet.write_number_with_format(row, 2, to_f64(summary.total_revenue), money)?;
        worksheet.write_number(row, 3, summary.total_quantity as f64)?;
        worksheet.write_number(row, 4, summary.total_orders as f64)?;
        worksheet.write_string(
            row,
            5,
            summary
                .report_generated
                .format(REPORT_TIMESTAMP_FORMAT)
                .to_string(),
        )?;
    }
    Ok(())
}

fn write_raw_data_sheet(
    worksheet: &mut Worksheet,
    header: &Format,
    money: &Format,
    sales: &[SaleRecord],
) -> Result<()> {
    write_header_row(
        worksheet,
        header,
        &[
            "store_id",
            "date",
            "product",
            "quantity",
            "revenue",
            "order_id",
            "year",
            "month",
            "year_month",
        ],
    )?;
    for (index, sale) in sales.iter().enumerate() {
        let row = u32::try_from(index + 1)?;
        worksheet.write_string(row, 0, &sale.store_id)?;
        worksheet.write_string(row, 1, sale.date.format(DATE_FORMAT).to_string())?;
        if let Some(product) = &sale.product {
            worksheet.write_string(row, 2, product)?;
        }
        if let Some(quantity) = sale.quantity {
            worksheet.write_number(row, 3, quantity as f64)?;
        }
        worksheet.write_number_with_format(row, 4, to_f64(sale.revenue), money)?;
        if let Some(order_id) = &sale.order_id {
            worksheet.write_string(row, 5, order_id)?;
        }
        worksheet.write_number(row, 6, sale.date.year())?;
        worksheet.write_number(row, 7, sale.date.month())?;
        worksheet.write_string(row, 8, sale.year_month().to_string())?;
    }
    Ok(())
}

fn write_overview_sheet(
    worksheet: &mut Worksheet,
    header: &Format,
    overview: Option<&Overview>,
) -> Result<()> {
    write_header_row(worksheet, header, &["Metric", "Value"])?;
    for (index, (metric, value)) in overview_rows(overview).into_iter().enumerate() {
        let row = u32::try_from(index + 1)?;
        worksheet.write_string(row, 0, metric)?;
        worksheet.write_string(row, 1, value)?;
    }
    Ok(())
}

fn overview_rows(overview: Option<&Overview>) -> Vec<(&'static str, String)> {
    let Some(overview) = overview else {
        return Vec::new();
    };
    vec![
        ("Total Revenue", format_money(overview.total_revenue)),
        (
            "Total Orders",
            format_thousands(Decimal::from(overview.total_orders), 0),
        ),
        (
            "Total Quantity",
            format_thousands(Decimal::from(overview.total_quantity), 0),
        ),
        ("Number of Stores", overview.number_of_stores.to_string()),
        (
            "Date Range",
            format!(
                "{} to {}",
                overview.first_date.format(DATE_FORMAT),
                overview.last_date.format(DATE_FORMAT)
            ),
        ),
    ]
}

fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_overview_rows() {
        let overview = Overview {
            total_revenue: Decimal::new(123456789, 2),
            total_orders: 1234,
            total_quantity: 5678,
            number_of_stores: 3,
            first_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2024, 9, 29).unwrap(),
        };
        assert_eq!(
            vec![
                ("Total Revenue", "$1,234,567.89".to_string()),
                ("Total Orders", "1,234".to_string()),
                ("Total Quantity", "5,678".to_string()),
                ("Number of Stores", "3".to_string()),
                ("Date Range", "2024-07-01 to 2024-09-29".to_string()),
            ],
            overview_rows(Some(&overview))
        );
    }

    #[test]
    fn empty_workbook_is_written() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("empty.xlsx");
        write_workbook(
            &path,
            &Report {
                summaries: &[],
                sales: &[],
                overview: None,
            },
        )
        .unwrap();
        assert!(path.exists());
    }
}
