use anyhow::{anyhow, Context as _, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::ir::{MonthlySummary, Overview, SaleRecord};

mod format;
mod summary_csv;
mod workbook;

pub use format::{format_money, format_thousands};
pub use summary_csv::write_summary_csv;
pub use workbook::write_workbook;

const FILE_STEM: &str = "monthly_sales_summary";
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Everything a run produced that goes into the report files
pub struct Report<'a> {
    pub summaries: &'a [MonthlySummary],
    pub sales: &'a [SaleRecord],
    pub overview: Option<&'a Overview>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
}

impl ReportPaths {
    pub fn new(output_dir: &Path, timestamp: NaiveDateTime) -> Self {
        let stem = format!("{}_{}", FILE_STEM, timestamp.format(FILE_TIMESTAMP_FORMAT));
        Self {
            csv: output_dir.join(format!("{stem}.csv")),
            xlsx: output_dir.join(format!("{stem}.xlsx")),
        }
    }
}

pub fn export_reports(
    output_dir: &Path,
    timestamp: NaiveDateTime,
    report: &Report<'_>,
) -> Result<ReportPaths> {
    log::info!("Exporting reports...");
    std::fs::create_dir_all(output_dir)
        .with_context(|| anyhow!("Failed to create {}", output_dir.display()))?;
    let paths = ReportPaths::new(output_dir, timestamp);

    let file = std::fs::File::create(&paths.csv)
        .with_context(|| anyhow!("Failed to create {}", paths.csv.display()))?;
    write_summary_csv(file, report.summaries)?;
    log::info!("CSV report saved: {}", paths.csv.display());

    write_workbook(&paths.xlsx, report)
        .with_context(|| anyhow!("Failed to write {}", paths.xlsx.display()))?;
    log::info!("Excel report saved: {}", paths.xlsx.display());

    Ok(paths)
}
