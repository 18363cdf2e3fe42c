use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDateTime, SubsecRound as _};
use std::path::PathBuf;

use crate::clean::{self, Cleaned};
use crate::config::Config;
use crate::db::{SummaryStore, UpsertStats};
use crate::export::{self, Report, ReportPaths};
use crate::import;
use crate::ir::{MonthlySummary, Overview};
use crate::operations;

const BANNER: &str = "============================================================";

#[derive(Debug)]
pub struct PipelineOutcome {
    pub files_loaded: usize,
    pub failed_files: Vec<PathBuf>,
    pub rows_read: usize,
    pub malformed_rows: usize,
    pub cleaned: Cleaned,
    pub summaries: Vec<MonthlySummary>,
    pub overview: Option<Overview>,
    pub upsert_stats: Option<UpsertStats>,
    pub reports: Option<ReportPaths>,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self, files: &[PathBuf]) -> Result<PipelineOutcome> {
        self.run_at(files, Local::now().naive_local().trunc_subsecs(0))
    }

    /// Run with a fixed generation time, which stamps the summaries and names the report files
    pub fn run_at(&self, files: &[PathBuf], generated_at: NaiveDateTime) -> Result<PipelineOutcome> {
        log::info!("{}", BANNER);
        log::info!("SALES ETL PIPELINE STARTED");
        log::info!("{}", BANNER);

        let extracted = import::load_all(files, &self.config.column_mapping())?;
        let files_loaded = extracted.files.len();
        let failed_files = extracted.failed_files.clone();
        let rows_read = extracted.total_rows();
        let malformed_rows = extracted.malformed_rows();

        let cleaned = clean::clean(extracted.into_rows());
        let summaries = operations::monthly_summaries(&cleaned.sales, generated_at)?;
        let overview = operations::overview(&cleaned.sales, &summaries)?;

        let mut upsert_stats = None;
        let mut reports = None;
        if summaries.is_empty() {
            log::warn!("No valid rows left after cleaning, nothing to load or export");
        } else {
            upsert_stats = self.load_to_database(&summaries)?;
            if self.config.export_reports {
                let report = Report {
                    summaries: &summaries,
                    sales: &cleaned.sales,
                    overview: overview.as_ref(),
                };
                reports = Some(export::export_reports(
                    &self.config.reports_dir,
                    generated_at,
                    &report,
                )?);
            }
        }

        log::info!("{}", BANNER);
        log::info!("PIPELINE COMPLETED SUCCESSFULLY");
        log::info!("{}", BANNER);

        Ok(PipelineOutcome {
            files_loaded,
            failed_files,
            rows_read,
            malformed_rows,
            cleaned,
            summaries,
            overview,
            upsert_stats,
            reports,
        })
    }

    fn load_to_database(&self, summaries: &[MonthlySummary]) -> Result<Option<UpsertStats>> {
        let Some(path) = &self.config.database else {
            log::warn!("No database configured, skipping database load");
            return Ok(None);
        };
        let mut store = SummaryStore::open(path)?;
        let stats = store
            .upsert(summaries)
            .context("Database load failed")?;
        Ok(Some(stats))
    }
}
