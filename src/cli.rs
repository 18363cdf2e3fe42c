use anyhow::{anyhow, bail, Result};
use chrono::Local;
use console::{pad_str, style, Alignment, StyledObject};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::db::SummaryStore;
use crate::export::{format_money, format_thousands};
use crate::ir::{MonthlySummary, YearMonth};
use crate::operations;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::sample;
use crate::terminal::BulletPointPrinter;

pub fn main(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    match args.command {
        Command::Run {
            files,
            database,
            reports_dir,
            no_export,
        } => {
            apply_run_overrides(&mut config, database, reports_dir, no_export);
            main_run(config, &files)
        }
        Command::ListSummaries { database, month } => {
            let database = database.or(config.database).ok_or_else(|| {
                anyhow!("No database given, use --database or set it in the config file")
            })?;
            let month = month
                .map(|month| {
                    YearMonth::parse(&month)
                        .ok_or_else(|| anyhow!("Invalid month '{}', expected YYYY-MM", month))
                })
                .transpose()?;
            main_list_summaries(&database, month)
        }
        Command::GenerateSample { output_dir, seed } => main_generate_sample(&output_dir, seed),
    }
}

/// Flags given on the command line take precedence over the config file
fn apply_run_overrides(
    config: &mut Config,
    database: Option<PathBuf>,
    reports_dir: Option<PathBuf>,
    no_export: bool,
) {
    if database.is_some() {
        config.database = database;
    }
    if let Some(reports_dir) = reports_dir {
        config.reports_dir = reports_dir;
    }
    if no_export {
        config.export_reports = false;
    }
}

fn main_run(config: Config, files: &[PathBuf]) -> Result<()> {
    let outcome = Pipeline::new(config).run(files)?;
    print_outcome(&outcome);
    Ok(())
}

fn main_list_summaries(database: &Path, month: Option<YearMonth>) -> Result<()> {
    if !database.exists() {
        bail!("Database file {} not found", database.display());
    }
    let summaries = SummaryStore::open(database)?.all()?;
    let summaries = match month {
        Some(month) => operations::summaries_for_month(&summaries, month),
        None => summaries,
    };
    println!("{}", style_header("Monthly summaries:"));
    if summaries.is_empty() {
        println!("(none)");
    } else {
        print_summaries(&BulletPointPrinter::new(), &summaries);
    }
    Ok(())
}

fn main_generate_sample(output_dir: &Path, seed: u64) -> Result<()> {
    let paths = sample::generate_sample_files(output_dir, Local::now().date_naive(), seed)?;
    println!("{}", style_header("Sample files generated:"));
    let printer = BulletPointPrinter::new();
    for path in paths {
        printer.print_item(style(path.display()).cyan());
    }
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    let printer = BulletPointPrinter::new();

    println!("{}", style_header("Input:"));
    printer.print_item(format!(
        "{} files loaded, {} rows read",
        outcome.files_loaded, outcome.rows_read
    ));
    for path in &outcome.failed_files {
        printer.print_item(style(format!("failed to load {}", path.display())).red());
    }
    if outcome.malformed_rows > 0 {
        printer.print_item(
            style(format!("{} malformed records skipped", outcome.malformed_rows)).yellow(),
        );
    }
    printer.print_item(format!(
        "{} clean rows, {} dropped",
        outcome.cleaned.sales.len(),
        outcome.cleaned.dropped.len()
    ));
    let reasons = printer.indent();
    for (reason, count) in outcome.cleaned.drop_counts() {
        reasons.print_item(style(format!("{reason}: {count}")).yellow());
    }

    println!();
    println!("{}", style_header("Monthly summaries:"));
    if outcome.summaries.is_empty() {
        println!("(none)");
    } else {
        print_summaries(&printer, &outcome.summaries);
    }

    if let Some(overview) = &outcome.overview {
        println!();
        println!("{}", style_header("Overview:"));
        printer.print_item(format!(
            "Total revenue: {}",
            style_amount(overview.total_revenue)
        ));
        printer.print_item(format!(
            "Total orders: {}",
            format_thousands(Decimal::from(overview.total_orders), 0)
        ));
        printer.print_item(format!(
            "Total quantity: {}",
            format_thousands(Decimal::from(overview.total_quantity), 0)
        ));
        printer.print_item(format!("Stores: {}", overview.number_of_stores));
        printer.print_item(format!(
            "Date range: {} to {}",
            overview.first_date.format("%Y-%m-%d"),
            overview.last_date.format("%Y-%m-%d")
        ));
    }

    if let Some(stats) = &outcome.upsert_stats {
        println!();
        println!("{}", style_header("Database:"));
        printer.print_item(format!(
            "{} inserted, {} updated, {} unchanged",
            stats.inserted, stats.updated, stats.unchanged
        ));
    }
    if let Some(reports) = &outcome.reports {
        println!();
        println!("{}", style_header("Reports:"));
        printer.print_item(style(reports.csv.display()).cyan());
        printer.print_item(style(reports.xlsx.display()).cyan());
    }
}

fn print_summaries(printer: &BulletPointPrinter, summaries: &[MonthlySummary]) {
    let mut current_store: Option<&str> = None;
    let months = printer.indent();
    for summary in summaries {
        if current_store != Some(summary.store_id.as_str()) {
            printer.print_item(style_store(&summary.store_id));
            current_store = Some(&summary.store_id);
        }
        months.print_item(format!(
            "{} {} {} {}",
            style(summary.year_month).bold(),
            pad_str(
                &style_amount(summary.total_revenue).to_string(),
                15,
                Alignment::Right,
                None
            ),
            pad_str(
                &format!("{} units", summary.total_quantity),
                12,
                Alignment::Right,
                None
            ),
            pad_str(
                &format!("{} orders", summary.total_orders),
                12,
                Alignment::Right,
                None
            ),
        ));
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_store(store_id: &str) -> StyledObject<&str> {
    style(store_id).cyan().bold()
}

fn style_amount(amount: Decimal) -> StyledObject<String> {
    let result = style(format_money(amount)).bold();
    if amount < Decimal::ZERO {
        result.red()
    } else {
        result.green()
    }
}
