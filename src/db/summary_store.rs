use anyhow::{anyhow, Context as _, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension as _};
use rust_decimal::Decimal;
use std::{path::Path, str::FromStr as _};

use crate::ir::{MonthlySummary, YearMonth, REPORT_TIMESTAMP_FORMAT};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS monthly_summary (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    store_id         TEXT NOT NULL,
    year_month       TEXT NOT NULL,
    total_revenue    TEXT NOT NULL,
    total_quantity   INTEGER NOT NULL,
    total_orders     INTEGER NOT NULL,
    report_generated TEXT NOT NULL,
    UNIQUE(store_id, year_month)
);
"#;

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    Inserted,
    /// A row for the same store and month existed with different totals
    Updated,
    /// A row for the same store and month existed with the same totals, only its timestamp was refreshed
    Unchanged,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl UpsertStats {
    fn record(&mut self, result: UpsertResult) {
        match result {
            UpsertResult::Inserted => self.inserted += 1,
            UpsertResult::Updated => self.updated += 1,
            UpsertResult::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

pub struct SummaryStore {
    conn: Connection,
}

impl SummaryStore {
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Opening database {}...", path.display());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| anyhow!("Failed to open database {}", path.display()))?;
        let store = Self::with_connection(conn)?;
        log::info!("Opening database {}...done", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create monthly_summary table")?;
        Ok(Self { conn })
    }

    /// Insert or overwrite the summaries keyed by (store_id, year_month), all in one transaction
    pub fn upsert(&mut self, summaries: &[MonthlySummary]) -> Result<UpsertStats> {
        log::info!("Loading {} monthly summaries to database...", summaries.len());
        let tx = self.conn.transaction()?;
        let mut stats = UpsertStats::default();
        for summary in summaries {
            let existing = tx
                .query_row(
                    "SELECT store_id, year_month, total_revenue, total_quantity, total_orders, report_generated
                     FROM monthly_summary WHERE store_id = ?1 AND year_month = ?2",
                    params![summary.store_id, summary.year_month.to_string()],
                    read_row,
                )
                .optional()?
                .transpose()?;
            let result = match existing {
                None => UpsertResult::Inserted,
                Some(existing) if existing.same_totals(summary) => UpsertResult::Unchanged,
                Some(_) => UpsertResult::Updated,
            };
            tx.execute(
                "INSERT INTO monthly_summary
                    (store_id, year_month, total_revenue, total_quantity, total_orders, report_generated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(store_id, year_month) DO UPDATE SET
                    total_revenue=excluded.total_revenue,
                    total_quantity=excluded.total_quantity,
                    total_orders=excluded.total_orders,
                    report_generated=excluded.report_generated",
                params![
                    summary.store_id,
                    summary.year_month.to_string(),
                    summary.total_revenue.to_string(),
                    summary.total_quantity,
                    i64::try_from(summary.total_orders)?,
                    summary
                        .report_generated
                        .format(REPORT_TIMESTAMP_FORMAT)
                        .to_string(),
                ],
            )?;
            stats.record(result);
        }
        tx.commit()?;
        log::info!(
            "Database load complete: {} inserted, {} updated, {} unchanged",
            stats.inserted,
            stats.updated,
            stats.unchanged
        );
        Ok(stats)
    }

    pub fn all(&self) -> Result<Vec<MonthlySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT store_id, year_month, total_revenue, total_quantity, total_orders, report_generated
             FROM monthly_summary ORDER BY store_id, year_month",
        )?;
        let rows = stmt.query_map([], read_row)?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row??);
        }
        Ok(summaries)
    }
}

/// The outer result reports SQLite errors, the inner one values that don't parse back into a summary
fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<MonthlySummary>> {
    let store_id: String = row.get(0)?;
    let year_month: String = row.get(1)?;
    let total_revenue: String = row.get(2)?;
    let total_quantity: i64 = row.get(3)?;
    let total_orders: i64 = row.get(4)?;
    let report_generated: String = row.get(5)?;
    Ok(parse_row(
        store_id,
        &year_month,
        &total_revenue,
        total_quantity,
        total_orders,
        &report_generated,
    ))
}

fn parse_row(
    store_id: String,
    year_month: &str,
    total_revenue: &str,
    total_quantity: i64,
    total_orders: i64,
    report_generated: &str,
) -> Result<MonthlySummary> {
    Ok(MonthlySummary {
        year_month: YearMonth::parse(year_month)
            .ok_or_else(|| anyhow!("Invalid year_month '{}' for store {}", year_month, store_id))?,
        total_revenue: Decimal::from_str(total_revenue)
            .with_context(|| anyhow!("Invalid total_revenue '{}'", total_revenue))?,
        total_quantity,
        total_orders: u64::try_from(total_orders)?,
        report_generated: NaiveDateTime::parse_from_str(report_generated, REPORT_TIMESTAMP_FORMAT)
            .with_context(|| anyhow!("Invalid report_generated '{}'", report_generated))?,
        store_id,
    })
}
