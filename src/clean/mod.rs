use std::{collections::BTreeMap, fmt};

use crate::import::RawSale;
use crate::ir::SaleRecord;

mod amount;
mod date;

pub use amount::{parse_amount, parse_quantity};
pub use date::parse_date;

/// Why a raw row didn't make it into the cleaned data
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
    MissingStoreId,
    MissingDate,
    InvalidDate { value: String },
    MissingRevenue,
    InvalidRevenue { value: String },
}

impl DropReason {
    /// Reason without the offending value, used to group drop counts
    pub fn kind(&self) -> &'static str {
        match self {
            DropReason::MissingStoreId => "missing store id",
            DropReason::MissingDate => "missing date",
            DropReason::InvalidDate { .. } => "invalid date",
            DropReason::MissingRevenue => "missing revenue",
            DropReason::InvalidRevenue { .. } => "invalid revenue",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::InvalidDate { value } | DropReason::InvalidRevenue { value } => {
                write!(f, "{} '{}'", self.kind(), value)
            }
            _ => f.write_str(self.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub source: String,
    pub line: u64,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default)]
pub struct Cleaned {
    pub sales: Vec<SaleRecord>,
    pub dropped: Vec<DroppedRow>,
}

impl Cleaned {
    pub fn drop_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for dropped in &self.dropped {
            *counts.entry(dropped.reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}

pub fn clean(rows: Vec<RawSale>) -> Cleaned {
    log::info!("Starting data transformation...");
    log::info!("Combined data: {} total rows", rows.len());

    let mut cleaned = Cleaned::default();
    for row in rows {
        let source = row.source.clone();
        let line = row.line;
        match clean_row(row) {
            Ok(sale) => cleaned.sales.push(sale),
            Err(reason) => {
                log::warn!("Dropping {}:{}: {}", source, line, reason);
                cleaned.dropped.push(DroppedRow {
                    source: source.to_string(),
                    line,
                    reason,
                });
            }
        }
    }

    log::info!("Removed {} invalid rows", cleaned.dropped.len());
    for (kind, count) in cleaned.drop_counts() {
        log::info!("  {}: {}", kind, count);
    }
    log::info!(
        "Transformation complete: {} clean rows",
        cleaned.sales.len()
    );
    cleaned
}

/// Turn one raw row into a sale, or report the first validity rule it breaks
pub fn clean_row(row: RawSale) -> Result<SaleRecord, DropReason> {
    let store_id = present(row.store_id).ok_or(DropReason::MissingStoreId)?;
    let date = present(row.date).ok_or(DropReason::MissingDate)?;
    let date = parse_date(&date).map_err(|_| DropReason::InvalidDate { value: date })?;
    let revenue = present(row.revenue).ok_or(DropReason::MissingRevenue)?;
    let revenue =
        parse_amount(&revenue).map_err(|_| DropReason::InvalidRevenue { value: revenue })?;
    let quantity = present(row.quantity).and_then(|quantity| match parse_quantity(&quantity) {
        Ok(quantity) => Some(quantity),
        Err(err) => {
            log::warn!(
                "{}:{}: ignoring quantity '{}': {}",
                row.source,
                row.line,
                quantity,
                err
            );
            None
        }
    });
    Ok(SaleRecord {
        store_id,
        date,
        revenue,
        quantity,
        order_id: present(row.order_id),
        product: present(row.product),
    })
}

// `NA` is left out, it's a plausible store or region code
const MISSING_MARKERS: [&str; 8] = ["", "nan", "null", "none", "nat", "n/a", "#n/a", "<na>"];

/// Treat the placeholders that spreadsheet and dataframe exports write for missing values as absent
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| {
            !MISSING_MARKERS
                .iter()
                .any(|marker| value.eq_ignore_ascii_case(marker))
        })
}
