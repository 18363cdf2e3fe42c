//! Sample store exports with the inconsistencies the cleaner has to deal with: differing
//! column names, currency-formatted revenue, and blank cells.

use anyhow::{anyhow, Context as _, Result};
use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, seq::SliceRandom as _, Rng as _, SeedableRng as _};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::export::format_money;

const DAYS_OF_DATA: i64 = 90;
const MISSING_REVENUE_PROBABILITY: f64 = 0.05;
const MISSING_DATE_PROBABILITY: f64 = 0.03;

const PRODUCTS: [&str; 10] = [
    "Laptop",
    "Desktop",
    "Monitor",
    "Keyboard",
    "Mouse",
    "Headphones",
    "Webcam",
    "USB Cable",
    "HDMI Cable",
    "Power Adapter",
];

#[derive(Debug, Clone, Copy)]
enum Layout {
    /// store_id,date,product,quantity,revenue,order_id
    Standard,
    /// Alternative column names for date, revenue, quantity and order id
    Renamed,
    /// Revenue formatted as `$1,234.56` and product as product_name
    CurrencyFormatted,
}

impl Layout {
    fn headers(self) -> [&'static str; 6] {
        match self {
            Layout::Standard => ["store_id", "date", "product", "quantity", "revenue", "order_id"],
            Layout::Renamed => ["store_id", "sale_date", "product", "qty", "amount", "transaction_id"],
            Layout::CurrencyFormatted => [
                "store_id",
                "date",
                "product_name",
                "quantity",
                "revenue",
                "order_id",
            ],
        }
    }
}

struct SampleStore {
    file_name: &'static str,
    store_id: &'static str,
    num_records: usize,
    layout: Layout,
}

const STORES: [SampleStore; 3] = [
    SampleStore {
        file_name: "store1_sales.csv",
        store_id: "STORE_001",
        num_records: 250,
        layout: Layout::Standard,
    },
    SampleStore {
        file_name: "store2_sales.csv",
        store_id: "STORE_002",
        num_records: 220,
        layout: Layout::Renamed,
    },
    SampleStore {
        file_name: "store3_sales.csv",
        store_id: "STORE_003",
        num_records: 230,
        layout: Layout::CurrencyFormatted,
    },
];

/// Write one CSV per sample store into `output_dir`, covering the days up to and including `end_date`
pub fn generate_sample_files(
    output_dir: &Path,
    end_date: NaiveDate,
    seed: u64,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| anyhow!("Failed to create {}", output_dir.display()))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let start_date = end_date - Duration::days(DAYS_OF_DATA);

    let mut paths = Vec::with_capacity(STORES.len());
    for store in &STORES {
        log::info!(
            "Generating {} data ({:?} layout)...",
            store.store_id,
            store.layout
        );
        let path = output_dir.join(store.file_name);
        let file = std::fs::File::create(&path)
            .with_context(|| anyhow!("Failed to create {}", path.display()))?;
        write_store_sales(file, store, start_date, end_date, &mut rng)?;
        log::info!("  - {} ({} records)", path.display(), store.num_records);
        paths.push(path);
    }
    Ok(paths)
}

fn write_store_sales(
    output: impl std::io::Write,
    store: &SampleStore,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rng: &mut StdRng,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(store.layout.headers())?;

    let num_days = (end_date - start_date).num_days();
    for index in 0..store.num_records {
        let date = start_date + Duration::days(rng.gen_range(0..=num_days));
        let product = PRODUCTS.choose(rng).copied().unwrap_or(PRODUCTS[0]);
        let quantity: i64 = rng.gen_range(1..=10);
        let unit_price = Decimal::new(rng.gen_range(1_000..=150_000), 2);
        let revenue = unit_price * Decimal::from(quantity);

        let revenue = if rng.gen_bool(MISSING_REVENUE_PROBABILITY) {
            String::new()
        } else {
            match store.layout {
                Layout::CurrencyFormatted => format_money(revenue),
                Layout::Standard | Layout::Renamed => revenue.to_string(),
            }
        };
        let date = if rng.gen_bool(MISSING_DATE_PROBABILITY) {
            String::new()
        } else {
            date.format("%Y-%m-%d").to_string()
        };
        let order_id = format!("{}-{:05}", store.store_id, index + 1);

        writer.write_record([
            store.store_id,
            date.as_str(),
            product,
            quantity.to_string().as_str(),
            revenue.as_str(),
            order_id.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
