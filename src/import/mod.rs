use anyhow::{anyhow, bail, Context as _, Result};
use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

mod columns;

pub use columns::{normalize_header, ColumnMapping, Field, ResolvedColumns};

/// One CSV row with its cells bound to canonical fields. Values are trimmed, empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSale {
    pub source: Arc<str>,
    pub line: u64,
    pub store_id: Option<String>,
    pub date: Option<String>,
    pub revenue: Option<String>,
    pub product: Option<String>,
    pub quantity: Option<String>,
    pub order_id: Option<String>,
}

#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub rows: Vec<RawSale>,
    pub malformed_rows: usize,
}

#[derive(Debug, Default)]
pub struct Extracted {
    pub files: Vec<LoadedFile>,
    pub failed_files: Vec<PathBuf>,
}

impl Extracted {
    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|file| file.rows.len()).sum()
    }

    pub fn malformed_rows(&self) -> usize {
        self.files.iter().map(|file| file.malformed_rows).sum()
    }

    pub fn into_rows(self) -> Vec<RawSale> {
        self.files.into_iter().flat_map(|file| file.rows).collect()
    }
}

/// Load all files. A file that can't be read is logged and skipped; it's only an error if no file could be loaded.
pub fn load_all(paths: &[PathBuf], mapping: &ColumnMapping) -> Result<Extracted> {
    log::info!("Starting data extraction...");
    let mut extracted = Extracted::default();
    for path in paths {
        match load_file(path, mapping) {
            Ok(file) => {
                log::info!("Loaded {} rows from {}", file.rows.len(), path.display());
                extracted.files.push(file);
            }
            Err(err) => {
                log::error!("Failed to load {}: {:#}", path.display(), err);
                extracted.failed_files.push(path.clone());
            }
        }
    }
    log::info!(
        "Extraction complete: {} files loaded",
        extracted.files.len()
    );
    if extracted.files.is_empty() {
        bail!("No data to transform");
    }
    Ok(extracted)
}

pub fn load_file(path: &Path, mapping: &ColumnMapping) -> Result<LoadedFile> {
    let file = std::fs::File::open(path)
        .with_context(|| anyhow!("Failed to open {}", path.display()))?;
    load(file, Arc::from(path.display().to_string()), mapping)
        .map(|(rows, malformed_rows)| LoadedFile {
            path: path.to_path_buf(),
            rows,
            malformed_rows,
        })
}

/// Returns the parsed rows and the number of malformed records that were skipped
pub fn load(
    input_stream: impl Read,
    source: Arc<str>,
    mapping: &ColumnMapping,
) -> Result<(Vec<RawSale>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input_stream);

    let headers = reader
        .headers()
        .with_context(|| anyhow!("Failed to read header row of {}", source))?
        .clone();
    if headers.is_empty() {
        bail!("{} has no header row", source);
    }
    let columns = mapping.resolve(headers.iter());
    for field in columns.missing_required() {
        log::warn!(
            "{} has no column for '{}' (headers: {}); all of its rows will be dropped",
            source,
            field,
            headers.iter().collect::<Vec<_>>().join(", "),
        );
    }

    let mut rows = Vec::new();
    let mut malformed_rows = 0;
    for record in reader.records() {
        match record {
            Ok(record) => {
                if record.iter().all(str::is_empty) {
                    continue;
                }
                let line = record.position().map(|pos| pos.line()).unwrap_or(0);
                rows.push(to_raw_sale(&record, &columns, source.clone(), line));
            }
            Err(err) => {
                log::warn!("Skipping malformed record in {}: {}", source, err);
                malformed_rows += 1;
            }
        }
    }
    Ok((rows, malformed_rows))
}

fn to_raw_sale(
    record: &csv::StringRecord,
    columns: &ResolvedColumns,
    source: Arc<str>,
    line: u64,
) -> RawSale {
    let cell = |field: Field| {
        columns
            .index(field)
            .and_then(|index| record.get(index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    RawSale {
        source,
        line,
        store_id: cell(Field::StoreId),
        date: cell(Field::Date),
        revenue: cell(Field::Revenue),
        product: cell(Field::Product),
        quantity: cell(Field::Quantity),
        order_id: cell(Field::OrderId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn load_str(content: &str) -> (Vec<RawSale>, usize) {
        load(
            content.as_bytes(),
            Arc::from("test.csv"),
            &Config::default().column_mapping(),
        )
        .unwrap()
    }

    #[test]
    fn standard_format() {
        let (rows, malformed) = load_str(
            "store_id,date,product,quantity,revenue\n\
             STORE_001,2024-07-01,Laptop,2,1999.98\n\
             STORE_001,2024-07-02,Mouse,1,\n",
        );
        assert_eq!(0, malformed);
        assert_eq!(
            vec![
                RawSale {
                    source: Arc::from("test.csv"),
                    line: 2,
                    store_id: Some("STORE_001".to_string()),
                    date: Some("2024-07-01".to_string()),
                    revenue: Some("1999.98".to_string()),
                    product: Some("Laptop".to_string()),
                    quantity: Some("2".to_string()),
                    order_id: None,
                },
                RawSale {
                    source: Arc::from("test.csv"),
                    line: 3,
                    store_id: Some("STORE_001".to_string()),
                    date: Some("2024-07-02".to_string()),
                    revenue: None,
                    product: Some("Mouse".to_string()),
                    quantity: Some("1".to_string()),
                    order_id: None,
                },
            ],
            rows
        );
    }

    #[test]
    fn alternative_column_names_and_quoted_amounts() {
        let (rows, _) = load_str(
            "Store,Sale Date,product_name,qty,amount,transaction_id\n\
             STORE_003,2024-07-01,Monitor,3,\"$1,234.56\",T-1\n",
        );
        assert_eq!(1, rows.len());
        let row = &rows[0];
        assert_eq!(Some("STORE_003"), row.store_id.as_deref());
        assert_eq!(Some("2024-07-01"), row.date.as_deref());
        assert_eq!(Some("$1,234.56"), row.revenue.as_deref());
        assert_eq!(Some("Monitor"), row.product.as_deref());
        assert_eq!(Some("3"), row.quantity.as_deref());
        assert_eq!(Some("T-1"), row.order_id.as_deref());
    }

    #[test]
    fn byte_order_mark_in_first_header() {
        let (rows, _) = load_str("\u{FEFF}store_id,date,revenue\nS1,2024-01-01,5\n");
        assert_eq!(Some("S1"), rows[0].store_id.as_deref());
    }

    #[test]
    fn missing_required_column_yields_empty_values() {
        let (rows, _) = load_str("store_id,date\nS1,2024-01-01\n");
        assert_eq!(1, rows.len());
        assert_eq!(None, rows[0].revenue);
    }

    #[test]
    fn short_rows_and_blank_lines() {
        let (rows, malformed) = load_str("store_id,date,revenue\nS1,2024-01-01\n,,\nS2,2024-01-02,3\n");
        assert_eq!(0, malformed);
        assert_eq!(2, rows.len());
        assert_eq!(None, rows[0].revenue);
        assert_eq!(Some("S2"), rows[1].store_id.as_deref());
    }

    #[test]
    fn invalid_utf8_record_is_skipped_and_counted() {
        let input: &[u8] = b"store_id,date,revenue\n\
            S1,2024-01-01,5\n\
            S2,2024-01-\xff02,6\n\
            S3,2024-01-03,7\n";
        let (rows, malformed) = load(
            input,
            Arc::from("latin1.csv"),
            &Config::default().column_mapping(),
        )
        .unwrap();
        assert_eq!(1, malformed);
        assert_eq!(
            vec![Some("S1"), Some("S3")],
            rows.iter()
                .map(|row| row.store_id.as_deref())
                .collect::<Vec<_>>()
        );
        assert_eq!(4, rows[1].line);
    }

    #[test]
    fn malformed_rows_are_summed_over_files() {
        let file = |name: &str, malformed_rows| LoadedFile {
            path: PathBuf::from(name),
            rows: Vec::new(),
            malformed_rows,
        };
        let extracted = Extracted {
            files: vec![file("a.csv", 1), file("b.csv", 0), file("c.csv", 2)],
            failed_files: Vec::new(),
        };
        assert_eq!(3, extracted.malformed_rows());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(load(
            "".as_bytes(),
            Arc::from("empty.csv"),
            &Config::default().column_mapping()
        )
        .is_err());
    }

    #[test]
    fn load_all_skips_unreadable_files() {
        let tempdir = tempfile::tempdir().unwrap();
        let good = tempdir.path().join("good.csv");
        std::fs::write(&good, "store_id,date,revenue\nS1,2024-01-01,5\n").unwrap();
        let missing = tempdir.path().join("missing.csv");

        let extracted =
            load_all(&[missing.clone(), good], &Config::default().column_mapping()).unwrap();
        assert_eq!(1, extracted.files.len());
        assert_eq!(vec![missing], extracted.failed_files);
        assert_eq!(1, extracted.total_rows());
    }

    #[test]
    fn load_all_fails_without_any_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let err = load_all(
            &[tempdir.path().join("missing.csv")],
            &Config::default().column_mapping(),
        )
        .unwrap_err();
        assert_eq!("No data to transform", err.to_string());
    }
}
