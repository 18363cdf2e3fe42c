use anyhow::{anyhow, bail, ensure, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::import::{normalize_header, ColumnMapping, Field};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Accepted header names per canonical field. Fields missing here use the built-in aliases.
    pub column_aliases: HashMap<Field, Vec<String>>,
    pub reports_dir: PathBuf,
    /// SQLite file the monthly summaries are upserted into. No database load if unset.
    pub database: Option<PathBuf>,
    pub export_reports: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            column_aliases: HashMap::new(),
            reports_dir: PathBuf::from("reports"),
            database: None,
            export_reports: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading config from {}...", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| anyhow!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| anyhow!("Invalid config file {}", path.display()))?;
        log::info!("Loading config from {}...done", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut claimed_by: HashMap<String, Field> = HashMap::new();
        for field in Field::ALL {
            let aliases = self.aliases(field);
            ensure!(
                !aliases.is_empty(),
                "Column aliases for '{}' must not be empty",
                field
            );
            for alias in aliases {
                let normalized = normalize_header(alias);
                ensure!(
                    !normalized.is_empty(),
                    "Column aliases for '{}' contain an empty name",
                    field
                );
                if let Some(other) = claimed_by.insert(normalized.clone(), field) {
                    if other != field {
                        bail!(
                            "Column alias '{}' is used for both '{}' and '{}'",
                            normalized,
                            other,
                            field
                        );
                    }
                }
            }
        }
        Ok(())
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        match self.column_aliases.get(&field) {
            Some(aliases) => aliases,
            None => default_aliases(field),
        }
    }

    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping::new(
            Field::ALL
                .into_iter()
                .map(|field| (field, self.aliases(field).to_vec())),
        )
    }
}

fn default_aliases(field: Field) -> &'static [String] {
    static DEFAULTS: std::sync::OnceLock<HashMap<Field, Vec<String>>> =
        std::sync::OnceLock::new();
    let defaults = DEFAULTS.get_or_init(|| {
        let aliases =
            |names: &[&str]| -> Vec<String> { names.iter().map(|name| name.to_string()).collect() };
        HashMap::from([
            (Field::StoreId, aliases(&["store_id", "store", "location_id"])),
            (Field::Date, aliases(&["date", "sale_date", "transaction_date"])),
            (Field::Revenue, aliases(&["revenue", "sales", "amount", "total"])),
            (Field::Product, aliases(&["product", "product_name", "item"])),
            (Field::Quantity, aliases(&["quantity", "qty", "units"])),
            (
                Field::OrderId,
                aliases(&[
                    "order_id",
                    "order",
                    "order_number",
                    "transaction_id",
                    "invoice",
                ]),
            ),
        ])
    });
    defaults.get(&field).map(Vec::as_slice).unwrap_or(&[])
}
