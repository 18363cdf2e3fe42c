use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Canonical sale fields that raw CSV headers are reconciled to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    StoreId,
    Date,
    Revenue,
    Product,
    Quantity,
    OrderId,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::StoreId,
        Field::Date,
        Field::Revenue,
        Field::Product,
        Field::Quantity,
        Field::OrderId,
    ];

    /// Fields without which a row can't be aggregated
    pub const REQUIRED: [Field; 3] = [Field::StoreId, Field::Date, Field::Revenue];

    pub fn name(self) -> &'static str {
        match self {
            Field::StoreId => "store_id",
            Field::Date => "date",
            Field::Revenue => "revenue",
            Field::Product => "product",
            Field::Quantity => "quantity",
            Field::OrderId => "order_id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase, trim, and turn whitespace/hyphen runs into `_`, so that `Sale Date` and
/// `sale-date` both become `sale_date`.
pub fn normalize_header(header: &str) -> String {
    let header = header.trim_start_matches('\u{FEFF}').trim().to_lowercase();
    let mut normalized = String::with_capacity(header.len());
    let mut in_separator = false;
    for c in header.chars() {
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                normalized.push('_');
                in_separator = true;
            }
        } else {
            normalized.push(c);
            in_separator = false;
        }
    }
    normalized
}

#[derive(Debug, Clone)]
pub struct ColumnMapping {
    field_by_alias: HashMap<String, Field>,
}

impl ColumnMapping {
    pub fn new(aliases: impl IntoIterator<Item = (Field, Vec<String>)>) -> Self {
        let mut field_by_alias = HashMap::new();
        for (field, names) in aliases {
            for name in names {
                field_by_alias.entry(normalize_header(&name)).or_insert(field);
            }
        }
        Self { field_by_alias }
    }

    /// Bind each canonical field to the first header (in file order) that is one of its aliases.
    /// Later headers matching an already bound field are ignored.
    pub fn resolve<'a>(&self, headers: impl IntoIterator<Item = &'a str>) -> ResolvedColumns {
        let mut indices = HashMap::new();
        for (index, header) in headers.into_iter().enumerate() {
            if let Some(field) = self.field_by_alias.get(&normalize_header(header)) {
                indices.entry(*field).or_insert(index);
            }
        }
        ResolvedColumns { indices }
    }
}

/// Column index of each canonical field in one particular file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    indices: HashMap<Field, usize>,
}

impl ResolvedColumns {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn missing_required(&self) -> impl Iterator<Item = Field> + '_ {
        Field::REQUIRED
            .into_iter()
            .filter(|field| !self.indices.contains_key(field))
    }
}
