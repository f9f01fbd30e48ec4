use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::core::{PriceError, PriceResult};

pub const AREA_COLUMN: &str = "area_in_sqft";
pub const BHK_COLUMN: &str = "bhk";
pub const LOCATION_PREFIX: &str = "location_";

/// Ordered feature columns the model was trained on.
///
/// Immutable once built. Name lookups go through a precomputed index, and the
/// positions of the two numeric columns are resolved up front so encoding
/// never has to fail.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    area_index: usize,
    bhk_index: usize,
}

impl ColumnSchema {
    pub fn from_columns(columns: Vec<String>) -> PriceResult<Self> {
        if columns.is_empty() {
            return Err(PriceError::SchemaError("column list is empty".to_string()));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(PriceError::SchemaError(format!("duplicate column `{}`", name)));
            }
        }

        let required = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| PriceError::SchemaError(format!("required column `{}` is missing", name)))
        };
        let area_index = required(AREA_COLUMN)?;
        let bhk_index = required(BHK_COLUMN)?;

        Ok(Self {
            columns,
            index,
            area_index,
            bhk_index,
        })
    }

    /// Load a JSON array of column names.
    pub fn load(path: &Path) -> PriceResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PriceError::SchemaError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let columns: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            PriceError::SchemaError(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let schema = Self::from_columns(columns)?;
        info!(
            path = %path.display(),
            columns = schema.len(),
            locations = schema.location_count(),
            "Loaded column schema"
        );
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn area_index(&self) -> usize {
        self.area_index
    }

    pub fn bhk_index(&self) -> usize {
        self.bhk_index
    }

    /// Index of the one-hot column for `location`, if the model knows it.
    pub fn location_index(&self, location: &str) -> Option<usize> {
        self.index_of(&format!("{}{}", LOCATION_PREFIX, location))
    }

    /// Known locations in column order, prefix stripped.
    pub fn locations(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|column| column.strip_prefix(LOCATION_PREFIX))
            .map(str::to_string)
            .collect()
    }

    fn location_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| column.starts_with(LOCATION_PREFIX))
            .count()
    }
}
