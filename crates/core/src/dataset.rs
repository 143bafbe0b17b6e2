//! Dataset loading and the one-time `product_details` normalization pass.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};
use crate::types::ProductRecord;

/// Artifact separator left in `product_details` by the scraper export.
pub const DETAIL_ARTIFACT_DELIMITER: &str = "\n\n\n\n\n\n";
pub const DETAIL_REPLACEMENT: &str = ", ";

/// Ordered collection of product records. Read-only after normalization.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<ProductRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of product records from disk.
    pub fn load_json(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CatalogError::Dataset(format!("cannot open {}: {e}", path.display()))
        })?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), records = dataset.len(), "Dataset loaded");
        Ok(dataset)
    }

    pub fn from_reader(reader: impl std::io::Read) -> CatalogResult<Self> {
        let raw: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
        Self::from_values(raw)
    }

    pub fn from_json_str(s: &str) -> CatalogResult<Self> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(s)?;
        Self::from_values(raw)
    }

    fn from_values(raw: Vec<serde_json::Value>) -> CatalogResult<Self> {
        let records = raw
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                ProductRecord::from_json_value(value)
                    .map_err(|e| CatalogError::Dataset(format!("record {i}: {e}")))
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(Self { records })
    }

    /// Rewrite `delimiter` to `replacement` in every `product_details`
    /// value. Returns the number of records changed.
    pub fn normalize_details(&mut self, delimiter: &str, replacement: &str) -> usize {
        if delimiter.is_empty() {
            return 0;
        }
        let mut rewritten = 0;
        for record in &mut self.records {
            if let Some(details) = record.product_details.as_mut() {
                if details.contains(delimiter) {
                    *details = details.replace(delimiter, replacement);
                    rewritten += 1;
                }
            }
        }
        debug!(rewritten, "Normalized product details");
        rewritten
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ProductRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
