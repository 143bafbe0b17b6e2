//! Cross-segment aggregates — the combined price mean used as a single
//! benchmark across all areas of interest.

use catalog_core::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::summary::Summary;

/// Arithmetic mean of precomputed per-segment means.
///
/// Rejects an empty list and any non-finite entry: either means an
/// undefined segment mean slipped into the input.
pub fn combined_mean(values: &[f64]) -> CatalogResult<f64> {
    if values.is_empty() {
        return Err(CatalogError::InvalidAggregate(
            "combined mean of an empty list".into(),
        ));
    }
    if let Some((pos, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(CatalogError::InvalidAggregate(format!(
            "value at position {pos} is not a number ({v})"
        )));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub segment: String,
    pub price_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBenchmark {
    pub combined_mean: f64,
    pub included: Vec<BenchmarkEntry>,
    /// Segments left out because their price mean is undefined.
    pub excluded: Vec<String>,
}

impl PriceBenchmark {
    /// Combine the price means of the given segments, skipping any whose
    /// mean is undefined (no priced records).
    pub fn from_summaries<'a, I>(segments: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a Summary)>,
    {
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for (name, summary) in segments {
            match summary.price_mean() {
                Some(mean) => included.push(BenchmarkEntry {
                    segment: name.to_string(),
                    price_mean: mean,
                }),
                None => {
                    warn!(segment = %name, "No priced records, excluded from combined mean");
                    excluded.push(name.to_string());
                }
            }
        }

        let means: Vec<f64> = included.iter().map(|e| e.price_mean).collect();
        Ok(Self {
            combined_mean: combined_mean(&means)?,
            included,
            excluded,
        })
    }
}
