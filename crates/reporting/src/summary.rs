//! Segment summaries — null counts, describe-style numeric statistics,
//! distinct categories and brands, and the rating-sorted ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use catalog_core::{NumericField, ProductField, ProductRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCount {
    pub field: ProductField,
    pub nulls: usize,
}

/// Statistics over the non-null values of one numeric field. Every
/// statistic is `None` when it cannot be computed: all of them for an
/// empty input, and `std_dev` for fewer than two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub field: NumericField,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl NumericStats {
    pub fn from_values(field: NumericField, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                field,
                count,
                mean: None,
                std_dev: None,
                min: None,
                q1: None,
                median: None,
                q3: None,
                max: None,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[count - 1];

        // A constant column has exactly zero spread.
        let (mean, std_dev) = if min == max {
            (min, (count > 1).then_some(0.0))
        } else {
            let mean = values.iter().sum::<f64>() / count as f64;
            let std_dev = (count > 1).then(|| {
                let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (count - 1) as f64).sqrt()
            });
            (mean, std_dev)
        };

        Self {
            field,
            count,
            mean: Some(mean),
            std_dev,
            min: Some(min),
            q1: Some(quantile(&sorted, 0.25)),
            median: Some(quantile(&sorted, 0.5)),
            q3: Some(quantile(&sorted, 0.75)),
            max: Some(max),
        }
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub record_count: usize,
    pub null_counts: Vec<NullCount>,
    pub numeric: Vec<NumericStats>,
    /// Distinct category strings, first-seen order.
    pub categories: Vec<String>,
    /// Distinct brand strings, first-seen order.
    pub brands: Vec<String>,
    /// Root-dataset indices ordered by average rating, highest first.
    /// Ties keep their input order; unrated records come last.
    pub rating_sorted: Vec<usize>,
}

impl Summary {
    pub fn stats(&self, field: NumericField) -> Option<&NumericStats> {
        self.numeric.iter().find(|s| s.field == field)
    }

    pub fn nulls(&self, field: ProductField) -> usize {
        self.null_counts
            .iter()
            .find(|n| n.field == field)
            .map_or(0, |n| n.nulls)
    }

    pub fn price_mean(&self) -> Option<f64> {
        self.stats(NumericField::Price).and_then(|s| s.mean)
    }
}

/// Summarize records paired with their root-dataset index. An empty input
/// is valid and produces zero counts and undefined statistics.
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = (usize, &'a ProductRecord)>,
{
    let records: Vec<(usize, &ProductRecord)> = records.into_iter().collect();

    let null_counts = ProductField::ALL
        .iter()
        .map(|&field| NullCount {
            field,
            nulls: records.iter().filter(|(_, r)| field.is_null(r)).count(),
        })
        .collect();

    let numeric = NumericField::ALL
        .iter()
        .map(|&field| {
            let values: Vec<f64> = records.iter().filter_map(|(_, r)| field.value(r)).collect();
            NumericStats::from_values(field, &values)
        })
        .collect();

    let categories = distinct(records.iter().filter_map(|(_, r)| r.category.as_deref()));
    let brands = distinct(records.iter().filter_map(|(_, r)| r.brand.as_deref()));

    let mut ranked: Vec<(usize, Option<f64>)> = records
        .iter()
        .map(|(i, r)| (*i, r.average_rating))
        .collect();
    // sort_by is stable, so equal ratings keep their source order.
    ranked.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Summary {
        record_count: records.len(),
        null_counts,
        numeric,
        categories,
        brands,
        rating_sorted: ranked.into_iter().map(|(i, _)| i).collect(),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
