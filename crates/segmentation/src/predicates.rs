//! Substring predicates and index filtering.
//!
//! Matching is literal `str::contains`: case-sensitive and not anchored to
//! word boundaries, so `"Paper"` also matches `"Wallpaper"`.

use catalog_core::{Dataset, ProductRecord, TextField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPredicate {
    pub field: TextField,
    pub substring: String,
}

impl TextPredicate {
    pub fn new(field: TextField, substring: impl Into<String>) -> Self {
        Self {
            field,
            substring: substring.into(),
        }
    }

    pub fn description_contains(substring: impl Into<String>) -> Self {
        Self::new(TextField::Description, substring)
    }

    pub fn details_contain(substring: impl Into<String>) -> Self {
        Self::new(TextField::ProductDetails, substring)
    }

    /// Records with no value for the field never match.
    pub fn matches(&self, record: &ProductRecord) -> bool {
        self.field
            .value(record)
            .is_some_and(|text| text.contains(self.substring.as_str()))
    }
}

impl std::fmt::Display for TextPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} contains {:?}", self.field, self.substring)
    }
}

/// Keep the indices in `source` whose record satisfies `predicate`,
/// preserving source order. Indices outside the dataset are dropped.
pub fn filter_indices(dataset: &Dataset, source: &[usize], predicate: &TextPredicate) -> Vec<usize> {
    source
        .iter()
        .copied()
        .filter(|&i| dataset.get(i).is_some_and(|r| predicate.matches(r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: Option<&str>, details: Option<&str>) -> ProductRecord {
        ProductRecord {
            description: description.map(String::from),
            product_details: details.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_case_sensitive_match() {
        let p = TextPredicate::description_contains("Gift");
        assert!(p.matches(&record(Some("A Gift for you"), None)));
        assert!(!p.matches(&record(Some("a gift for you"), None)));
    }

    #[test]
    fn test_unanchored_match() {
        let p = TextPredicate::description_contains("Paper");
        assert!(p.matches(&record(Some("Floral Wallpaper roll"), None)));
        let p = TextPredicate::description_contains("Painting");
        assert!(p.matches(&record(Some("Paintings set"), None)));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let p = TextPredicate::details_contain("handmade paper");
        assert!(!p.matches(&record(Some("handmade paper"), None)));
        assert!(p.matches(&record(None, Some("Materials: handmade paper, ink"))));
    }

    #[test]
    fn test_empty_substring_matches_present_fields_only() {
        let p = TextPredicate::description_contains("");
        assert!(p.matches(&record(Some(""), None)));
        assert!(!p.matches(&record(None, None)));
    }

    #[test]
    fn test_filter_indices_preserves_order_and_subset() {
        let ds = Dataset::from_records(vec![
            record(Some("Gift box"), None),
            record(Some("Decor"), None),
            record(None, None),
            record(Some("Gift card"), None),
        ]);
        let all: Vec<usize> = (0..ds.len()).collect();
        let p = TextPredicate::description_contains("Gift");
        let kept = filter_indices(&ds, &all, &p);
        assert_eq!(kept, vec![0, 3]);

        // Every dropped index either lacks the field or fails the test.
        for i in all.iter().filter(|i| !kept.contains(i)) {
            let r = ds.get(*i).unwrap();
            assert!(r.description.as_deref().map_or(true, |d| !d.contains("Gift")));
        }
    }

    #[test]
    fn test_filter_indices_ignores_out_of_range() {
        let ds = Dataset::from_records(vec![record(Some("Gift"), None)]);
        let p = TextPredicate::description_contains("Gift");
        assert_eq!(filter_indices(&ds, &[0, 7], &p), vec![0]);
    }

    #[test]
    fn test_display() {
        let p = TextPredicate::details_contain("handmade paper");
        assert_eq!(p.to_string(), "product_details contains \"handmade paper\"");
    }
}
