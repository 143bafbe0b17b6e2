//! Segment builder — fluent API for declaring segment plans, plus the
//! built-in plan of keyword areas.

use std::path::Path;

use catalog_core::{CatalogResult, TextField};
use serde::{Deserialize, Serialize};

use crate::predicates::TextPredicate;

/// Declarative description of a segment and its sub-segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub name: String,
    pub predicate: TextPredicate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SegmentSpec>,
    /// Whether the segment's price mean feeds the combined benchmark.
    /// Unset means "only if it has no children".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_of_interest: Option<bool>,
}

impl SegmentSpec {
    pub fn is_area_of_interest(&self) -> bool {
        self.area_of_interest.unwrap_or(self.children.is_empty())
    }
}

pub struct SegmentBuilder {
    name: String,
    predicate: Option<TextPredicate>,
    children: Vec<SegmentSpec>,
    area_of_interest: Option<bool>,
}

impl SegmentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: None,
            children: Vec::new(),
            area_of_interest: None,
        }
    }

    pub fn contains(mut self, field: TextField, substring: impl Into<String>) -> Self {
        self.predicate = Some(TextPredicate::new(field, substring));
        self
    }

    pub fn contains_description(self, substring: impl Into<String>) -> Self {
        self.contains(TextField::Description, substring)
    }

    pub fn contains_details(self, substring: impl Into<String>) -> Self {
        self.contains(TextField::ProductDetails, substring)
    }

    pub fn child(mut self, child: SegmentBuilder) -> Self {
        self.children.push(child.build());
        self
    }

    pub fn area_of_interest(mut self, flag: bool) -> Self {
        self.area_of_interest = Some(flag);
        self
    }

    /// Without an explicit predicate the segment matches its own name in
    /// the description.
    pub fn build(self) -> SegmentSpec {
        let predicate = self
            .predicate
            .unwrap_or_else(|| TextPredicate::description_contains(self.name.clone()));
        SegmentSpec {
            name: self.name,
            predicate,
            children: self.children,
            area_of_interest: self.area_of_interest,
        }
    }
}

/// The keyword areas examined for the storefront study: seven top-level
/// areas, three of them split into Painting and Paper.
pub fn default_plan() -> Vec<SegmentSpec> {
    let split = |area: &str| {
        SegmentBuilder::new(area)
            .contains_description(area)
            .child(SegmentBuilder::new("Painting").contains_description("Painting"))
            .child(SegmentBuilder::new("Paper").contains_description("Paper"))
            .build()
    };

    vec![
        split("Gift"),
        split("Decor"),
        SegmentBuilder::new("Chinese").contains_description("Chinese").build(),
        SegmentBuilder::new("Japanese").contains_description("Japanese").build(),
        split("Custom"),
        SegmentBuilder::new("Color Print")
            .contains_description("color print")
            .build(),
        SegmentBuilder::new("Handmade Paper")
            .contains_details("handmade paper")
            .build(),
    ]
}

pub fn plan_from_json_str(s: &str) -> CatalogResult<Vec<SegmentSpec>> {
    Ok(serde_json::from_str(s)?)
}

pub fn load_plan(path: impl AsRef<Path>) -> CatalogResult<Vec<SegmentSpec>> {
    let raw = std::fs::read_to_string(path)?;
    plan_from_json_str(&raw)
}
