//! Keyword segmentation — substring predicates over product text fields and
//! an immutable tree of named segment views over the root dataset.

pub mod builder;
pub mod engine;
pub mod predicates;

pub use builder::{default_plan, load_plan, plan_from_json_str, SegmentBuilder, SegmentSpec};
pub use engine::{Segment, SegmentId, SegmentationEngine};
pub use predicates::{filter_indices, TextPredicate};
