//! Segment reporting — describe-style summaries, the combined price
//! benchmark, brand/price charts, and text/JSON/CSV exports.

pub mod aggregate;
pub mod chart;
pub mod report_builder;
pub mod summary;

pub use aggregate::{combined_mean, PriceBenchmark};
pub use chart::{BrandPriceChart, ChartStyle};
pub use report_builder::{AnalysisReport, ReportBuilder, SegmentReport};
pub use summary::{summarize, NumericStats, Summary};
