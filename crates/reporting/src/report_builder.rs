//! Analysis report builder — assemble per-segment summaries, charts and the
//! price benchmark, and export them as text, JSON, CSV and chart files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use catalog_core::{CatalogResult, ProductField, ProductRecord};
use catalog_segmentation::{SegmentId, SegmentationEngine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::PriceBenchmark;
use crate::chart::{BrandPriceChart, ChartStyle};
use crate::summary::{summarize, NumericStats, Summary};

// ─── Types ──────────────────────────────────────────────────────────────────

/// A record as listed in the rating-sorted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    pub index: usize,
    pub id: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub average_rating: Option<f64>,
    pub reviews_count: Option<f64>,
    pub category: Option<String>,
}

impl RankedRecord {
    fn new(index: usize, record: &ProductRecord) -> Self {
        Self {
            index,
            id: record.id.clone(),
            brand: record.brand.clone(),
            price: record.price,
            average_rating: record.average_rating,
            reviews_count: record.reviews_count,
            category: record.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReport {
    pub segment_id: SegmentId,
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub predicate: Option<String>,
    pub area_of_interest: bool,
    pub summary: Summary,
    pub top_rated: Vec<RankedRecord>,
    pub chart: BrandPriceChart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub dataset_records: usize,
    pub normalized_records: usize,
    pub segments: Vec<SegmentReport>,
    pub benchmark: Option<PriceBenchmark>,
    /// Why no benchmark could be computed, when `benchmark` is `None`.
    pub benchmark_error: Option<String>,
    pub chart_style: ChartStyle,
}

// ─── Report Builder ─────────────────────────────────────────────────────────

pub struct ReportBuilder<'a> {
    engine: &'a SegmentationEngine,
    chart_style: ChartStyle,
    top_n: usize,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(engine: &'a SegmentationEngine) -> Self {
        Self {
            engine,
            chart_style: ChartStyle::default(),
            top_n: 10,
        }
    }

    pub fn chart_style(mut self, style: ChartStyle) -> Self {
        self.chart_style = style;
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn segment_report(
        &self,
        id: SegmentId,
        area_of_interest: bool,
    ) -> CatalogResult<SegmentReport> {
        let segment = self.engine.segment(id)?;
        let path = self.engine.path_name(id)?;
        let summary = summarize(self.engine.records(id)?);

        let dataset = self.engine.dataset();
        let top_rated = summary
            .rating_sorted
            .iter()
            .take(self.top_n)
            .filter_map(|&i| dataset.get(i).map(|r| RankedRecord::new(i, r)))
            .collect();
        let chart =
            BrandPriceChart::from_records(path.clone(), self.engine.records(id)?.map(|(_, r)| r));

        Ok(SegmentReport {
            segment_id: id,
            name: segment.name.clone(),
            path,
            depth: segment.depth,
            predicate: segment.predicate.as_ref().map(|p| p.to_string()),
            area_of_interest,
            summary,
            top_rated,
            chart,
        })
    }

    /// Build the full report. `segments` fixes the report order; the price
    /// benchmark is taken over `areas`.
    pub fn build(
        &self,
        segments: &[SegmentId],
        areas: &[SegmentId],
        normalized_records: usize,
    ) -> CatalogResult<AnalysisReport> {
        let reports = segments
            .iter()
            .map(|&id| self.segment_report(id, areas.contains(&id)))
            .collect::<CatalogResult<Vec<_>>>()?;

        let (benchmark, benchmark_error) = match PriceBenchmark::from_summaries(
            reports
                .iter()
                .filter(|r| r.area_of_interest)
                .map(|r| (r.path.as_str(), &r.summary)),
        ) {
            Ok(b) => (Some(b), None),
            Err(e) => {
                warn!(error = %e, "Combined price mean unavailable");
                (None, Some(e.to_string()))
            }
        };

        let report = AnalysisReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            dataset_records: self.engine.dataset().len(),
            normalized_records,
            segments: reports,
            benchmark,
            benchmark_error,
            chart_style: self.chart_style.clone(),
        };
        info!(
            report_id = %report.report_id,
            segments = report.segments.len(),
            combined_mean = ?report.benchmark.as_ref().map(|b| b.combined_mean),
            "Analysis report generated"
        );
        Ok(report)
    }

    /// All records of one segment, highest rated first, as CSV.
    pub fn export_csv(&self, id: SegmentId) -> CatalogResult<String> {
        let summary = summarize(self.engine.records(id)?);
        let dataset = self.engine.dataset();
        let mut csv = String::from("index,id,brand,price,average_rating,reviews_count,category\n");
        for &i in &summary.rating_sorted {
            let Some(record) = dataset.get(i) else {
                continue;
            };
            let cells = [
                i.to_string(),
                csv_text(record.id.as_deref()),
                csv_text(record.brand.as_deref()),
                csv_number(record.price),
                csv_number(record.average_rating),
                csv_number(record.reviews_count),
                csv_text(record.category.as_deref()),
            ];
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        Ok(csv)
    }
}

fn csv_text(value: Option<&str>) -> String {
    match value {
        Some(s) => format!("\"{}\"", s.replace('"', "\"\"")),
        None => String::new(),
    }
}

fn csv_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ─── Export ─────────────────────────────────────────────────────────────────

impl AnalysisReport {
    pub fn segment(&self, path: &str) -> Option<&SegmentReport> {
        self.segments.iter().find(|s| s.path == path)
    }

    pub fn export_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write one Vega-Lite file per segment into `dir`. Returns the paths
    /// written.
    pub fn write_charts(&self, dir: impl AsRef<Path>) -> CatalogResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            let stem = file_stem(segment.segment_id, &segment.path);
            let path = dir.join(format!("{stem}.vl.json"));
            let doc = segment.chart.to_vega_lite(&self.chart_style);
            std::fs::write(&path, serde_json::to_vec_pretty(&doc)?)?;
            written.push(path);
        }
        info!(dir = %dir.display(), charts = written.len(), "Charts written");
        Ok(written)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Catalog segment analysis")?;
        writeln!(
            out,
            "report {}  generated {}",
            self.report_id,
            self.generated_at.to_rfc3339()
        )?;
        writeln!(
            out,
            "{} records, {} with normalized product details",
            self.dataset_records, self.normalized_records
        )?;

        for segment in &self.segments {
            writeln!(out)?;
            write_segment(out, segment)?;
        }

        writeln!(out)?;
        writeln!(out, "== Combined price mean ==")?;
        match &self.benchmark {
            Some(b) => {
                for entry in &b.included {
                    writeln!(out, "  {:<28} {:>10.2}", entry.segment, entry.price_mean)?;
                }
                for name in &b.excluded {
                    writeln!(out, "  {:<28} {:>10}", name, "excluded")?;
                }
                writeln!(
                    out,
                    "  {:<28} {:>10.3}",
                    format!("mean of {} areas", b.included.len()),
                    b.combined_mean
                )?;
            }
            None => {
                let reason = self.benchmark_error.as_deref().unwrap_or("no areas of interest");
                writeln!(out, "  n/a ({reason})")?;
            }
        }
        Ok(())
    }
}

fn write_segment(out: &mut String, segment: &SegmentReport) -> std::fmt::Result {
    let summary = &segment.summary;
    writeln!(out, "== {} ({} records) ==", segment.path, summary.record_count)?;
    if let Some(p) = &segment.predicate {
        writeln!(out, "filter: {p}")?;
    }

    writeln!(out, "Null values")?;
    for field in ProductField::ALL {
        writeln!(out, "  {:<16} {:>8}", field.name(), summary.nulls(field))?;
    }

    writeln!(out, "Statistics")?;
    writeln!(
        out,
        "  {:<16} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "field", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for stats in &summary.numeric {
        write_stats(out, stats)?;
    }

    writeln!(out, "Categories ({})", summary.categories.len())?;
    for category in &summary.categories {
        writeln!(out, "  - {category}")?;
    }
    writeln!(out, "Brands ({})", summary.brands.len())?;
    for brand in &summary.brands {
        writeln!(out, "  - {brand}")?;
    }

    if !segment.top_rated.is_empty() {
        writeln!(out, "Top {} by average rating", segment.top_rated.len())?;
        for r in &segment.top_rated {
            writeln!(
                out,
                "  {:>6} {:>8} {:>10}  {:<24} {}",
                fmt_opt(r.average_rating),
                fmt_count(r.reviews_count),
                fmt_opt(r.price),
                r.brand.as_deref().unwrap_or("-"),
                r.id.as_deref().unwrap_or("-"),
            )?;
        }
    }
    Ok(())
}

fn write_stats(out: &mut String, s: &NumericStats) -> std::fmt::Result {
    writeln!(
        out,
        "  {:<16} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        s.field.name(),
        s.count,
        fmt_opt(s.mean),
        fmt_opt(s.std_dev),
        fmt_opt(s.min),
        fmt_opt(s.q1),
        fmt_opt(s.median),
        fmt_opt(s.q3),
        fmt_opt(s.max),
    )
}

/// Undefined statistics print as `n/a`, never as zero.
fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn fmt_count(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.0}"))
}

/// Output file stem for a segment. The id prefix keeps stems unique when
/// two paths slug to the same text.
pub fn file_stem(id: SegmentId, path: &str) -> String {
    format!("{:02}-{}", id.0, slug(path))
}

/// File-name-safe form of a segment path: `Gift / Painting` → `gift-painting`.
pub fn slug(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "segment".to_string()
    } else {
        trimmed.to_string()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::Dataset;
    use catalog_segmentation::SegmentBuilder;

    fn listing(description: &str, brand: &str, price: f64, rating: f64) -> ProductRecord {
        ProductRecord {
            id: Some(format!("{brand}-{price}")),
            description: Some(description.to_string()),
            brand: Some(brand.to_string()),
            price: Some(price),
            average_rating: Some(rating),
            reviews_count: Some(12.0),
            category: Some("Art & Collectibles / Painting".to_string()),
            ..Default::default()
        }
    }

    fn sample_engine() -> (SegmentationEngine, Vec<SegmentId>, Vec<SegmentId>) {
        let mut engine = SegmentationEngine::new(Dataset::from_records(vec![
            listing("Gift Painting, \"Koi\" watercolor", "Inkwell", 80.0, 4.5),
            listing("Gift Painting of cranes", "Atelier", 120.0, 5.0),
            listing("Gift wrap Paper", "Papercraft", 12.0, 4.0),
        ]));
        let plan = vec![
            SegmentBuilder::new("Gift")
                .child(SegmentBuilder::new("Painting"))
                .child(SegmentBuilder::new("Paper"))
                .build(),
            SegmentBuilder::new("Japanese").build(),
        ];
        let areas = engine.apply_plan(&plan).unwrap();
        let all: Vec<SegmentId> = engine.list_segments().iter().map(|s| s.id).collect();
        (engine, all, areas)
    }

    #[test]
    fn test_build_report() {
        let (engine, all, areas) = sample_engine();
        let report = ReportBuilder::new(&engine).build(&all, &areas, 0).unwrap();

        assert_eq!(report.dataset_records, 3);
        assert_eq!(report.segments.len(), 5);
        let painting = report.segment("Gift / Painting").unwrap();
        assert!(painting.area_of_interest);
        assert_eq!(painting.summary.record_count, 2);
        assert_eq!(painting.summary.price_mean(), Some(100.0));
        assert_eq!(painting.top_rated[0].brand.as_deref(), Some("Atelier"));
        assert_eq!(painting.chart.bars.len(), 2);
        assert!(!report.segment("Gift").unwrap().area_of_interest);

        let bench = report.benchmark.as_ref().unwrap();
        assert_eq!(bench.included.len(), 2);
        assert_eq!(bench.excluded, vec!["Japanese".to_string()]);
        assert!((bench.combined_mean - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_n_limits_listing() {
        let (engine, all, areas) = sample_engine();
        let report = ReportBuilder::new(&engine).top_n(1).build(&all, &areas, 0).unwrap();
        assert_eq!(report.segment("all").unwrap().top_rated.len(), 1);
        // The summary keeps the full ordering.
        assert_eq!(report.segment("all").unwrap().summary.rating_sorted, vec![1, 0, 2]);
    }

    #[test]
    fn test_text_marks_undefined_stats() {
        let (engine, all, areas) = sample_engine();
        let text = ReportBuilder::new(&engine)
            .build(&all, &areas, 0)
            .unwrap()
            .render_text();
        assert!(text.contains("== Japanese (0 records) =="));
        assert!(text.contains("n/a"));
        assert!(text.contains("== Gift / Painting (2 records) =="));
        assert!(text.contains("Combined price mean"));
        assert!(text.contains("excluded"));
    }

    #[test]
    fn test_json_export_uses_null_for_undefined() {
        let (engine, all, areas) = sample_engine();
        let report = ReportBuilder::new(&engine).build(&all, &areas, 0).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.export_json().unwrap()).unwrap();
        let japanese = json["segments"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["path"] == "Japanese")
            .unwrap();
        assert!(japanese["summary"]["numeric"][0]["mean"].is_null());
        assert_eq!(japanese["summary"]["numeric"][0]["count"], 0);
    }

    #[test]
    fn test_no_priced_areas_records_benchmark_error() {
        let mut engine = SegmentationEngine::new(Dataset::from_records(vec![ProductRecord {
            description: Some("Chinese scroll".into()),
            ..Default::default()
        }]));
        let areas = engine
            .apply_plan(&[SegmentBuilder::new("Chinese").build()])
            .unwrap();
        let report = ReportBuilder::new(&engine).build(&areas, &areas, 0).unwrap();
        assert!(report.benchmark.is_none());
        assert!(report.benchmark_error.is_some());
        assert!(report.render_text().contains("n/a ("));
    }

    #[test]
    fn test_csv_export_sorted_and_quoted() {
        let (engine, _, areas) = sample_engine();
        let csv = ReportBuilder::new(&engine).export_csv(areas[0]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("index,id,brand"));
        assert!(lines[1].starts_with("1,\"Atelier-120\",\"Atelier\",120,5,"));
        assert!(lines[2].starts_with("0,"));
    }

    #[test]
    fn test_unknown_segment_in_report() {
        let (engine, _, _) = sample_engine();
        assert!(ReportBuilder::new(&engine)
            .build(&[SegmentId(99)], &[], 0)
            .is_err());
    }

    #[test]
    fn test_write_charts() {
        let (engine, all, areas) = sample_engine();
        let report = ReportBuilder::new(&engine).build(&all, &areas, 0).unwrap();
        let dir = std::env::temp_dir().join(format!("catalog-lens-charts-{}", Uuid::new_v4()));
        let written = report.write_charts(&dir).unwrap();
        assert_eq!(written.len(), 5);
        assert!(dir.join("02-gift-painting.vl.json").exists());
        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join("02-gift-painting.vl.json")).unwrap())
                .unwrap();
        assert_eq!(doc["mark"], "bar");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_charts_with_colliding_slugs() {
        let mut engine = SegmentationEngine::new(Dataset::from_records(vec![listing(
            "Gift Paper 中国 日本",
            "Inkwell",
            10.0,
            4.0,
        )]));
        let plan = vec![
            SegmentBuilder::new("Gift")
                .child(SegmentBuilder::new("Paper"))
                .build(),
            SegmentBuilder::new("Gift Paper").build(),
            SegmentBuilder::new("中国").build(),
            SegmentBuilder::new("日本").build(),
        ];
        let areas = engine.apply_plan(&plan).unwrap();
        let all: Vec<SegmentId> = engine.list_segments().iter().map(|s| s.id).collect();
        let report = ReportBuilder::new(&engine).build(&all, &areas, 0).unwrap();

        let dir = std::env::temp_dir().join(format!("catalog-lens-collide-{}", Uuid::new_v4()));
        let written = report.write_charts(&dir).unwrap();
        assert_eq!(written.len(), 6);
        let distinct: std::collections::HashSet<&PathBuf> = written.iter().collect();
        assert_eq!(distinct.len(), 6);
        for path in &written {
            assert!(path.exists());
        }
        assert!(dir.join("02-gift-paper.vl.json").exists());
        assert!(dir.join("03-gift-paper.vl.json").exists());
        assert!(dir.join("04-segment.vl.json").exists());
        assert!(dir.join("05-segment.vl.json").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_stem_prefixes_id() {
        assert_eq!(file_stem(SegmentId(3), "Gift / Paper"), "03-gift-paper");
        assert_eq!(file_stem(SegmentId(12), "日本"), "12-segment");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Gift / Painting"), "gift-painting");
        assert_eq!(slug("Color Print"), "color-print");
        assert_eq!(slug("  ++ "), "segment");
    }
}
