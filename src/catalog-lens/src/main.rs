//! Catalog Lens — keyword segment analysis over an e-commerce product dataset.
//!
//! Loads the dataset, normalizes product details, applies the segment plan
//! and prints the report.

use std::path::{Path, PathBuf};

use anyhow::Context;
use catalog_core::config::{AppConfig, ReportFormat};
use catalog_core::Dataset;
use catalog_reporting::report_builder::file_stem;
use catalog_reporting::{ChartStyle, ReportBuilder};
use catalog_segmentation::{default_plan, load_plan, SegmentId, SegmentationEngine};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "catalog-lens")]
#[command(about = "Keyword segment analysis for e-commerce product datasets")]
#[command(version)]
struct Cli {
    /// Product dataset, a JSON array of records (overrides config)
    #[arg(long)]
    dataset: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON segment plan (overrides the built-in plan)
    #[arg(long)]
    plan: Option<String>,

    /// Report format (overrides config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory for Vega-Lite chart files
    #[arg(long)]
    chart_dir: Option<String>,

    /// Directory for per-area rating-sorted CSV files
    #[arg(long)]
    csv_dir: Option<String>,

    /// Rows in each rating-sorted listing
    #[arg(long)]
    top: Option<usize>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing. stdout carries the report, so logs go to stderr.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catalog_lens=info,catalog_core=info,catalog_segmentation=warn,catalog_reporting=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // Load configuration
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    // Apply CLI overrides
    if let Some(path) = cli.dataset {
        config.dataset.path = path;
    }
    if let Some(plan) = cli.plan {
        config.dataset.plan_path = Some(plan);
    }
    if let Some(format) = cli.format {
        config.report.format = format.into();
    }
    if let Some(dir) = cli.chart_dir {
        config.report.chart_dir = Some(dir);
    }
    if let Some(dir) = cli.csv_dir {
        config.report.csv_dir = Some(dir);
    }
    if let Some(top) = cli.top {
        config.report.top_n = top;
    }
    config.validate()?;

    info!(
        dataset = %config.dataset.path,
        plan = config.dataset.plan_path.as_deref().unwrap_or("built-in"),
        format = ?config.report.format,
        "Configuration loaded"
    );

    let mut dataset = Dataset::load_json(&config.dataset.path)
        .with_context(|| format!("loading dataset {}", config.dataset.path))?;
    let normalized = dataset.normalize_details(
        &config.dataset.detail_delimiter,
        &config.dataset.detail_replacement,
    );
    info!(normalized, "Product details normalized");

    let plan = match &config.dataset.plan_path {
        Some(path) => load_plan(path).with_context(|| format!("loading plan {path}"))?,
        None => default_plan(),
    };

    let mut engine = SegmentationEngine::new(dataset);
    let areas = engine.apply_plan(&plan)?;
    let segments: Vec<SegmentId> = engine.list_segments().iter().map(|s| s.id).collect();

    let builder = ReportBuilder::new(&engine)
        .chart_style(ChartStyle::from(&config.chart))
        .top_n(config.report.top_n);
    let report = builder.build(&segments, &areas, normalized)?;

    match config.report.format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", report.export_json()?),
    }

    if let Some(dir) = &config.report.chart_dir {
        report.write_charts(dir)?;
    }
    if let Some(dir) = &config.report.csv_dir {
        write_area_csvs(&engine, &builder, &areas, Path::new(dir))?;
    }

    Ok(())
}

fn write_area_csvs(
    engine: &SegmentationEngine,
    builder: &ReportBuilder<'_>,
    areas: &[SegmentId],
    dir: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for &id in areas {
        let path = dir.join(format!("{}.csv", file_stem(id, &engine.path_name(id)?)));
        std::fs::write(&path, builder.export_csv(id)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    info!(dir = %dir.display(), files = areas.len(), "Area CSVs written");
    Ok(())
}
