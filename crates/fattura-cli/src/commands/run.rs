//! Run command - extract, filter and aggregate every invoice under a root.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use fattura_core::{
    BatchError, BatchObserver, BatchResult, BatchWalker, DateRange, DocumentStatus, ExportBundle,
    ExportSink, sort_totals,
};

use crate::sinks::{CsvSink, JsonSink, TextSink};

use super::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory searched recursively for invoice documents
    #[arg(required = true)]
    root: PathBuf,

    /// First issue date to include (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    from: String,

    /// Last issue date to include (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE")]
    to: String,

    /// Output directory for CSV files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format; json and text are written to stdout
    #[arg(short, long, value_enum, default_value = "csv")]
    format: RunFormat,

    /// Also export one row per accepted invoice
    #[arg(long)]
    details: bool,

    /// Exit with an error when any document failed
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RunFormat {
    /// Summary (and details) CSV files
    Csv,
    /// JSON on stdout
    Json,
    /// Plain text tables on stdout
    Text,
}

/// Drives a progress bar from batch notifications.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
                .progress_chars("=>-"),
        );
        Ok(Self { bar })
    }
}

impl BatchObserver for ProgressObserver {
    fn on_start(&mut self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_document(&mut self, path: &Path, status: DocumentStatus) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.bar.set_message(name.to_string());
        }
        if let DocumentStatus::Failed(kind) = status {
            debug!("{} failed ({})", path.display(), kind);
        }
        self.bar.inc(1);
    }

    fn on_finish(&mut self, _result: &BatchResult) {
        self.bar.finish_and_clear();
    }
}

pub fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Parameters are checked before any file is touched.
    let range = DateRange::parse(&args.from, &args.to).map_err(describe)?;

    let mut config = load_config(config_path)?;
    if let Some(output_dir) = args.output_dir.clone() {
        config.export.output_dir = Some(output_dir);
    }

    let walker = BatchWalker::new(&config);
    let mut observer = ProgressObserver::new()?;
    let result = walker
        .run_with_observer(&args.root, &range, &mut observer)
        .map_err(describe)?;

    let mut totals = result.totals()?;
    if config.export.sort_totals {
        sort_totals(&mut totals);
    }

    let mut bundle = ExportBundle::new(&totals);
    if args.details {
        bundle = bundle.with_records(&result.records);
    }

    match args.format {
        RunFormat::Csv => {
            let mut sink = CsvSink::new(
                config.export_path(&config.export.summary_file),
                config.export_path(&config.export.details_file),
            );
            sink.export(&bundle)?;
            for path in sink.written() {
                eprintln!("{} Written {}", style("✓").green(), path.display());
            }
        }
        RunFormat::Json => JsonSink::new(io::stdout().lock()).export(&bundle)?,
        RunFormat::Text => TextSink::new(io::stdout().lock()).export(&bundle)?,
    }

    print_summary(&result, &range, start);

    if args.strict && result.has_failures() {
        anyhow::bail!("{} documents failed", result.failures.len());
    }

    Ok(())
}

/// Attach a user-facing prefix matching the kind of batch error.
fn describe(err: BatchError) -> anyhow::Error {
    if err.is_invocation_error() {
        anyhow::anyhow!("Invalid date range: {}", err)
    } else {
        anyhow::anyhow!("Batch failed: {}", err)
    }
}

fn print_summary(result: &BatchResult, range: &DateRange, start: Instant) {
    let stats = &result.stats;

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        stats.discovered,
        start.elapsed()
    );
    eprintln!(
        "   {} accepted, {} outside {}, {} skipped, {} failed",
        style(stats.accepted()).green(),
        stats.out_of_range,
        range,
        stats.skipped,
        style(stats.failed).red()
    );

    if result.has_failures() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for failure in &result.failures {
            eprintln!("  - {}", failure);
        }
    }
}
