//! Extract command - read the record out of a single invoice file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use fattura_core::export::DETAIL_HEADERS;
use fattura_core::invoice::FieldReport;
use fattura_core::{DetailRow, Document, InvoiceRecord, RecordExtractor};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input FatturaPA XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show where each field was found instead of the record
    #[arg(long)]
    explain: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting {}", args.input.display());

    let bytes = fs::read(&args.input)?;
    let extractor = RecordExtractor::from_schema(&config.schema);

    if args.explain {
        let document = Document::parse(&bytes)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", args.input.display(), e))?;
        print!("{}", format_report(&extractor.explain(&document)));
        return Ok(());
    }

    let record = extractor
        .extract_bytes(&bytes)
        .map_err(|e| anyhow::anyhow!("{}: {}", args.input.display(), e))?;
    debug!("Extracted record {:?}", record);

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)? + "\n"),
        OutputFormat::Csv => format_record_csv(record),
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

fn format_record_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(DETAIL_HEADERS)?;
    wtr.write_record(DetailRow::from(record).fields())?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_record_text(record: &InvoiceRecord) -> String {
    let row = DetailRow::from(record);
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", row.document_number));
    output.push_str(&format!("Date: {}\n", row.issue_date));
    output.push('\n');

    output.push_str("Supplier:\n");
    output.push_str(&format!("  {}\n", row.supplier_name));
    output.push_str(&format!("  VAT: {}\n", row.supplier_tax_id));
    output.push_str(&format!("  Regime: {}\n", row.supplier_tax_regime));
    output.push('\n');

    output.push_str("Payment:\n");
    output.push_str(&format!("  Amount: {} {}\n", row.payment_amount, row.currency_code));
    output.push_str(&format!("  Due: {}\n", row.payment_due_date));

    output
}

fn format_report(report: &[FieldReport<'_>]) -> String {
    let width = report
        .iter()
        .map(|r| r.field.name().len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for entry in report {
        let line = match entry.resolved {
            Some(resolved) => format!(
                "{:<width$}  {:<11}  {}",
                entry.field.name(),
                tier_label(resolved.tier),
                resolved.value,
            ),
            None => format!("{:<width$}  {}", entry.field.name(), style("missing").red()),
        };
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

fn tier_label(tier: fattura_core::LookupTier) -> &'static str {
    match tier {
        fattura_core::LookupTier::Qualified => "qualified",
        fattura_core::LookupTier::Unqualified => "unqualified",
        fattura_core::LookupTier::Descendant => "descendant",
    }
}
