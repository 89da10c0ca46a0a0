//! Scan command - extract POI data from a single signage capture.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use poisnap_core::models::config::PoisnapConfig;
use poisnap_core::{
    AssistantBackend, AttemptOutcome, CancelFlag, CloudBackend, ExtractionInput, ExtractionPolicy,
    ExtractionReport, Orchestrator, PoiRecord, ReportSource, ResponseParser, RuleExtractor,
};

/// File extensions treated as OCR text input.
const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "ocr"];

/// File extensions treated as photo input.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input file (OCR text or photo)
    #[arg(required = true)]
    input: PathBuf,

    /// Attach a photo to a text input for image-capable backends
    #[arg(long)]
    image: Option<PathBuf>,

    /// Extraction policy: "none", "auto", or a backend name
    #[arg(short, long)]
    policy: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence and the backend attempt log
    #[arg(long)]
    show_confidence: bool,
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

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        PoisnapConfig::from_file(std::path::Path::new(path))?
    } else {
        PoisnapConfig::default()
    };

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning file: {}", args.input.display());

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Reading input...");
    pb.set_position(10);

    let input = read_input(&args.input, args.image.as_deref())?;

    let policy = match args.policy.as_deref() {
        Some(value) => ExtractionPolicy::parse(value),
        None => ExtractionPolicy::parse(&config.pipeline.default_policy),
    };
    debug!("Extraction policy: {}", policy);

    pb.set_message("Extracting POI data...");
    pb.set_position(40);

    let orchestrator = build_orchestrator(&config)?;
    let report = orchestrator
        .extract(&input, &policy, &CancelFlag::new())
        .await?;

    pb.set_position(100);
    pb.finish_with_message("Done");

    if !report.has_valid_data() {
        eprintln!(
            "{}",
            style("Warning: no name or address found in this capture.").yellow()
        );
    }

    let record = PoiRecord::from_candidate(&report.candidate);

    // Format output
    let output = format_record(&record, &report, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    // Show summary
    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            report.candidate.confidence * 100.0
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            report.processing_time_ms
        );
        for attempt in &report.attempts {
            println!(
                "{} {} ({}): {}",
                style("ℹ").blue(),
                attempt.backend,
                attempt.mode,
                describe_outcome(&attempt.outcome)
            );
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build an orchestrator with the remote backends wired from config.
///
/// The cloud backend is registered before the assistant backend, so an
/// auto-policy walk tries the API first and the local assistant server
/// second. On-device model backends need a loader binding and are not
/// wired by the CLI.
pub fn build_orchestrator(config: &PoisnapConfig) -> anyhow::Result<Orchestrator> {
    let parser =
        ResponseParser::new().with_plain_text_fallback(config.extraction.plain_text_fallback);
    let rules = RuleExtractor::new().with_name_max_lines(config.extraction.name_max_lines);

    let cloud = CloudBackend::new(config.cloud.clone())?.with_parser(parser.clone());
    let assistant = AssistantBackend::new(config.assistant.clone())?.with_parser(parser);

    Ok(Orchestrator::new()
        .with_rule_extractor(rules)
        .with_generation_timeout(config.pipeline.generation_timeout())
        .with_backend(Arc::new(cloud))
        .with_backend(Arc::new(assistant)))
}

/// Read a capture from disk, dispatching on the file extension.
pub fn read_input(path: &Path, image: Option<&Path>) -> anyhow::Result<ExtractionInput> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut input = if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            anyhow::bail!("Input file is empty: {}", path.display());
        }
        ExtractionInput::from_text(text)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        ExtractionInput::from_image(read_image(path)?)
    } else {
        anyhow::bail!("Unsupported file format: {}", extension);
    };

    if let Some(image_path) = image {
        if input.image.is_some() {
            anyhow::bail!("--image only applies to a text input");
        }
        input = input.with_image(read_image(image_path)?);
    }

    Ok(input)
}

/// Read photo bytes, rejecting files that do not decode as an image.
fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    image::load_from_memory(&bytes)
        .map_err(|e| anyhow::anyhow!("Cannot decode image {}: {}", path.display(), e))?;
    Ok(bytes)
}

fn describe_outcome(outcome: &AttemptOutcome) -> String {
    match outcome {
        AttemptOutcome::Accepted => "accepted".to_string(),
        AttemptOutcome::NoValidData => "no valid data".to_string(),
        AttemptOutcome::Unavailable => "unavailable".to_string(),
        AttemptOutcome::Failed(reason) => format!("failed: {}", reason),
    }
}

fn describe_source(source: &ReportSource) -> String {
    match source {
        ReportSource::Rules => "rules".to_string(),
        ReportSource::ImageDirect(name) => format!("image read by {}", name),
        ReportSource::Merged(name) => format!("rules merged with {}", name),
        ReportSource::Empty => "no usable data".to_string(),
    }
}

pub(crate) fn format_record(
    record: &PoiRecord,
    report: &ExtractionReport,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record, report),
        OutputFormat::Text => Ok(format_text(record, report)),
    }
}

fn format_csv(record: &PoiRecord, report: &ExtractionReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "name",
        "address",
        "phone_number",
        "business_hours",
        "category",
        "price_range",
        "confidence",
    ])?;

    // Write data
    wtr.write_record([
        record.name.as_deref().unwrap_or(""),
        record.address.as_deref().unwrap_or(""),
        record.phone_number.as_deref().unwrap_or(""),
        record.business_hours.as_deref().unwrap_or(""),
        record.category.as_deref().unwrap_or(""),
        record.price_range.as_deref().unwrap_or(""),
        &format!("{:.2}", report.candidate.confidence),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &PoiRecord, report: &ExtractionReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Name:     {}\n",
        record.name.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Address:  {}\n",
        record.address.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Phone:    {}\n",
        record.phone_number.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Hours:    {}\n",
        record.business_hours.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Category: {}\n",
        record.category.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Price:    {}\n",
        record.price_range.as_deref().unwrap_or("-")
    ));
    output.push('\n');
    output.push_str(&format!("Source: {}\n", describe_source(&report.source)));

    output
}
