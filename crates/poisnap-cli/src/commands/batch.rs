//! Batch command - process multiple signage captures.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use poisnap_core::models::config::PoisnapConfig;
use poisnap_core::{
    CancelFlag, ExtractionPolicy, ExtractionReport, Orchestrator, PoiRecord,
};

use super::scan::{build_orchestrator, read_input};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Extraction policy: "none", "auto", or a backend name
    #[arg(short, long)]
    policy: Option<String>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: super::scan::OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single capture.
struct ScanOutcome {
    path: PathBuf,
    record: Option<PoiRecord>,
    report: Option<ExtractionReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        PoisnapConfig::from_file(std::path::Path::new(path))?
    } else {
        PoisnapConfig::default()
    };

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(
                ext.to_lowercase().as_str(),
                "txt" | "text" | "ocr" | "png" | "jpg" | "jpeg" | "webp" | "bmp"
            )
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let policy = match args.policy.as_deref() {
        Some(value) => ExtractionPolicy::parse(value),
        None => ExtractionPolicy::parse(&config.pipeline.default_policy),
    };

    let orchestrator = build_orchestrator(&config)?;
    let cancel = CancelFlag::new();

    // Set up progress bar
    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Process files sequentially
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = scan_file(&path, &orchestrator, &policy, &cancel).await;

        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                results.push(ScanOutcome {
                    path: path.clone(),
                    record: Some(PoiRecord::from_candidate(&report.candidate)),
                    report: Some(report),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ScanOutcome {
                        path: path.clone(),
                        record: None,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        if let (Some(record), Some(report), Some(output_dir)) =
            (&result.record, &result.report, &args.output_dir)
        {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("poi");

            let extension = match args.format {
                super::scan::OutputFormat::Json => "json",
                super::scan::OutputFormat::Csv => "csv",
                super::scan::OutputFormat::Text => "txt",
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            let content = super::scan::format_record(record, report, args.format)?;

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn scan_file(
    path: &PathBuf,
    orchestrator: &Orchestrator,
    policy: &ExtractionPolicy,
    cancel: &CancelFlag,
) -> anyhow::Result<ExtractionReport> {
    let input = read_input(path, None)?;
    let report = orchestrator.extract(&input, policy, cancel).await?;
    Ok(report)
}

fn write_summary(path: &PathBuf, results: &[ScanOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "name",
        "address",
        "phone_number",
        "business_hours",
        "category",
        "price_range",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let (Some(record), Some(report)) = (&result.record, &result.report) {
            wtr.write_record([
                filename,
                "success",
                record.name.as_deref().unwrap_or(""),
                record.address.as_deref().unwrap_or(""),
                record.phone_number.as_deref().unwrap_or(""),
                record.business_hours.as_deref().unwrap_or(""),
                record.category.as_deref().unwrap_or(""),
                record.price_range.as_deref().unwrap_or(""),
                &format!("{:.2}", report.candidate.confidence),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
