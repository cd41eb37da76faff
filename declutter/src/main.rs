use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use declutter::config::Config;
use declutter::models::{ParseReport, ProcessedResult};
use declutter::output::{BundleWriter, CalendarWriter, IndexWriter, JournalWriter};
use declutter::processing::FileParser;

#[derive(Parser)]
#[command(name = "declutter")]
#[command(about = "Reduce a messy folder to bounded, LLM-ready text")]
struct Args {
    /// Directory with the files to process
    #[arg(default_value = "./desktop")]
    input_dir: PathBuf,

    /// Output directory (overrides DECLUTTER_OUTPUT_DIR)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Saved language-model reply to render as journals, calendar and index
    #[arg(long)]
    result: Option<PathBuf>,

    /// Parse files in parallel on the blocking pool
    #[arg(long)]
    concurrent: bool,
}

fn print_report(report: &ParseReport) {
    println!("Parsed {} files", report.parsed_count());
    for file in &report.files {
        println!(
            "  {:<40} {:<11} {} bytes",
            file.filename,
            file.file_type.to_string(),
            file.content.len()
        );
    }
    if !report.skipped.is_empty() {
        println!("Skipped {} files", report.skipped_count());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.filename, skipped.reason);
        }
    }
}

fn render_result(path: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let reply = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read result file {}", path.display()))?;
    let result = ProcessedResult::from_response_text(&reply)?;
    let now = chrono::Local::now().naive_local();

    println!();
    println!("Topics: {}", result.topics.join(", "));

    let journals = JournalWriter::new(output_dir).write(&result, now)?;
    println!("Journal files: {}", journals.len());
    for journal in &journals {
        println!("  {} ({} notes)", journal.path.display(), journal.notes_count);
    }

    let calendar = CalendarWriter::new(output_dir).write(&result, now)?;
    println!("Calendar: {}", calendar.display());
    println!("  {} events", result.calendar_events.len());

    let index = IndexWriter::new(output_dir);
    let stats = index.write(&result)?;
    println!("Index: {}", index.documents_path().display());
    println!(
        "  {} documents ({} notes, {} events)",
        stats.total_documents, stats.notes, stats.events
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "declutter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let output_dir = args.output.unwrap_or(config.output.output_dir);

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    println!("Input:  {}", args.input_dir.display());
    println!("Output: {}", output_dir.display());
    println!();

    let parser = FileParser::new(config.extraction)?;
    let report = if args.concurrent {
        Arc::new(parser)
            .parse_directory_concurrent(&args.input_dir, config.pipeline.workers)
            .await?
    } else {
        parser.parse_directory(&args.input_dir)?
    };
    print_report(&report);

    let (bundle_path, bundle_bytes) = BundleWriter::new(&output_dir).write(&report)?;
    println!();
    println!("Bundle: {} ({} bytes)", bundle_path.display(), bundle_bytes);

    if let Some(result_path) = &args.result {
        render_result(result_path, &output_dir)?;
    }

    Ok(())
}
