//! pdf-to-text command-line host
//!
//! Run with: cargo run -p pdf-to-text -- single report.pdf --mode both

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_to_text::{
    BatchJob, BatchReport, CancellationFlag, ExtractConfig, ExtractionMode, FailurePolicy,
    JobController, JobHandle, SingleJob,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lines of a single-document result shown when it is neither saved nor printed
const PREVIEW_LINES: usize = 20;

#[derive(Parser)]
#[command(name = "pdf-to-text", version, about = "Extract text and tables from PDF files")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract one document
    Single {
        /// PDF file to read
        file: PathBuf,

        /// text, tables or both
        #[arg(short, long)]
        mode: Option<ExtractionMode>,

        /// Save the extracted content here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full content to stdout
        #[arg(long)]
        print: bool,
    },

    /// Extract every PDF in a folder, one text file each
    Batch {
        /// Folder holding the PDF files
        folder: PathBuf,

        /// Folder receiving the text files
        dest: PathBuf,

        /// text, tables or both
        #[arg(short, long)]
        mode: Option<ExtractionMode>,

        /// Record failing files and keep going
        #[arg(long)]
        continue_on_error: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ExtractConfig::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    let mut controller = JobController::from_config(config);

    match cli.command {
        Command::Single {
            file,
            mode,
            output,
            print,
        } => {
            let mode = mode.unwrap_or(controller.config().extraction.default_mode);
            controller.submit_single(SingleJob::new(&file, mode))?;
            let handle = controller
                .take_single()
                .context("single job was not registered")?;

            let content = follow(handle, &format!("{}", file.display())).await?;
            finish_single(&content, output, print)
        }
        Command::Batch {
            folder,
            dest,
            mode,
            continue_on_error,
        } => {
            let defaults = controller.config();
            let mode = mode.unwrap_or(defaults.extraction.default_mode);
            let policy = if continue_on_error {
                FailurePolicy::Continue
            } else {
                defaults.batch.failure_policy
            };

            let job = BatchJob::new(&folder, mode, &dest).with_failure_policy(policy);
            controller.submit_batch(job)?;
            let handle = controller
                .take_batch()
                .context("batch job was not registered")?;

            let report = follow(handle, &format!("{}", folder.display())).await?;
            print_report(&report);
            Ok(())
        }
    }
}

fn init_tracing(config: &ExtractConfig, verbose: u8) {
    let fallback = match verbose {
        0 => config.logging.filter.clone(),
        1 => "pdf_to_text=debug".to_string(),
        _ => "pdf_to_text=trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Await a job behind a progress bar; Ctrl+C cancels it
async fn follow<T>(handle: JobHandle<T>, label: &str) -> anyhow::Result<T> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos:>3}%")?
            .progress_chars("#>-"),
    );
    bar.set_message(label.to_string());

    let interrupt = cancel_on_ctrl_c(handle.cancellation());
    let result = handle.wait(|percent| bar.set_position(u64::from(percent))).await;
    interrupt.abort();

    match result {
        Ok(payload) => {
            bar.finish_and_clear();
            Ok(payload)
        }
        Err(e) => {
            bar.abandon();
            Err(e.into())
        }
    }
}

fn cancel_on_ctrl_c(cancel: CancellationFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    })
}

fn finish_single(content: &str, output: Option<PathBuf>, print: bool) -> anyhow::Result<()> {
    if let Some(path) = &output {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        println!("{} {}", style("Saved").green().bold(), path.display());
    }

    if content.is_empty() {
        println!("{}", style("No content extracted").yellow());
        return Ok(());
    }

    if print {
        print!("{}", content);
    } else if output.is_none() {
        let lines: Vec<&str> = content.lines().collect();
        for line in lines.iter().take(PREVIEW_LINES) {
            println!("{}", line);
        }
        if lines.len() > PREVIEW_LINES {
            println!(
                "{}",
                style(format!(
                    "... {} more lines (use --print or --output)",
                    lines.len() - PREVIEW_LINES
                ))
                .dim()
            );
        }
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    println!(
        "{} {} file(s) written",
        style("Done:").green().bold(),
        report.written.len()
    );
    for path in &report.written {
        println!("  {}", path.display());
    }

    if !report.is_clean() {
        println!(
            "{} {} file(s) failed",
            style("Skipped:").yellow().bold(),
            report.failed.len()
        );
        for failure in &report.failed {
            println!("  {} [{}] {}", failure.source.display(), failure.kind, failure.message);
        }
    }
}
