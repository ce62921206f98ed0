//! Filing verification CLI
//!
//! Entry point for batch processing and one-off locator checks.

use clap::{Parser, Subcommand};
use filing_cli::{collect_inputs, locate_json, run_batch, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "filing-cli")]
#[command(
    version,
    about = "Verify collaborator proposals against OCR'd legal filings and merge footnotes"
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process paginated Markdown files or directories of them
    Process {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Documents processed at once (overrides config)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Run the pipeline without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check one search text against a document and print the result as JSON
    Locate {
        file: PathBuf,

        /// Page the text is expected on
        #[arg(short, long)]
        page: u32,

        /// Text to find
        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries results; logs go to stderr
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Process {
            inputs,
            output_dir,
            jobs,
            dry_run,
        } => {
            if let Some(dir) = output_dir {
                config.output.dir = Some(dir);
            }
            if let Some(jobs) = jobs {
                config.batch.jobs = jobs;
            }

            let files = collect_inputs(&inputs, &config)?;
            if files.is_empty() {
                eprintln!("No input documents found");
                std::process::exit(1);
            }

            let jobs = config.batch.jobs;
            let report = run_batch(files, Arc::new(config), jobs, dry_run).await?;

            for summary in &report.summaries {
                println!("{}", summary);
            }
            for (input, error) in &report.errors {
                println!("{}: failed to process ({})", input.display(), error);
            }
            println!(
                "{} succeeded, {} failed, {} not started",
                report.succeeded(),
                report.failed(),
                report.skipped
            );

            if !report.is_clean() {
                std::process::exit(1);
            }
        }
        Command::Locate { file, page, text } => {
            println!("{}", locate_json(&file, page, &text)?);
        }
    }

    Ok(())
}
