use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use config::ProgramConfig;
use error::{AppError, EXIT_OK, EXIT_TESTS_FAILED};
use indicatif::MultiProgress;
use segcheck_engine::SegmentChecker;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod config;
mod error;
mod output;
mod utils;

use cli::CliArgs;
use output::report::{open_output, render_collection, render_run};
use utils::progress::ProgressManager;

fn main() {
    match bootstrap() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            // Log the full error for debugging
            error!(error = ?e, "Application failed");
            std::process::exit(e.exit_code());
        }
    }
}

/// Install the global subscriber: stderr, optionally teed into `log_file`.
/// `RUST_LOG` takes precedence over `--verbose` when set.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), AppError> {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let result = match log_file {
        Some(path) => {
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            let multi_writer = MakeWriterExt::and(std::io::stderr, log_file);
            let subscriber = builder.with_writer(multi_writer).with_ansi(false).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = builder
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    result.map_err(|e| AppError::Initialization(e.to_string()))
}

#[tokio::main]
async fn bootstrap() -> Result<i32, AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    init_logging(args.verbose, args.log_file.as_deref())?;

    let config = ProgramConfig::from_args(&args)?;

    info!(
        master_url = %config.master_url,
        resolution = ?config.checker.url_resolution,
        concurrency = config.checker.concurrency,
        fail_fast = config.checker.fail_fast,
        "Starting HLS segment check"
    );

    // Create a progress manager based on show_progress flag
    let multi = MultiProgress::new();
    let progress_manager = if args.show_progress && !config.collect_only {
        ProgressManager::new(multi.clone())
    } else {
        ProgressManager::new_disabled(multi.clone())
    };

    let mut checker = SegmentChecker::from_config(config.checker.clone())
        .map_err(|e| AppError::Initialization(e.to_string()))?;
    if !progress_manager.is_disabled() {
        let progress = progress_manager.clone();
        checker = checker.with_event_handler(Arc::new(move |event| {
            progress.handle_event(event);
        }));
    }

    let cases = checker
        .discover(&config.master_url)
        .await
        .map_err(AppError::Collection)?;

    let mut out = open_output(config.output.as_deref())?;

    if config.collect_only {
        render_collection(&config.master_url, &cases, config.format, &mut out)?;
        return Ok(EXIT_OK);
    }

    let report = checker.run(&config.master_url, cases).await;
    progress_manager.finish();

    render_run(&report, config.format, &mut out)?;
    out.flush()?;

    Ok(if report.is_success() {
        EXIT_OK
    } else {
        EXIT_TESTS_FAILED
    })
}
