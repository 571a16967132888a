/*!
 * Command-line interface for mkctx
 */

use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use simplelog::{ConfigBuilder, WriteLogger};

use mkctx::config::{Args, Config};
use mkctx::error::{Result, ResultExt};
use mkctx::report::{ReportFormat, Reporter};
use mkctx::scanner::Scanner;
use mkctx::session::StatusInfo;
use mkctx::tree::build_tree;
use mkctx::types::Outcome;
use mkctx::writer::MarkdownWriter;
use mkctx::{tui, ContentSniffer, FileCommand};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mkctx: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the debug file logger when `MKCTX_LOG` is set
fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let log_file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    // Only fails when a logger is already installed
    let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    Ok(())
}

fn run() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Create and validate configuration
    let config = Config::from_args(args)?;
    config.validate()?;
    init_logging(&config)?;
    info!("mkctx {} starting in {}", mkctx::VERSION, config.base_dir.display());

    // Spinner on stderr while listing and classifying
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg:.dim} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));

    let scanner = Scanner::new(config.clone(), ContentSniffer, Arc::new(progress.clone()));
    let files = scanner.scan()?;
    progress.finish_and_clear();

    let tree = build_tree(scanner.start_prefix(), &files)?;
    let status = StatusInfo {
        in_repo: config.in_repo,
        allow_binary: config.allow_binary,
    };

    let session = tui::run(tree, status)?;
    if session.outcome() != Outcome::Confirmed {
        return Ok(());
    }

    let selected = session.selected_paths();
    let writer = MarkdownWriter::new(&config, ContentSniffer, FileCommand::default());
    let report = writer.write(&selected)?;

    info!(
        "{}",
        Reporter::new(ReportFormat::Summary).generate_report(&report)
    );
    Reporter::new(ReportFormat::KeyValue).print_report(&report);

    Ok(())
}
