use anyhow::{Context, Result};
use clap::Parser;
use img_scrub::cli::Args;
use img_scrub::{interactive, logger, process_directory, ScrubConfig};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::configure(args.quiet, args.verbose);

    let config = build_config(&args)?;
    if config.quality().is_none() && args.quality.is_some() {
        img_scrub::warn!("--quality has no effect without --convert");
    }

    let report = process_directory(&config)
        .with_context(|| format!("Cannot scrub {}", config.directory().display()))?;
    report.print_summary();

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn build_config(args: &Args) -> Result<ScrubConfig> {
    if let Some(config) = args.to_config()? {
        return Ok(config);
    }

    let prompted = interactive::prompt_config().context("Failed to read settings")?;
    Ok(args.apply_run_options(prompted))
}
