//! Run command handler.

use anyhow::{Result, bail};
use std::path::PathBuf;

use super::{ConsoleReporter, load_manifest, print_json};
use crate::cli::RunArgs;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat};
use crate::convert::CommandConverter;
use crate::export::{JobRunner, JobStatus, RunReport};
use crate::rewrite::Rewriter;

pub fn handle_run(args: &RunArgs, cli_manifest: Option<&PathBuf>, config: &Config) -> Result<()> {
    let manifest = load_manifest(config, cli_manifest)?.filter(&args.jobs);
    if !args.jobs.is_empty() && manifest.is_empty() {
        bail!("no jobs match {}", args.jobs.join(", "));
    }

    let profile = config.profile(args.profile);
    let rewriter = Rewriter::new(profile, config.rewrite_settings(profile));
    let converter = CommandConverter::new(config.converter());
    let paths = config.export_paths();
    let runner = JobRunner::new(&converter, &rewriter, &paths);

    if args.dry_run {
        let commands = runner.dry_run(&manifest);
        match args.format {
            OutputFormat::Json => print_json(&Output::new(commands))?,
            OutputFormat::Human | OutputFormat::Paths => {
                for command in commands {
                    println!("{}", command);
                }
            }
        }
        return Ok(());
    }

    tracing::info!(profile = %profile, jobs = manifest.len(), "starting export run");
    let mut reporter = ConsoleReporter::new(args.format);
    let report = runner.run_with_observer(&manifest, &mut reporter);

    match args.format {
        OutputFormat::Human => print_summary(&report),
        OutputFormat::Json => print_json(&Output::new(&report))?,
        OutputFormat::Paths => {
            for outcome in &report.jobs {
                if matches!(outcome.status, JobStatus::Succeeded(_)) {
                    println!("{}", paths.docs_root.join(&outcome.target).display());
                }
            }
        }
    }

    if let Some(err) = &report.cleanup_error {
        bail!("image cleanup failed: {}", err);
    }
    if report.failed() > 0 {
        bail!(
            "{} of {} jobs failed",
            report.failed(),
            report.jobs.len() - report.skipped()
        );
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    if report.jobs.is_empty() {
        println!("No jobs in manifest.");
        return;
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "Exported {} jobs ({} failed, {} skipped) in {:.1}s with profile '{}'",
        report.succeeded(),
        report.failed(),
        report.skipped(),
        elapsed.num_milliseconds() as f64 / 1000.0,
        report.profile
    );

    if !report.cleaned.is_empty() {
        println!("Removed {} stray Markdown files from the image tree", report.cleaned.len());
    }

    for failure in report.failures() {
        if let JobStatus::Failed { kind, .. } = &failure.status {
            eprintln!("  {}: {} ({})", kind, failure.input.display(), failure.target);
        }
    }
}
