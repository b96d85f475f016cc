//! Command handlers for the CLI.

mod clean;
mod list;
mod rewrite;
mod run;

use anyhow::{Context, Result};
use clap::CommandFactory;
use std::io;
use std::path::PathBuf;

use crate::cli::config::Config;
use crate::cli::output::OutputFormat;
use crate::cli::{Cli, CompletionsArgs};
use crate::domain::{ExportJob, JobManifest};
use crate::export::{JobOutcome, JobStatus, RunObserver};

// Re-export public items
pub use clean::handle_clean;
pub use list::handle_list;
pub use rewrite::handle_rewrite;
pub use run::handle_run;

pub fn handle_completions(args: &CompletionsArgs) -> Result<()> {
    clap_complete::generate(args.shell, &mut Cli::command(), "nbexport", &mut io::stdout());
    Ok(())
}

// ===========================================
// Shared Utilities
// ===========================================

/// Loads the manifest named on the command line or in the config file.
pub(crate) fn load_manifest(config: &Config, cli_manifest: Option<&PathBuf>) -> Result<JobManifest> {
    let path = config.manifest_path(cli_manifest);
    let manifest = JobManifest::load(&path)
        .with_context(|| format!("failed to load job manifest: {}", path.display()))?;
    tracing::debug!(path = %path.display(), jobs = manifest.len(), "loaded manifest");
    Ok(manifest)
}

/// Prints a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Progress reporter that prints one line per job.
///
/// Only human output shows progress; JSON and paths output stay machine
/// readable.
pub(crate) struct ConsoleReporter {
    format: OutputFormat,
}

impl ConsoleReporter {
    pub(crate) fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn enabled(&self) -> bool {
        matches!(self.format, OutputFormat::Human)
    }
}

impl RunObserver for ConsoleReporter {
    fn on_job_start(&mut self, position: usize, total: usize, job: &ExportJob) {
        if self.enabled() {
            println!("[{}/{}] {}", position, total, job);
        }
    }

    fn on_job_finish(&mut self, outcome: &JobOutcome) {
        if !self.enabled() {
            return;
        }
        match &outcome.status {
            JobStatus::Succeeded(success) => {
                let state = if success.changed { "updated" } else { "unchanged" };
                println!(
                    "  {} ({} rules, {} images)",
                    state,
                    success.rules_applied.len(),
                    success.images_copied
                );
            }
            JobStatus::Failed { error, .. } => eprintln!("  error: {}", error),
            JobStatus::Skipped => {}
        }
    }
}
