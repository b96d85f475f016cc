//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::ExportJob;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
    /// Plain file paths, one per line
    Paths,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A single job in listing output.
#[derive(Debug, Serialize)]
pub struct JobListing {
    pub input: String,
    pub target: String,
    pub enabled: bool,
}

impl From<&ExportJob> for JobListing {
    fn from(job: &ExportJob) -> Self {
        Self {
            input: job.input().display().to_string(),
            target: job.target_str(),
            enabled: job.enabled(),
        }
    }
}

/// Result of the `rewrite` command.
#[derive(Debug, Serialize)]
pub struct RewriteListing {
    pub path: String,
    pub rules_applied: Vec<&'static str>,
}

/// Result of the `clean` command.
#[derive(Debug, Serialize)]
pub struct CleanListing {
    pub removed: Vec<String>,
}
