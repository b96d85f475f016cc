//! Per-job outcomes and the run summary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::convert::CommandOutput;
use crate::domain::{ExportJob, Profile};
use crate::infra::{DocumentError, RelocateError};

/// Why a job failed.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("conversion failed for {input}: {reason}")]
    ConversionFailed {
        input: PathBuf,
        reason: String,
        /// Captured converter run, when the converter was launched.
        output: Option<Box<CommandOutput>>,
    },

    #[error("rewrite failed for {path}: {source}")]
    RewriteFailed {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("image relocation failed for {path}: {source}")]
    RelocationFailed {
        path: PathBuf,
        #[source]
        source: RelocateError,
    },
}

impl JobError {
    /// Stable identifier of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::ConversionFailed { .. } => "conversion-failed",
            JobError::RewriteFailed { .. } => "rewrite-failed",
            JobError::RelocationFailed { .. } => "relocation-failed",
        }
    }

    /// The captured converter run behind a conversion failure, if any.
    pub fn converter_output(&self) -> Option<&CommandOutput> {
        match self {
            JobError::ConversionFailed { output, .. } => output.as_deref(),
            _ => None,
        }
    }
}

/// What a successful job did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSuccess {
    pub rules_applied: Vec<&'static str>,
    pub images_copied: usize,
    /// False when the published file is byte-identical to the previous run's.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Succeeded(JobSuccess),
    Failed {
        kind: &'static str,
        error: String,
        /// Converter command, exit status, and captured output.
        #[serde(skip_serializing_if = "Option::is_none")]
        converter: Option<CommandOutput>,
    },
    Skipped,
}

/// Result of one job in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub input: PathBuf,
    pub target: String,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn new(job: &ExportJob, result: Result<JobSuccess, &JobError>) -> Self {
        let status = match result {
            Ok(success) => JobStatus::Succeeded(success),
            Err(err) => JobStatus::Failed {
                kind: err.kind(),
                error: err.to_string(),
                converter: err.converter_output().cloned(),
            },
        };
        Self {
            input: job.input().to_path_buf(),
            target: job.target_str(),
            status,
        }
    }

    pub fn skipped(job: &ExportJob) -> Self {
        Self {
            input: job.input().to_path_buf(),
            target: job.target_str(),
            status: JobStatus::Skipped,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, JobStatus::Failed { .. })
    }
}

/// Summary of a whole export run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub profile: Profile,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub jobs: Vec<JobOutcome>,
    /// Markdown files removed from the image tree by the cleanup pass.
    pub cleaned: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Succeeded(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Skipped))
    }

    fn count(&self, pred: impl Fn(&JobStatus) -> bool) -> usize {
        self.jobs.iter().filter(|j| pred(&j.status)).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs.iter().filter(|j| j.is_failure())
    }

    /// True if any job failed or the cleanup pass failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || self.cleanup_error.is_some()
    }
}
