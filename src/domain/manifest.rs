//! Job manifest: the ordered list of export jobs, loaded from a data file.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::job::{ExportJob, JobEntry, ParseJobError};

/// Errors while loading a job manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("job {index} ({input}): {source}")]
    InvalidJob {
        index: usize,
        input: PathBuf,
        #[source]
        source: ParseJobError,
    },

    #[error("jobs {first} and {second} both write {target}")]
    DuplicateTarget {
        first: usize,
        second: usize,
        target: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    job: Vec<JobEntry>,
}

/// An ordered, validated list of export jobs.
///
/// The manifest is TOML by default:
///
/// ```toml
/// [[job]]
/// input = "wallaroo-101/Wallaroo-101.ipynb"
/// output_dir = "/wallaroo-101/"
/// output_file = "wallaroo-101-reference.md"
///
/// [[job]]
/// input = "tools/helper-functions-demo.ipynb"
/// output_dir = "/wallaroo-tutorials/tools"
/// output_file = "helper-functions-demo-reference.md"
/// enabled = false
/// ```
///
/// Files ending in `.yaml` or `.yml` use the same fields under a `job:` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobManifest {
    jobs: Vec<ExportJob>,
}

impl JobManifest {
    /// Loads a manifest, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ManifestError> {
        let file: ManifestFile = toml::from_str(contents)?;
        Self::from_entries(file.job)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ManifestError> {
        let file: Option<ManifestFile> = serde_yaml::from_str(contents)?;
        Self::from_entries(file.unwrap_or_default().job)
    }

    /// Builds a manifest from already-validated jobs.
    pub fn from_jobs(jobs: Vec<ExportJob>) -> Result<Self, ManifestError> {
        check_unique_targets(&jobs)?;
        Ok(Self { jobs })
    }

    fn from_entries(entries: Vec<JobEntry>) -> Result<Self, ManifestError> {
        let mut jobs = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let input = entry.input().to_path_buf();
            let job = entry.into_job().map_err(|source| ManifestError::InvalidJob {
                index: i + 1,
                input,
                source,
            })?;
            jobs.push(job);
        }
        Self::from_jobs(jobs)
    }

    /// All jobs in declaration order, enabled or not.
    pub fn jobs(&self) -> &[ExportJob] {
        &self.jobs
    }

    pub fn enabled(&self) -> impl Iterator<Item = &ExportJob> {
        self.jobs.iter().filter(|j| j.enabled())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Keeps only jobs matching at least one pattern. No patterns keeps everything.
    pub fn filter(self, patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return self;
        }
        let jobs = self
            .jobs
            .into_iter()
            .filter(|j| patterns.iter().any(|p| j.matches(p)))
            .collect();
        Self { jobs }
    }
}

/// Enabled jobs must not overwrite each other's output.
fn check_unique_targets(jobs: &[ExportJob]) -> Result<(), ManifestError> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (i, job) in jobs.iter().enumerate().filter(|(_, j)| j.enabled()) {
        let target = job.target_str();
        if let Some(&first) = seen.get(&target) {
            return Err(ManifestError::DuplicateTarget {
                first,
                second: i + 1,
                target,
            });
        }
        seen.insert(target, i + 1);
    }
    Ok(())
}
