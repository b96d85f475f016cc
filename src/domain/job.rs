//! Export job: one notebook in, one Markdown file out.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single conversion task declared in the job manifest.
///
/// Jobs are immutable once constructed. The output directory is stored
/// normalized: relative to the docs root, `/`-separated, with no leading or
/// trailing slash (the empty string is the docs root itself).
///
/// # Validation Rules
/// - `input` must be non-empty
/// - `output_dir` must not contain `..` or backslash separators
/// - `output_file` must be a bare filename with a `.md` extension
///
/// # Examples
///
/// ```
/// use nbexport::domain::ExportJob;
///
/// let job = ExportJob::new(
///     "wallaroo-101/Wallaroo-101.ipynb",
///     "/wallaroo-101/",
///     "wallaroo-101-reference.md",
/// )
/// .unwrap();
/// assert_eq!(job.output_dir(), "wallaroo-101");
/// assert!(job.enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    input: PathBuf,
    output_dir: String,
    output_file: String,
    enabled: bool,
}

/// Error returned when a job declaration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJobError(String);

impl fmt::Display for ParseJobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseJobError {}

/// Manifest field layout before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct JobEntry {
    input: PathBuf,
    output_dir: String,
    output_file: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl JobEntry {
    /// Input path as declared, for error messages.
    pub(crate) fn input(&self) -> &Path {
        &self.input
    }

    /// Validates the entry into an `ExportJob`.
    pub(crate) fn into_job(self) -> Result<ExportJob, ParseJobError> {
        let job = ExportJob::new(self.input, &self.output_dir, &self.output_file)?;
        Ok(job.with_enabled(self.enabled))
    }
}

impl ExportJob {
    /// Creates an enabled job after validating and normalizing its fields.
    ///
    /// # Errors
    ///
    /// Returns `ParseJobError` if any field violates the validation rules.
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: &str,
        output_file: &str,
    ) -> Result<Self, ParseJobError> {
        let input = input.into();
        if input.as_os_str().is_empty() {
            return Err(ParseJobError("job input path cannot be empty".to_string()));
        }

        let output_dir = normalize_output_dir(output_dir)?;
        validate_output_file(output_file)?;

        Ok(Self {
            input,
            output_dir,
            output_file: output_file.to_string(),
            enabled: true,
        })
    }

    /// Returns a copy of this job with the given enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Path of the source notebook, relative to the project directory.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Normalized output directory relative to the docs root.
    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    /// Output Markdown filename.
    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Output directory as a relative path.
    pub fn output_dir_path(&self) -> PathBuf {
        self.output_dir.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Output file path relative to the docs root.
    pub fn target(&self) -> PathBuf {
        self.output_dir_path().join(&self.output_file)
    }

    /// Output target in `/`-separated form, used for display and filtering.
    pub fn target_str(&self) -> String {
        if self.output_dir.is_empty() {
            self.output_file.clone()
        } else {
            format!("{}/{}", self.output_dir, self.output_file)
        }
    }

    /// Returns true if the pattern occurs in the input path or the output target.
    pub fn matches(&self, pattern: &str) -> bool {
        self.input.to_string_lossy().contains(pattern) || self.target_str().contains(pattern)
    }
}

impl fmt::Display for ExportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input.display(), self.target_str())
    }
}

fn normalize_output_dir(raw: &str) -> Result<String, ParseJobError> {
    if raw.contains('\\') {
        return Err(ParseJobError(format!(
            "invalid output directory '{}': use '/' as the separator",
            raw
        )));
    }

    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(ParseJobError(format!(
                    "invalid output directory '{}': '..' is not allowed",
                    raw
                )));
            }
            s if s.contains(':') => {
                return Err(ParseJobError(format!(
                    "invalid output directory '{}': must be relative to the docs root",
                    raw
                )));
            }
            s => segments.push(s),
        }
    }

    Ok(segments.join("/"))
}

fn validate_output_file(name: &str) -> Result<(), ParseJobError> {
    if name.contains('/') || name.contains('\\') {
        return Err(ParseJobError(format!(
            "invalid output file '{}': must be a filename, not a path",
            name
        )));
    }

    let path = Path::new(name);
    let has_stem = path.file_stem().is_some_and(|s| !s.is_empty() && s != ".md");
    if !has_stem || path.extension().is_none_or(|e| e != "md") {
        return Err(ParseJobError(format!(
            "invalid output file '{}': must have a .md extension",
            name
        )));
    }

    Ok(())
}
