//! Job runner: convert, rewrite, relocate, one job at a time.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::report::{JobError, JobOutcome, JobSuccess, RunReport};
use crate::convert::{CommandOutput, ConversionRequest, Converter};
use crate::domain::{ExportJob, JobManifest};
use crate::infra::{
    ContentHash, clean_stray_markdown, read_document, relocate_images, write_document,
};
use crate::rewrite::Rewriter;

/// Number of stderr lines kept in conversion failure messages.
const STDERR_TAIL_LINES: usize = 5;

/// Where a run reads notebooks from and writes published files to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Base for job input paths.
    pub project_dir: PathBuf,
    /// Root of the published Markdown tree.
    pub docs_root: PathBuf,
    /// Root of the published image tree.
    pub image_root: PathBuf,
}

impl ExportPaths {
    pub fn input(&self, job: &ExportJob) -> PathBuf {
        self.project_dir.join(job.input())
    }

    pub fn docs_dir(&self, job: &ExportJob) -> PathBuf {
        self.docs_root.join(job.output_dir_path())
    }

    pub fn image_dir(&self, job: &ExportJob) -> PathBuf {
        self.image_root.join(job.output_dir_path())
    }
}

/// Receives progress updates while a run is in flight.
pub trait RunObserver {
    /// Called before an enabled job starts.
    fn on_job_start(&mut self, position: usize, total: usize, job: &ExportJob);
    /// Called after every job, including skipped ones.
    fn on_job_finish(&mut self, outcome: &JobOutcome);
}

/// An observer that ignores everything.
#[derive(Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_job_start(&mut self, _position: usize, _total: usize, _job: &ExportJob) {}
    fn on_job_finish(&mut self, _outcome: &JobOutcome) {}
}

/// Drives every job in a manifest through conversion, rewriting, and image
/// relocation.
///
/// Jobs run strictly in order. A failing job is recorded in the report and
/// the run continues with the next one.
pub struct JobRunner<'a, C: Converter> {
    converter: &'a C,
    rewriter: &'a Rewriter,
    paths: &'a ExportPaths,
}

impl<'a, C: Converter> JobRunner<'a, C> {
    pub fn new(converter: &'a C, rewriter: &'a Rewriter, paths: &'a ExportPaths) -> Self {
        Self {
            converter,
            rewriter,
            paths,
        }
    }

    /// Runs every job, then removes stray Markdown from the image tree.
    pub fn run(&self, manifest: &JobManifest) -> RunReport {
        self.run_with_observer(manifest, &mut NoopObserver)
    }

    pub fn run_with_observer<O: RunObserver>(
        &self,
        manifest: &JobManifest,
        observer: &mut O,
    ) -> RunReport {
        let started_at = Utc::now();
        let total = manifest.enabled().count();
        let mut position = 0;
        let mut jobs = Vec::with_capacity(manifest.len());

        for job in manifest.jobs() {
            let outcome = if job.enabled() {
                position += 1;
                observer.on_job_start(position, total, job);
                match self.run_job(job) {
                    Ok(success) => JobOutcome::new(job, Ok(success)),
                    Err(err) => {
                        tracing::warn!(job = %job, kind = err.kind(), "{err}");
                        JobOutcome::new(job, Err(&err))
                    }
                }
            } else {
                tracing::debug!(job = %job, "skipping disabled job");
                JobOutcome::skipped(job)
            };
            observer.on_job_finish(&outcome);
            jobs.push(outcome);
        }

        let (cleaned, cleanup_error) = match clean_stray_markdown(&self.paths.image_root) {
            Ok(cleaned) => (cleaned, None),
            Err(err) => {
                tracing::warn!("image cleanup failed: {err}");
                (Vec::new(), Some(err.to_string()))
            }
        };

        RunReport {
            profile: self.rewriter.profile(),
            started_at,
            finished_at: Utc::now(),
            jobs,
            cleaned,
            cleanup_error,
        }
    }

    /// Converter invocations for every enabled job, without running them.
    pub fn dry_run(&self, manifest: &JobManifest) -> Vec<String> {
        manifest
            .enabled()
            .map(|job| self.converter.describe(&self.request(job)))
            .collect()
    }

    fn request(&self, job: &ExportJob) -> ConversionRequest {
        ConversionRequest {
            input: self.paths.input(job),
            output_dir: self.paths.docs_dir(job),
            output_file: job.output_file().to_string(),
        }
    }

    /// Converts, rewrites, and relocates a single job.
    pub fn run_job(&self, job: &ExportJob) -> Result<JobSuccess, JobError> {
        tracing::info!(job = %job, "exporting");
        let request = self.request(job);
        let output_path = request.output_path();
        let previous = ContentHash::of_file(&output_path).ok().flatten();

        self.convert(&request)?;
        let (rules_applied, hash) = self.rewrite(&output_path, job)?;

        let docs_dir = self.paths.docs_dir(job);
        let relocation = relocate_images(&docs_dir, &self.paths.image_dir(job)).map_err(
            |source| JobError::RelocationFailed {
                path: docs_dir.clone(),
                source,
            },
        )?;

        Ok(JobSuccess {
            rules_applied,
            images_copied: relocation.files_copied,
            changed: previous.as_ref() != Some(&hash),
        })
    }

    fn convert(&self, request: &ConversionRequest) -> Result<(), JobError> {
        let failed = |reason: String, output: Option<Box<CommandOutput>>| JobError::ConversionFailed {
            input: request.input.clone(),
            reason,
            output,
        };

        if !request.input.is_file() {
            return Err(failed("input document not found".to_string(), None));
        }

        std::fs::create_dir_all(&request.output_dir).map_err(|e| {
            failed(
                format!(
                    "cannot create output directory {}: {}",
                    request.output_dir.display(),
                    e
                ),
                None,
            )
        })?;

        let output = self
            .converter
            .convert(request)
            .map_err(|e| failed(e.to_string(), None))?;

        if !output.success {
            let status = output
                .status
                .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
            let tail = output.stderr_tail(STDERR_TAIL_LINES);
            let reason = if tail.is_empty() {
                format!("converter exited with {status}")
            } else {
                format!("converter exited with {status}: {tail}")
            };
            return Err(failed(reason, Some(Box::new(output))));
        }

        let output_path = request.output_path();
        if !output_path.is_file() {
            return Err(failed(
                format!("converter produced no output at {}", output_path.display()),
                Some(Box::new(output)),
            ));
        }

        Ok(())
    }

    /// Rewrites the converted file in place. Returns the rules that changed it
    /// and the hash of the published text.
    fn rewrite(
        &self,
        path: &Path,
        job: &ExportJob,
    ) -> Result<(Vec<&'static str>, ContentHash), JobError> {
        let rewrite_failed = |source| JobError::RewriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let text = read_document(path).map_err(rewrite_failed)?;
        let rewritten = self.rewriter.apply(&text, job.output_dir());
        let hash = ContentHash::compute(rewritten.text.as_bytes());
        write_document(path, &rewritten.text).map_err(rewrite_failed)?;

        Ok((rewritten.applied, hash))
    }
}
