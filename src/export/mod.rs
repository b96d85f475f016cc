//! Export runs: drive each manifest job through conversion, rewriting, and
//! image relocation, and collect a report.

mod report;
mod runner;

pub use report::{JobError, JobOutcome, JobStatus, JobSuccess, RunReport};
pub use runner::{ExportPaths, JobRunner, NoopObserver, RunObserver};
