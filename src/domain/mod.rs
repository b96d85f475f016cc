//! Core types: ExportJob, JobManifest, Profile

mod job;
mod manifest;
mod profile;

pub use job::{ExportJob, ParseJobError};
pub use manifest::{JobManifest, ManifestError};
pub use profile::{ImagePaths, Profile};
