//! Moving converter-generated image folders into the published image tree.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Errors while relocating images or cleaning the image tree.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl RelocateError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| RelocateError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a relocation copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocation {
    /// Target directories written, one per relocated source subdirectory.
    pub directories: Vec<PathBuf>,
    pub files_copied: usize,
}

/// Copies every immediate subdirectory of `source_dir` into `target_dir`.
///
/// The converter writes images for `page.md` into a sibling `page_files/`
/// folder; each such folder ends up at `target_dir/page_files/`. Existing
/// files are overwritten. Hidden directories are skipped. There is no
/// rollback: files copied before an error stay in place.
pub fn relocate_images(source_dir: &Path, target_dir: &Path) -> Result<Relocation, RelocateError> {
    if !source_dir.is_dir() {
        return Err(RelocateError::SourceNotFound {
            path: source_dir.to_path_buf(),
        });
    }

    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(source_dir).map_err(RelocateError::io(source_dir))? {
        let entry = entry.map_err(RelocateError::io(source_dir))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_dir() && !hidden {
            subdirs.push(path);
        }
    }
    subdirs.sort();

    let mut relocation = Relocation::default();
    for subdir in subdirs {
        let Some(name) = subdir.file_name() else {
            continue;
        };
        let destination = target_dir.join(name);
        relocation.files_copied += copy_tree(&subdir, &destination)?;
        tracing::debug!(
            from = %subdir.display(),
            to = %destination.display(),
            "relocated image directory"
        );
        relocation.directories.push(destination);
    }

    Ok(relocation)
}

/// Recursively copies `source` into `destination`, returning the file count.
fn copy_tree(source: &Path, destination: &Path) -> Result<usize, RelocateError> {
    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| RelocateError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(RelocateError::io(&target))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target).map_err(RelocateError::io(&target))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Deletes every Markdown file under the image root.
///
/// Relocation copies whole subdirectories, so Markdown pages from nested
/// sections can land in the image tree. A missing image root has nothing to
/// clean. Returns the deleted paths.
pub fn clean_stray_markdown(image_root: &Path) -> Result<Vec<PathBuf>, RelocateError> {
    if !image_root.exists() {
        return Ok(Vec::new());
    }

    let mut stray = Vec::new();
    for entry in WalkDir::new(image_root) {
        let entry = entry.map_err(|e| RelocateError::Walk {
            path: image_root.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file() && has_md_extension(&entry) {
            stray.push(entry.into_path());
        }
    }

    for path in &stray {
        std::fs::remove_file(path).map_err(RelocateError::io(path))?;
    }

    Ok(stray)
}

fn has_md_extension(entry: &DirEntry) -> bool {
    entry.path().extension().is_some_and(|e| e == "md")
}
