//! Isolated test environment with temp directory.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use super::ExportCommand;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Config that replaces nbconvert with a plain copy, so notebook fixtures
/// are Markdown files the converter passes through unchanged.
const COPY_CONVERTER_CONFIG: &str = r#"
[converter]
program = "cp"
args = ["{input}", "{output_path}"]
"#;

/// Isolated project directory for one test.
///
/// Creates a temp directory that is automatically cleaned up on drop, with
/// an `nbexport.toml` that uses `cp` as the converter.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Project root containing the config file
    root: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated project with the copy converter configured.
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// Creates a project whose config has extra top-level keys.
    ///
    /// `extra` is inserted before the `[converter]` table.
    pub fn with_config(extra: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        let env = Self {
            _temp_dir: temp_dir,
            root,
        };
        env.write_file("nbexport.toml", &format!("{}\n{}", extra, COPY_CONVERTER_CONFIG));
        env
    }

    /// Returns the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("nbexport.toml")
    }

    pub fn docs_root(&self) -> PathBuf {
        self.root.join("docs").join("markdown")
    }

    /// Default image root for the default site version.
    pub fn image_root(&self) -> PathBuf {
        self.root.join("images").join("2024.1")
    }

    /// Writes a file relative to the project root, creating parent
    /// directories, and returns its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes `export-jobs.toml` with one `[[job]]` per entry.
    ///
    /// Each entry is `(input, output_dir, output_file)`.
    pub fn write_manifest(&self, jobs: &[(&str, &str, &str)]) -> PathBuf {
        let mut manifest = String::new();
        for (input, output_dir, output_file) in jobs {
            manifest.push_str(&format!(
                "[[job]]\ninput = \"{}\"\noutput_dir = \"{}\"\noutput_file = \"{}\"\n\n",
                input, output_dir, output_file
            ));
        }
        self.write_file("export-jobs.toml", &manifest)
    }

    /// Copies a notebook fixture into the project.
    pub fn add_notebook(&self, name: &str, fixture: &Path) -> PathBuf {
        let content = fs::read_to_string(fixture).expect("Failed to read fixture");
        self.write_file(name, &content)
    }

    /// Writes a file under the docs root, as a converter would.
    pub fn add_docs_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.docs_root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write docs file");
        path
    }

    /// Reads a published Markdown file by its target path.
    pub fn read_published(&self, target: &str) -> String {
        let path = self.docs_root().join(target);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    /// Creates an ExportCommand configured for this test environment.
    pub fn cmd(&self) -> ExportCommand {
        ExportCommand::new()
            .current_dir(&self.root)
            .config(&self.config_path())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_writes_copy_converter_config() {
        let env = TestEnv::new();
        let config = fs::read_to_string(env.config_path()).unwrap();
        assert!(config.contains("program = \"cp\""));
    }

    #[test]
    fn test_env_manifest_lists_jobs() {
        let env = TestEnv::new();
        let path = env.write_manifest(&[("a.ipynb", "docs", "a.md"), ("b.ipynb", "docs", "b.md")]);
        let manifest = fs::read_to_string(path).unwrap();
        assert_eq!(manifest.matches("[[job]]").count(), 2);
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let args = env.cmd().get_args().to_vec();
        assert_eq!(args[0], "--config");
        assert_eq!(args[1], env.config_path().to_string_lossy());
    }
}
