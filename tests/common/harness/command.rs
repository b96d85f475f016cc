//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Fluent wrapper around `assert_cmd::Command` for the `nbexport` binary.
///
/// Provides a builder-style API for constructing and executing CLI commands.
pub struct ExportCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ExportCommand {
    /// Creates a new command for the `nbexport` binary.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Sets the `--config` option.
    pub fn config(mut self, path: &Path) -> Self {
        self.args.push("--config".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Runs the binary from the given directory.
    pub fn current_dir(mut self, path: &Path) -> Self {
        self.current_dir = Some(path.to_path_buf());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("nbexport").expect("Failed to find nbexport binary");
        cmd.env_remove("RUST_LOG");
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.args(&self.args);
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `run` command.
    pub fn run(self) -> Self {
        self.args(["run"])
    }

    /// Configures for the `list` command.
    pub fn list(self) -> Self {
        self.args(["list"])
    }

    /// Configures for the `rewrite` command.
    pub fn rewrite(self, file: &Path, output_dir: &str) -> Self {
        let file = file.to_string_lossy().to_string();
        self.args(["rewrite", file.as_str(), "--output-dir", output_dir])
    }

    /// Configures for the `clean` command.
    pub fn clean(self) -> Self {
        self.args(["clean"])
    }

    // ===========================================
    // Options
    // ===========================================

    /// Adds `--profile <name>` to the command.
    pub fn profile(self, name: &str) -> Self {
        self.args(["--profile", name])
    }

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }

    /// Adds `--format paths` to the command.
    pub fn format_paths(self) -> Self {
        self.args(["--format", "paths"])
    }
}

impl Default for ExportCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ===========================================
    // ExportCommand Basics
    // ===========================================

    #[test]
    fn test_command_runs_binary() {
        ExportCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_config() {
        let temp = TempDir::new().unwrap();
        let cmd = ExportCommand::new().config(&temp.path().join("nbexport.toml"));
        let args = cmd.get_args();
        assert_eq!(args[0], "--config");
        assert!(args[1].ends_with("nbexport.toml"));
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = ExportCommand::new().list().format_json();
        let args = cmd.get_args();
        assert!(args.contains(&"list".to_string()));
        assert!(args.contains(&"--format".to_string()));
        assert!(args.contains(&"json".to_string()));
    }
}
