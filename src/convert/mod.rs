//! Notebook-to-Markdown conversion through an external program.
//!
//! The exporter never parses notebooks itself. A [`Converter`] turns one job's
//! input into a Markdown file; the stock implementation runs a configured
//! command (by default `jupyter nbconvert`) and captures its result as a
//! [`CommandOutput`].

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors launching the converter. A converter that runs and exits non-zero
/// is not an error here; see [`CommandOutput::success`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("converter program is empty")]
    EmptyProgram,

    #[error("failed to launch converter '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Paths a converter works with for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
}

impl ConversionRequest {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub program: String,
    pub args: Vec<String>,
    /// Exit code, or `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// The command line as a single display string.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Last few lines of stderr, for error summaries.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.trim_end().lines().collect();
        all[all.len().saturating_sub(lines)..].join("\n")
    }
}

/// Converts a notebook into Markdown.
pub trait Converter {
    /// Runs the conversion and reports what happened.
    fn convert(&self, request: &ConversionRequest) -> Result<CommandOutput, ConvertError>;

    /// The command that would run, for dry runs and logs.
    fn describe(&self, request: &ConversionRequest) -> String;
}

/// Program and argument template for [`CommandConverter`].
///
/// Arguments may contain the placeholders `{input}`, `{output_dir}`,
/// `{output_file}`, and `{output_path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ConverterSpec {
    fn default() -> Self {
        Self {
            program: "jupyter".to_string(),
            args: [
                "nbconvert",
                "--to",
                "markdown",
                "--output-dir",
                "{output_dir}",
                "--output",
                "{output_file}",
                "{input}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Runs an external program for each conversion, without a shell.
///
/// Request paths are passed through as given, so they must be valid from the
/// process working directory.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    spec: ConverterSpec,
}

impl CommandConverter {
    pub fn new(spec: ConverterSpec) -> Self {
        Self { spec }
    }

    /// Expands the argument template for a request.
    ///
    /// Paths are substituted as OS strings, so names that are not valid
    /// UTF-8 reach the converter unchanged.
    pub fn expand_args(&self, request: &ConversionRequest) -> Vec<OsString> {
        let output_path = request.output_path();
        let values = [
            ("{input}", request.input.as_os_str()),
            ("{output_dir}", request.output_dir.as_os_str()),
            ("{output_file}", OsStr::new(&request.output_file)),
            ("{output_path}", output_path.as_os_str()),
        ];
        self.spec
            .args
            .iter()
            .map(|arg| substitute(arg, &values))
            .collect()
    }
}

/// Replaces each placeholder in one left-to-right pass. Substituted values
/// are never scanned again.
fn substitute(template: &str, values: &[(&str, &OsStr)]) -> OsString {
    let mut out = OsString::new();
    let mut rest = template;
    loop {
        let next = values
            .iter()
            .filter_map(|&(name, value)| rest.find(name).map(|at| (at, name, value)))
            .min_by_key(|&(at, _, _)| at);
        match next {
            Some((at, name, value)) => {
                out.push(&rest[..at]);
                out.push(value);
                rest = &rest[at + name.len()..];
            }
            None => {
                out.push(rest);
                return out;
            }
        }
    }
}

fn lossy(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

impl Converter for CommandConverter {
    fn convert(&self, request: &ConversionRequest) -> Result<CommandOutput, ConvertError> {
        if self.spec.program.trim().is_empty() {
            return Err(ConvertError::EmptyProgram);
        }

        let args = self.expand_args(request);
        tracing::debug!(program = %self.spec.program, ?args, "running converter");

        let output = Command::new(&self.spec.program)
            .args(&args)
            .output()
            .map_err(|source| ConvertError::Launch {
                program: self.spec.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            program: self.spec.program.clone(),
            args: lossy(&args),
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn describe(&self, request: &ConversionRequest) -> String {
        std::iter::once(self.spec.program.clone())
            .chain(lossy(&self.expand_args(request)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
