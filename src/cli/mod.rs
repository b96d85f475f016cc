//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::Profile;
use output::OutputFormat;

/// nbexport - publish Jupyter notebooks as documentation Markdown
#[derive(Parser, Debug)]
#[command(name = "nbexport", version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./nbexport.toml when present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Job manifest (overrides the config file)
    #[arg(short = 'm', long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export every job in the manifest
    Run(RunArgs),

    /// List jobs in the manifest
    #[command(alias = "ls")]
    List(ListArgs),

    /// Rewrite an already converted Markdown file
    Rewrite(RewriteArgs),

    /// Remove stray Markdown files from the image tree
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Rewrite profile (overrides the config file)
    #[arg(short, long, value_enum)]
    pub profile: Option<Profile>,

    /// Only run jobs whose input or target contains PATTERN (repeatable)
    #[arg(short, long = "job", value_name = "PATTERN", action = ArgAction::Append)]
    pub jobs: Vec<String>,

    /// Print converter commands without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `list` command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Include disabled jobs
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `rewrite` command
#[derive(Parser, Debug)]
pub struct RewriteArgs {
    /// Markdown file produced by the converter
    pub file: PathBuf,

    /// Output directory of the job, used to build image paths
    #[arg(short = 'o', long)]
    pub output_dir: String,

    /// Rewrite profile (overrides the config file)
    #[arg(short, long, value_enum)]
    pub profile: Option<Profile>,

    /// Print the result instead of rewriting the file in place
    #[arg(long)]
    pub stdout: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `clean` command
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
