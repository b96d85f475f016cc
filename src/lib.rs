//! nbexport - publish Jupyter notebooks as documentation Markdown

pub mod cli;
pub mod convert;
pub mod domain;
pub mod export;
pub mod infra;
pub mod rewrite;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command, RunArgs,
    config::Config,
    handlers::{handle_clean, handle_completions, handle_list, handle_rewrite, handle_run},
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let manifest = cli.manifest.as_ref();

    match &cli.command {
        None => handle_run(&RunArgs::default(), manifest, &config),
        Some(Command::Run(args)) => handle_run(args, manifest, &config),
        Some(Command::List(args)) => handle_list(args, manifest, &config),
        Some(Command::Rewrite(args)) => handle_rewrite(args, &config),
        Some(Command::Clean(args)) => handle_clean(args, &config),
        Some(Command::Completions(args)) => handle_completions(args),
    }
}

/// RUST_LOG wins when set; otherwise -v enables info and -vv debug.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
