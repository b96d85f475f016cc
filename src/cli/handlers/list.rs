//! List command handler.

use anyhow::Result;
use std::path::PathBuf;

use super::{load_manifest, print_json};
use crate::cli::ListArgs;
use crate::cli::config::Config;
use crate::cli::output::{JobListing, Output, OutputFormat};
use crate::domain::ExportJob;

pub fn handle_list(args: &ListArgs, cli_manifest: Option<&PathBuf>, config: &Config) -> Result<()> {
    let manifest = load_manifest(config, cli_manifest)?;
    let jobs: Vec<&ExportJob> = manifest
        .jobs()
        .iter()
        .filter(|j| args.all || j.enabled())
        .collect();

    match args.format {
        OutputFormat::Human => {
            if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                println!("{:<8}  {:<50}  {}", "State", "Input", "Target");
                println!("{:<8}  {:<50}  {}", "--------", "-".repeat(50), "-".repeat(50));
                for job in &jobs {
                    let state = if job.enabled() { "enabled" } else { "disabled" };
                    println!(
                        "{:<8}  {:<50}  {}",
                        state,
                        job.input().display(),
                        job.target_str()
                    );
                }
            }
        }
        OutputFormat::Json => {
            let listings: Vec<JobListing> = jobs.iter().map(|j| JobListing::from(*j)).collect();
            print_json(&Output::new(listings))?;
        }
        OutputFormat::Paths => {
            let docs_root = config.docs_root();
            for job in &jobs {
                println!("{}", docs_root.join(job.target()).display());
            }
        }
    }

    Ok(())
}
