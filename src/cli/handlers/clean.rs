//! Clean command handler.

use anyhow::{Context, Result};

use super::print_json;
use crate::cli::CleanArgs;
use crate::cli::config::Config;
use crate::cli::output::{CleanListing, Output, OutputFormat};
use crate::infra::clean_stray_markdown;

pub fn handle_clean(args: &CleanArgs, config: &Config) -> Result<()> {
    let image_root = config.image_root();
    let removed = clean_stray_markdown(&image_root)
        .with_context(|| format!("failed to clean {}", image_root.display()))?;

    match args.format {
        OutputFormat::Human => {
            if removed.is_empty() {
                println!("Nothing to clean in {}", image_root.display());
            } else {
                for path in &removed {
                    println!("removed: {}", path.display());
                }
                println!("Removed {} files", removed.len());
            }
        }
        OutputFormat::Json => {
            print_json(&Output::new(CleanListing {
                removed: removed.iter().map(|p| p.display().to_string()).collect(),
            }))?;
        }
        OutputFormat::Paths => {
            for path in &removed {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
