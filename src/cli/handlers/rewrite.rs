//! Rewrite command handler.

use anyhow::{Context, Result};

use super::print_json;
use crate::cli::RewriteArgs;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat, RewriteListing};
use crate::infra::{read_document, write_document};
use crate::rewrite::Rewriter;

pub fn handle_rewrite(args: &RewriteArgs, config: &Config) -> Result<()> {
    let profile = config.profile(args.profile);
    let rewriter = Rewriter::new(profile, config.rewrite_settings(profile));

    let text = read_document(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let rewritten = rewriter.apply(&text, &args.output_dir);

    if args.stdout {
        print!("{}", rewritten.text);
        return Ok(());
    }

    write_document(&args.file, &rewritten.text)
        .with_context(|| format!("failed to write {}", args.file.display()))?;

    match args.format {
        OutputFormat::Human => {
            if rewritten.applied.is_empty() {
                println!("Unchanged: {}", args.file.display());
            } else {
                println!(
                    "Rewrote {} ({})",
                    args.file.display(),
                    rewritten.applied.join(", ")
                );
            }
        }
        OutputFormat::Json => {
            print_json(&Output::new(RewriteListing {
                path: args.file.display().to_string(),
                rules_applied: rewritten.applied,
            }))?;
        }
        OutputFormat::Paths => println!("{}", args.file.display()),
    }

    Ok(())
}
