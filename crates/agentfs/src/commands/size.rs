//! Size command

use agentfs_tarball::{exclusions_for, measure_tree};
use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Args;

use super::load_config;
use crate::cli::SourceArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct SizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// List the active exclusion patterns
    #[arg(long)]
    pub show_patterns: bool,
}

pub fn run(args: SizeArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_dir)?;
    let root = args.source.dir.as_std_path();

    let exclusions = exclusions_for(root, &args.source.exclude, &config)?;

    if args.show_patterns {
        output::info("Active exclusion patterns:");
        for pattern in exclusions.active_patterns() {
            println!("  {}", console::style(pattern).dim());
        }
        println!();
    }

    let spinner = output::spinner("Measuring directory...", config.display.show_progress);
    let size = measure_tree(root, &exclusions);
    spinner.finish_and_clear();
    let size = size.with_context(|| format!("Failed to measure {}", args.source.dir))?;

    output::header(args.source.dir.as_str());
    output::kv("Files", &output::format_number(size.file_count));
    output::kv("Directories", &output::format_number(size.dir_count));
    output::kv(
        "Total",
        &format!(
            "{} ({} bytes)",
            output::format_bytes(size.total_bytes),
            size.total_bytes
        ),
    );

    Ok(())
}
