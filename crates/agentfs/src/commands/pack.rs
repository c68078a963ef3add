//! Pack command

use agentfs_tarball::pack_directory;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;

use super::{apply_archive_args, load_config};
use crate::cli::{ArchiveArgs, SourceArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct PackArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file for the tar.gz archive
    #[arg(short, long)]
    pub output: Utf8PathBuf,

    #[command(flatten)]
    pub archive: ArchiveArgs,
}

pub fn run(args: PackArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let mut config = load_config(config_dir)?;
    apply_archive_args(&mut config, &args.archive);

    output::header("Pack Agent Directory");
    output::kv("Source", args.source.dir.as_str());
    output::kv("Output", args.output.as_str());
    println!();

    let packed = pack_directory(args.source.dir.as_std_path(), &args.source.exclude, &config)
        .with_context(|| format!("Failed to package {}", args.source.dir))?;
    packed.tarball.write_to(args.output.as_std_path())?;

    let stats = packed.tarball.statistics();
    println!();
    output::success(&format!("Archive written to {}", args.output));
    output::kv("Files", &output::format_number(stats.files));
    output::kv("Directories", &output::format_number(stats.directories));
    if stats.skipped_irregular > 0 {
        output::kv(
            "Skipped (not regular)",
            &output::format_number(stats.skipped_irregular),
        );
    }
    output::kv("Source size", &output::format_bytes(packed.total_bytes));
    output::kv("Archive size", &output::format_bytes(stats.compressed_bytes));
    if stats.content_bytes > 0 {
        output::kv(
            "Compression",
            &format!("{}%", stats.compression_percentage()),
        );
    }

    Ok(())
}
