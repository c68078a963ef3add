//! Upload command

use agentfs_tarball::upload_directory;
use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Args;
use url::Url;

use super::{apply_archive_args, load_config};
use crate::cli::{ArchiveArgs, SourceArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Presigned destination URL (receives a single HTTP PUT)
    #[arg(short, long)]
    pub url: Url,

    #[command(flatten)]
    pub archive: ArchiveArgs,
}

pub async fn run(args: UploadArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let mut config = load_config(config_dir)?;
    apply_archive_args(&mut config, &args.archive);

    output::header("Upload Agent Directory");
    output::kv("Source", args.source.dir.as_str());
    output::kv("Destination", &redacted(&args.url));
    output::kv(
        "Compression",
        &config.archive.effective_compression_level().to_string(),
    );
    println!();

    let summary = upload_directory(
        args.source.dir.as_std_path(),
        args.url.as_str(),
        &args.source.exclude,
        &config,
    )
    .await
    .with_context(|| format!("Failed to upload {}", args.source.dir))?;

    println!();
    output::success("Upload complete");
    output::kv("Files", &output::format_number(summary.files));
    output::kv("Directories", &output::format_number(summary.directories));
    output::kv("Source size", &output::format_bytes(summary.total_bytes));
    output::kv("Archive size", &output::format_bytes(summary.compressed_bytes));
    output::kv(
        "Duration",
        &format!("{:.1}s", summary.upload.elapsed.as_secs_f64()),
    );

    Ok(())
}

/// The destination without its query string, which carries the presigned credentials.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.set_fragment(None);
    shown.to_string()
}
