//! The size → build → upload sequence.

use crate::archive::{ArchiveBuilder, Tarball, TarballConfig};
use crate::error::Result;
use crate::filters::ExclusionSet;
use crate::sizer::compute_total_size;
use crate::upload::{UploadResult, Uploader};
use agentfs_core::RuntimeConfig;
use std::path::Path;
use url::Url;

/// A tree measured and packed, ready to upload or persist.
#[derive(Debug, Clone)]
pub struct PackedTree {
    /// Total size reported by the sizing pass
    pub total_bytes: u64,

    /// The finished archive
    pub tarball: Tarball,
}

/// Outcome of [`upload_directory`].
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub total_bytes: u64,
    pub files: u64,
    pub directories: u64,
    pub compressed_bytes: u64,
    pub upload: UploadResult,
}

/// Builds the exclusion set for `root`: built-ins, configured extras, caller
/// extras, then the tree's `.dockerignore`.
pub fn exclusions_for(
    root: &Path,
    extra_excludes: &[String],
    config: &RuntimeConfig,
) -> Result<ExclusionSet> {
    ExclusionSet::for_root(
        root,
        config
            .archive
            .extra_excludes
            .iter()
            .chain(extra_excludes.iter()),
    )
}

/// Measures and packs `root` without uploading.
pub fn pack_directory(
    root: &Path,
    extra_excludes: &[String],
    config: &RuntimeConfig,
) -> Result<PackedTree> {
    let exclusions = exclusions_for(root, extra_excludes, config)?;

    let total_bytes = compute_total_size(root, &exclusions)?;
    tracing::info!("Packaging {} ({} bytes)", root.display(), total_bytes);

    let tarball = ArchiveBuilder::new(TarballConfig::from(config)).build(
        root,
        &exclusions,
        total_bytes,
    )?;

    Ok(PackedTree {
        total_bytes,
        tarball,
    })
}

/// Packs `root` and PUTs the archive to `destination`.
///
/// The URL is validated before any filesystem work. The archive is complete
/// before the first byte is sent.
pub async fn upload_directory(
    root: &Path,
    destination: &str,
    extra_excludes: &[String],
    config: &RuntimeConfig,
) -> Result<UploadSummary> {
    let url = Url::parse(destination)?;
    let uploader = Uploader::new(&config.network)?.with_progress(config.display.show_progress);

    let PackedTree {
        total_bytes,
        tarball,
    } = pack_directory(root, extra_excludes, config)?;
    let statistics = tarball.statistics().clone();

    let upload = uploader.upload(tarball, &url).await?;

    Ok(UploadSummary {
        total_bytes,
        files: statistics.files,
        directories: statistics.directories,
        compressed_bytes: statistics.compressed_bytes,
        upload,
    })
}
