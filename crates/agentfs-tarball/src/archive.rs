//! In-memory tar+gzip construction.
//!
//! The archive is written into a buffer owned by the builder and only handed
//! out as a [`Tarball`] once both the tar and gzip trailers are written. Any
//! failure drops the partial buffer.

use crate::error::{Error, Result};
use crate::filters::ExclusionSet;
use crate::progress::{TransferProgress, COMPRESS_LABEL};
use crate::walk::{TraversalEntry, TreeWalker};
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::Path;
use tar::{Builder as TarBuilder, EntryType, Header, HeaderMode};

/// Default compression level (6 = balanced speed/ratio).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

type ArchiveStream = TarBuilder<GzEncoder<Vec<u8>>>;

/// Counters gathered while building an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStatistics {
    /// File entries written
    pub files: u64,

    /// Directory entries written
    pub directories: u64,

    /// Devices, pipes and sockets left out
    pub skipped_irregular: u64,

    /// File content bytes copied into the archive
    pub content_bytes: u64,

    /// Size of the finished gzip stream
    pub compressed_bytes: u64,
}

impl BuildStatistics {
    /// Returns compression percentage saved relative to the copied content.
    pub fn compression_percentage(&self) -> u8 {
        if self.content_bytes == 0 {
            return 0;
        }
        let ratio = self.compressed_bytes as f64 / self.content_bytes as f64;
        ((1.0 - ratio).max(0.0) * 100.0) as u8
    }
}

/// A finished, immutable tar.gz archive.
#[derive(Debug, Clone)]
pub struct Tarball {
    bytes: Bytes,
    statistics: BuildStatistics,
}

impl Tarball {
    fn new(bytes: Vec<u8>, mut statistics: BuildStatistics) -> Self {
        statistics.compressed_bytes = bytes.len() as u64;
        Self {
            bytes: Bytes::from(bytes),
            statistics,
        }
    }

    /// Compressed size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn statistics(&self) -> &BuildStatistics {
        &self.statistics
    }

    /// Consumes the tarball, returning the compressed buffer.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Writes the compressed archive to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes).map_err(|source| Error::Persist {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration for archive creation.
#[derive(Debug, Clone)]
pub struct TarballConfig {
    /// Compression level (1-9)
    pub compression_level: u32,

    /// Whether to draw the compression progress bar
    pub show_progress: bool,
}

impl TarballConfig {
    pub fn new() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            show_progress: true,
        }
    }

    /// Sets the compression level.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.clamp(1, 9);
        self
    }

    /// Sets whether to show progress.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Default for TarballConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&agentfs_core::RuntimeConfig> for TarballConfig {
    fn from(config: &agentfs_core::RuntimeConfig) -> Self {
        Self::new()
            .with_compression_level(config.archive.effective_compression_level())
            .with_progress(config.display.show_progress)
    }
}

/// Builds tar.gz archives from directory trees.
pub struct ArchiveBuilder {
    config: TarballConfig,
}

impl ArchiveBuilder {
    pub fn new(config: TarballConfig) -> Self {
        Self { config }
    }

    /// Builds an archive of every non-excluded node under `root`.
    ///
    /// `total_bytes` only scales the progress bar.
    pub fn build(
        &self,
        root: &Path,
        exclusions: &ExclusionSet,
        total_bytes: u64,
    ) -> Result<Tarball> {
        let progress = TransferProgress::new(COMPRESS_LABEL, total_bytes, self.config.show_progress);
        let result = self.build_with_progress(root, exclusions, &progress);
        match &result {
            Ok(_) => progress.finish(),
            Err(_) => progress.abandon(),
        }
        result
    }

    /// Same as [`build`](Self::build), counting copied bytes on a caller-owned tap.
    pub fn build_with_progress(
        &self,
        root: &Path,
        exclusions: &ExclusionSet,
        progress: &TransferProgress,
    ) -> Result<Tarball> {
        let encoder = GzEncoder::new(
            Vec::new(),
            Compression::new(self.config.compression_level.clamp(1, 9)),
        );
        let mut stream: ArchiveStream = TarBuilder::new(encoder);
        let mut statistics = BuildStatistics::default();

        for entry in TreeWalker::new(root, exclusions).entries() {
            let entry = entry.map_err(Error::Walk)?;
            append_entry(&mut stream, &entry, progress, &mut statistics)?;
        }

        let encoder = stream
            .into_inner()
            .map_err(|e| Error::finalize("tar", e))?;
        let bytes = encoder.finish().map_err(|e| Error::finalize("gzip", e))?;
        let tarball = Tarball::new(bytes, statistics);

        tracing::info!(
            "Built tarball: {} files, {} directories, {} bytes compressed",
            tarball.statistics.files,
            tarball.statistics.directories,
            tarball.len()
        );

        Ok(tarball)
    }
}

fn append_entry(
    stream: &mut ArchiveStream,
    entry: &TraversalEntry,
    progress: &TransferProgress,
    statistics: &mut BuildStatistics,
) -> Result<()> {
    let metadata = entry
        .resolve_metadata()
        .map_err(|e| Error::symlink(entry.path(), e))?;

    if metadata.is_dir() {
        let name = entry.directory_name();
        let mut header = header_for(&metadata, EntryType::Directory, 0);
        stream
            .append_data(&mut header, &name, io::empty())
            .map_err(|e| Error::write_entry(name.to_string_lossy(), e))?;
        statistics.directories += 1;
        return Ok(());
    }

    if !metadata.is_file() {
        tracing::debug!("Skipping irregular file: {}", entry.relative_str());
        statistics.skipped_irregular += 1;
        return Ok(());
    }

    let file = File::open(entry.path()).map_err(|e| Error::open_file(entry.path(), e))?;
    let size = metadata.len();
    let mut header = header_for(&metadata, EntryType::Regular, size);

    let before = progress.position();
    stream
        .append_data(
            &mut header,
            entry.relative_path(),
            progress.wrap_read(file.take(size)),
        )
        .map_err(|e| Error::write_entry(entry.relative_str(), e))?;

    let copied = progress.position() - before;
    if copied != size {
        return Err(Error::write_entry(
            entry.relative_str(),
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank while archiving: expected {} bytes, read {}", size, copied),
            ),
        ));
    }

    statistics.files += 1;
    statistics.content_bytes += copied;
    Ok(())
}

fn header_for(metadata: &Metadata, entry_type: EntryType, size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(metadata, HeaderMode::Complete);
    header.set_entry_type(entry_type);
    header.set_size(size);
    header
}
