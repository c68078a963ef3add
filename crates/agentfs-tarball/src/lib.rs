//! agentfs tarball packaging
//!
//! This crate packages a local directory into a tar.gz archive and uploads it
//! to a presigned URL with a single HTTP PUT.
//!
//! # Features
//!
//! - **Exclusion rules**: built-in defaults, caller patterns and `.dockerignore`
//! - **Two-pass walk**: the tree is sized first so compression progress has a scale
//! - **Symlink resolution**: symlinks are archived as their targets
//! - **Progress reporting**: byte-level bars for compression and upload
//!
//! # Examples
//!
//! ```no_run
//! use agentfs_core::RuntimeConfig;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), agentfs_tarball::Error> {
//!     let summary = agentfs_tarball::upload_directory(
//!         Path::new("./my-agent"),
//!         "https://bucket.example.com/upload?signature=abc",
//!         &["*.log".to_string()],
//!         &RuntimeConfig::default(),
//!     )
//!     .await?;
//!
//!     println!("Uploaded {} bytes", summary.compressed_bytes);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod progress;
pub mod sizer;
pub mod upload;
pub mod walk;

pub use archive::{ArchiveBuilder, BuildStatistics, Tarball, TarballConfig, DEFAULT_COMPRESSION_LEVEL};
pub use error::{Error, Result};
pub use filters::{ExclusionRule, ExclusionSet, DEFAULT_EXCLUDES, IGNORE_FILENAME, MARKER_TOKEN};
pub use pipeline::{exclusions_for, pack_directory, upload_directory, PackedTree, UploadSummary};
pub use progress::{TransferProgress, COMPRESS_LABEL, UPLOAD_LABEL};
pub use sizer::{compute_total_size, measure_tree, TreeSize};
pub use upload::{UploadResult, Uploader, GZIP_CONTENT_TYPE};
pub use walk::{TraversalEntry, TreeWalker};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excludes() {
        assert_eq!(
            DEFAULT_EXCLUDES,
            &["Dockerfile", ".dockerignore", ".gitignore", ".git", "node_modules", "*.env"]
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(IGNORE_FILENAME, ".dockerignore");
        assert_eq!(MARKER_TOKEN, "Dockerfile");
        assert_eq!(GZIP_CONTENT_TYPE, "application/gzip");
        assert_eq!(DEFAULT_COMPRESSION_LEVEL, 6);
    }
}
