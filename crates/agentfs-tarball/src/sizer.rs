//! Total size of the files that will be packaged.
//!
//! The total only scales the compression progress bar. Symlinks are not
//! followed here, so a symlinked file contributes nothing even though the
//! archive later stores its target's content.

use crate::error::{Error, Result};
use crate::filters::ExclusionSet;
use crate::walk::TreeWalker;
use std::path::Path;

/// Result of measuring a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSize {
    /// Sum of the lengths of all non-excluded regular files
    pub total_bytes: u64,

    /// Number of non-excluded regular files
    pub file_count: u64,

    /// Number of non-excluded directories below the root
    pub dir_count: u64,
}

/// Walks `root` and measures every non-excluded regular file.
///
/// Any walk or stat error aborts the measurement.
pub fn measure_tree(root: &Path, exclusions: &ExclusionSet) -> Result<TreeSize> {
    let mut size = TreeSize::default();

    for entry in TreeWalker::new(root, exclusions).entries() {
        let entry = entry.map_err(Error::Sizing)?;

        if entry.is_dir() {
            size.dir_count += 1;
        } else if entry.is_regular_file() {
            size.total_bytes += entry.size();
            size.file_count += 1;
        }
    }

    tracing::debug!(
        "Measured {}: {} files, {} bytes",
        root.display(),
        size.file_count,
        size.total_bytes
    );

    Ok(size)
}

/// Sum of the byte lengths of all non-excluded regular files under `root`.
pub fn compute_total_size(root: &Path, exclusions: &ExclusionSet) -> Result<u64> {
    measure_tree(root, exclusions).map(|size| size.total_bytes)
}
