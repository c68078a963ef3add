//! Exclusion-aware directory traversal shared by the sizing and archive passes.
//!
//! Both passes walk through [`TreeWalker`] so a path excluded while sizing is
//! excluded while archiving too. Excluded directories are pruned: the walk
//! never descends into them.

use crate::filters::ExclusionSet;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// One node visited during a walk.
#[derive(Debug, Clone)]
pub struct TraversalEntry {
    path: PathBuf,
    relative_path: PathBuf,
    /// Metadata of the node itself; symlinks are not followed
    metadata: Metadata,
}

impl TraversalEntry {
    /// Full path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the walk root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Relative path joined with `/`, as matched by exclusion rules.
    pub fn relative_str(&self) -> String {
        slash_path(&self.relative_path)
    }

    /// Archive name for a directory entry: the relative path plus a trailing `/`.
    ///
    /// Built from the raw path components so a name that is not valid UTF-8
    /// stays byte-identical to the names of the entries below it.
    pub fn directory_name(&self) -> PathBuf {
        let mut name = OsString::new();
        for part in self.relative_path.components().filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        }) {
            name.push(part);
            name.push("/");
        }
        PathBuf::from(name)
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_symlink(&self) -> bool {
        self.metadata.file_type().is_symlink()
    }

    /// True only for regular files (not symlinks, devices, pipes or sockets).
    pub fn is_regular_file(&self) -> bool {
        self.metadata.is_file()
    }

    pub fn size(&self) -> u64 {
        self.metadata.len()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Metadata of the node, following a symlink to its final target.
    pub fn resolve_metadata(&self) -> io::Result<Metadata> {
        if self.is_symlink() {
            fs::metadata(&self.path)
        } else {
            Ok(self.metadata.clone())
        }
    }
}

/// Depth-first, lexically ordered walk of a tree that honors an [`ExclusionSet`].
pub struct TreeWalker<'a> {
    root: &'a Path,
    exclusions: &'a ExclusionSet,
}

impl<'a> TreeWalker<'a> {
    pub fn new(root: &'a Path, exclusions: &'a ExclusionSet) -> Self {
        Self { root, exclusions }
    }

    /// Iterates every non-excluded node below the root. The root itself is not yielded.
    pub fn entries(&self) -> impl Iterator<Item = Result<TraversalEntry, walkdir::Error>> + 'a {
        let root = self.root;
        let exclusions = self.exclusions;

        WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                let relative = slash_path(relative_to(root, entry.path()));
                let is_dir = entry.file_type().is_dir();
                if exclusions.is_excluded(&relative, is_dir) {
                    if is_dir {
                        tracing::debug!("Excluding directory from tarball: {}", relative);
                    } else {
                        tracing::debug!("Excluding file from tarball: {}", relative);
                    }
                    return false;
                }
                true
            })
            .map(move |entry| {
                let entry = entry?;
                let metadata = entry.metadata()?;
                let relative_path = relative_to(root, entry.path()).to_path_buf();
                Ok(TraversalEntry {
                    path: entry.into_path(),
                    relative_path,
                    metadata,
                })
            })
    }
}

fn relative_to<'p>(root: &Path, path: &'p Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Joins the normal components of a relative path with `/`.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
