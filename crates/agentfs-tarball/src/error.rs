//! Error types for agentfs-tarball
//!
//! Every variant is fatal to the pipeline; nothing is retried. Messages name
//! the failing step and leave the underlying cause to [`std::error::Error::source`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using agentfs-tarball's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the size, build and upload phases
#[derive(Error, Debug)]
pub enum Error {
    /// The ignore file exists but could not be read
    #[error("failed to read {path}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walk or stat failure while computing the total size
    #[error("failed to calculate total size")]
    Sizing(#[source] walkdir::Error),

    /// Walk or stat failure while building the archive
    #[error("failed to walk directory")]
    Walk(#[source] walkdir::Error),

    /// A symlink could not be resolved to its target
    #[error("failed to evaluate symlink {path}")]
    Symlink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be opened for reading
    #[error("failed to open file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry header or its content could not be written
    #[error("failed to write archive entry {name}")]
    WriteEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The tar or gzip trailer could not be written
    #[error("failed to close {stage} writer")]
    Finalize {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The finished archive could not be written to disk
    #[error("failed to write tarball to {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination is not a valid absolute URL
    #[error("invalid destination URL")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed
    #[error("failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    /// Connection, TLS, timeout or body transfer failure
    #[error("failed to upload tarball")]
    Transport(#[source] reqwest::Error),

    /// The destination answered with anything other than 200
    #[error("failed to upload tarball: {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl Error {
    /// Create an ignore file read error
    pub fn ignore_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IgnoreFile {
            path: path.into(),
            source,
        }
    }

    /// Create a symlink resolution error
    pub fn symlink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Symlink {
            path: path.into(),
            source,
        }
    }

    /// Create a file open error
    pub fn open_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFile {
            path: path.into(),
            source,
        }
    }

    /// Create an entry write error
    pub fn write_entry(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::WriteEntry {
            name: name.into(),
            source,
        }
    }

    /// Create a stream finalization error
    pub fn finalize(stage: &'static str, source: std::io::Error) -> Self {
        Self::Finalize { stage, source }
    }

    /// Create a transport error. The presigned query string is dropped from the message.
    pub fn transport(source: reqwest::Error) -> Self {
        Self::Transport(source.without_url())
    }

    /// Create an upload rejection error
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }
}
