//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! upload timeouts, compression level and progress display.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Archive construction settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Display and output settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout for the upload. `None` keeps the transport default.
    #[serde(default)]
    pub upload_timeout_secs: Option<u64>,

    /// Connect timeout for the upload. `None` keeps the transport default.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Size of the body chunks handed to the transport
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            upload_timeout_secs: None,
            connect_timeout_secs: None,
            upload_chunk_size: default_upload_chunk_size(),
        }
    }
}

fn default_user_agent() -> String {
    format!(
        "agentfs/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
fn default_upload_chunk_size() -> usize {
    64 * 1024 // 64 KiB
}

/// Archive construction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Gzip compression level (1-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Patterns appended after the built-in exclusion list
    #[serde(default)]
    pub extra_excludes: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
            extra_excludes: Vec::new(),
        }
    }
}

impl ArchiveConfig {
    /// Compression level clamped to the range gzip accepts.
    pub fn effective_compression_level(&self) -> u32 {
        self.compression_level.clamp(1, 9)
    }
}

fn default_compression_level() -> u32 {
    6
}

/// Display and output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayConfig {
    /// Render progress bars for the compress and upload phases
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_progress: default_show_progress(),
        }
    }
}

fn default_show_progress() -> bool {
    true
}
