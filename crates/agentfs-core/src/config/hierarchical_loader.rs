//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Runtime config (~/.agentfs/agentfs-runtime.yaml)
//! 3. Environment variables (AGENTFS_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::str::FromStr;

/// Name of the user runtime config file inside the config directory.
pub const RUNTIME_CONFIG_FILENAME: &str = "agentfs-runtime.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.agentfs)
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {:?}", p)))?;

        Ok(home.join(".agentfs"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let runtime_config_path = self.config_dir.join(RUNTIME_CONFIG_FILENAME);
        if runtime_config_path.exists() {
            tracing::debug!("Loading runtime config from {}", runtime_config_path);
            config = self.load_yaml_file::<RuntimeConfig>(&runtime_config_path)?;
        }

        config = self.apply_env_overrides(config)?;

        Ok(config)
    }

    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Some(secs) = parse_env::<u64>("AGENTFS_UPLOAD_TIMEOUT_SECS")? {
            config.network.upload_timeout_secs = Some(secs);
        }

        if let Some(secs) = parse_env::<u64>("AGENTFS_CONNECT_TIMEOUT_SECS")? {
            config.network.connect_timeout_secs = Some(secs);
        }

        if let Some(size) = parse_env::<usize>("AGENTFS_UPLOAD_CHUNK_SIZE")? {
            if size == 0 {
                return Err(Error::invalid_config(
                    "AGENTFS_UPLOAD_CHUNK_SIZE must be greater than zero",
                ));
            }
            config.network.upload_chunk_size = size;
        }

        if let Ok(val) = env::var("AGENTFS_USER_AGENT") {
            config.network.user_agent = val;
        }

        if let Some(level) = parse_env::<u32>("AGENTFS_COMPRESSION_LEVEL")? {
            config.archive.compression_level = level;
        }

        if let Some(no_progress) = parse_env_flag("AGENTFS_NO_PROGRESS")? {
            config.display.show_progress = !no_progress;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_config(format!("{} must be a valid number", name))),
        Err(_) => Ok(None),
    }
}

/// Reads a boolean switch: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`, any case.
fn parse_env_flag(name: &str) -> Result<Option<bool>> {
    let Ok(val) = env::var(name) else {
        return Ok(None);
    };
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(Error::invalid_config(format!(
            "{} must be one of 1, 0, true, false, yes, no, on, off",
            name
        ))),
    }
}
