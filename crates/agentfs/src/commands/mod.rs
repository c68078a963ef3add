//! CLI command implementations

pub mod pack;
pub mod size;
pub mod upload;

use agentfs_core::{HierarchicalConfigLoader, RuntimeConfig};
use anyhow::{Context, Result};
use camino::Utf8Path;

use crate::cli::ArchiveArgs;

/// Load the runtime configuration from `config_dir` (or `~/.agentfs`).
pub fn load_config(config_dir: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let loader = match config_dir {
        Some(dir) => HierarchicalConfigLoader::with_dir(dir.to_owned()),
        None => HierarchicalConfigLoader::new()?,
    };
    let config = loader
        .load_runtime_config()
        .with_context(|| format!("Failed to load configuration from {}", loader.config_dir()))?;
    tracing::debug!(
        "Runtime config: compression level {}, {} extra excludes",
        config.archive.effective_compression_level(),
        config.archive.extra_excludes.len()
    );
    Ok(config)
}

/// Apply archive flags on top of the loaded configuration.
pub fn apply_archive_args(config: &mut RuntimeConfig, args: &ArchiveArgs) {
    if let Some(level) = args.compression {
        config.archive.compression_level = level;
    }
    if args.no_progress {
        config.display.show_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_apply_archive_args() {
        let mut config = RuntimeConfig::default();
        apply_archive_args(
            &mut config,
            &ArchiveArgs {
                compression: Some(9),
                no_progress: true,
            },
        );
        assert_eq!(config.archive.compression_level, 9);
        assert!(!config.display.show_progress);
    }

    #[test]
    fn test_apply_archive_args_keeps_config_when_unset() {
        let mut config = RuntimeConfig::default();
        config.archive.compression_level = 3;
        apply_archive_args(
            &mut config,
            &ArchiveArgs {
                compression: None,
                no_progress: false,
            },
        );
        assert_eq!(config.archive.compression_level, 3);
        assert!(config.display.show_progress);
    }

    #[test]
    fn test_load_config_from_dir() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        std::fs::write(
            dir.join("agentfs-runtime.yaml"),
            "archive:\n  extra-excludes:\n    - \"*.log\"\n",
        )
        .unwrap();

        let config = load_config(Some(&dir)).unwrap();
        assert_eq!(config.archive.extra_excludes, vec!["*.log"]);
    }
}
