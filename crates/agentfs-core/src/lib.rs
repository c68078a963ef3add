//! # agentfs-core
//!
//! Core library for the agentfs CLI providing:
//! - Runtime configuration types (network, archive and display settings)
//! - Hierarchical configuration loading (embedded defaults, user file, environment)
//! - Shared configuration error types

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::{ArchiveConfig, DisplayConfig, NetworkConfig, RuntimeConfig};
