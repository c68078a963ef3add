//! Configuration loading

mod hierarchical_loader;

pub use hierarchical_loader::{HierarchicalConfigLoader, RUNTIME_CONFIG_FILENAME};
