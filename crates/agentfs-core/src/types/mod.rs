//! Type definitions for agentfs configuration

mod runtime_config;

pub use runtime_config::*;
