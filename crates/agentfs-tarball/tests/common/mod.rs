//! Common test infrastructure for agentfs-tarball tests
//!
//! - `fixtures`: source trees on disk and archive inspection
//! - `mock_server`: wiremock setup for presigned upload endpoints

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::*;
