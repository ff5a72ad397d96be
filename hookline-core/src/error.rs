//! Error types for hookline-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised before any hook process is spawned
///
/// Runtime failures of individual hooks (spawn errors, timeouts, non-zero
/// exits, unparseable stdout) are never reported through this type. They are
/// captured in the corresponding [`HookResult`](crate::HookResult) instead.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Invalid hook command: {0}")]
    InvalidHookCommand(String),

    #[error("Path traversal detected in {}", .0.display())]
    PathTraversal(PathBuf),

    #[error("Invalid hook configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse hook configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
