//! CommandRunner trait
//!
//! The runner abstraction lets the dispatcher be driven by real processes
//! ([`ProcessRunner`](super::ProcessRunner)) or by scripted results
//! ([`MockRunner`](super::MockRunner)).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::hooks::{EventPayload, HookCommand, HookResult};

/// Executes a single hook command
///
/// Implementations never fail: every problem, including failing to start,
/// is reported inside the returned [`HookResult`]. Each call is exactly one
/// execution attempt.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `payload` on stdin
    ///
    /// When `cancel` fires, the command is terminated as if its timeout had
    /// expired and the result is marked `cancelled`.
    async fn run(
        &self,
        command: &HookCommand,
        payload: &EventPayload,
        cancel: &CancellationToken,
    ) -> HookResult;
}
