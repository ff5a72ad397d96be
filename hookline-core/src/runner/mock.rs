//! Mock runner for testing
//!
//! MockRunner returns scripted results keyed by command string, so dispatch
//! ordering and aggregation can be tested without spawning processes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::traits::CommandRunner;
use crate::hooks::{EventPayload, ExitOutcome, HookCommand, HookResult};

/// Scripted outcome for one command
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Simulated run time
    pub delay: Duration,
}

impl MockScript {
    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Mock implementation of CommandRunner for testing
///
/// Commands without a script exit 0 with no output.
#[derive(Debug, Default)]
pub struct MockRunner {
    scripts: Mutex<HashMap<String, MockScript>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of `command`
    pub fn script(&self, command: impl Into<String>, script: MockScript) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command.into(), script);
    }

    /// Commands run so far, in the order they started
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Highest number of commands that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        command: &HookCommand,
        _payload: &EventPayload,
        cancel: &CancellationToken,
    ) -> HookResult {
        let started = Instant::now();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.command().to_string());
        let script = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(command.command())
            .cloned()
            .unwrap_or_default();

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let outcome = tokio::select! {
            _ = tokio::time::sleep(script.delay) => ExitOutcome {
                code: Some(script.exit_code),
                ..Default::default()
            },
            _ = cancel.cancelled() => ExitOutcome {
                code: None,
                cancelled: true,
                ..Default::default()
            },
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        HookResult::from_exit(
            command.command(),
            outcome,
            &script.stdout,
            &script.stderr,
            started.elapsed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookEvent;

    fn payload() -> EventPayload {
        EventPayload::new("s", "/t", "/w", HookEvent::user_prompt_submit("hi"))
    }

    #[tokio::test]
    async fn test_unscripted_command_succeeds_silently() {
        let runner = MockRunner::new();
        let command = HookCommand::new("anything").unwrap();

        let result = runner.run(&command, &payload(), &CancellationToken::new()).await;

        assert!(result.success);
        assert!(result.stdout.is_empty());
        assert_eq!(runner.calls(), vec!["anything".to_string()]);
    }

    #[tokio::test]
    async fn test_scripted_command_returns_script() {
        let runner = MockRunner::new();
        runner.script("guard", MockScript::exit(2).stderr("blocked\n"));
        let command = HookCommand::new("guard").unwrap();

        let result = runner.run(&command, &payload(), &CancellationToken::new()).await;

        assert_eq!(result.exit_code, 2);
        assert_eq!(result.stderr, "blocked");
    }

    #[tokio::test]
    async fn test_cancelled_token_interrupts_delay() {
        let runner = MockRunner::new();
        runner.script("slow", MockScript::exit(0).delay(Duration::from_secs(30)));
        let command = HookCommand::new("slow").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = runner.run(&command, &payload(), &cancel).await;

        assert!(result.cancelled);
        assert_eq!(result.exit_code, -1);
    }
}
