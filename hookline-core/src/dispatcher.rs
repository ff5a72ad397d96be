//! Hook dispatcher
//!
//! HookDispatcher fans one lifecycle event out to every matching hook
//! command, runs them concurrently, waits for all of them and folds the
//! results into a single [`DispatchResult`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::hooks::{
    DispatchResult, EventPayload, HookCommand, HookConfig, HookResult, HookType, aggregate,
};
use crate::runner::{CommandRunner, DEFAULT_KILL_GRACE, ProcessRunner, ShellConfig};

/// Configuration for the dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Shell used to run hook commands
    pub shell: ShellConfig,
    /// Time between the termination signal and the forceful kill
    pub kill_grace: Duration,
    /// Log every hook's output at info level instead of debug
    pub debug: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            shell: ShellConfig::default(),
            kill_grace: DEFAULT_KILL_GRACE,
            debug: false,
        }
    }
}

/// Runs the hooks configured for lifecycle events
pub struct HookDispatcher {
    runner: Arc<dyn CommandRunner>,
    debug: bool,
}

impl HookDispatcher {
    /// Create a dispatcher that runs hooks as OS processes
    pub fn new(config: DispatcherConfig) -> Self {
        let runner = ProcessRunner::new(config.shell, config.kill_grace);
        Self {
            runner: Arc::new(runner),
            debug: config.debug,
        }
    }

    /// Create a dispatcher backed by a custom runner
    pub fn with_runner(runner: Arc<dyn CommandRunner>, debug: bool) -> Self {
        Self { runner, debug }
    }

    /// Dispatch `event` to every matching hook
    ///
    /// `match_key` is the tool name for tool events and `None` otherwise.
    pub async fn dispatch(
        &self,
        event: HookType,
        payload: &EventPayload,
        config: &HookConfig,
        match_key: Option<&str>,
    ) -> DispatchResult {
        self.dispatch_with_cancel(event, payload, config, match_key, &CancellationToken::new())
            .await
    }

    /// Dispatch `event`, terminating every running hook when `cancel` fires
    ///
    /// Cancelled hooks still produce a result (marked `cancelled`), so the
    /// returned [`DispatchResult`] always has one entry per selected command.
    pub async fn dispatch_with_cancel(
        &self,
        event: HookType,
        payload: &EventPayload,
        config: &HookConfig,
        match_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> DispatchResult {
        let dispatch_id = Uuid::now_v7();
        let span = info_span!("dispatch", %dispatch_id, event = event.as_str());

        async move {
            if payload.hook_type() != event {
                debug!(
                    payload_event = payload.hook_type().as_str(),
                    "Payload event differs from dispatched event"
                );
            }

            let commands = select_commands(config, event, match_key);
            if commands.is_empty() {
                debug!(match_key, "No hooks matched");
                return DispatchResult::empty();
            }
            debug!(count = commands.len(), match_key, "Running hooks");

            let results = join_all(
                commands
                    .iter()
                    .map(|command| self.runner.run(command, payload, cancel)),
            )
            .await;

            for result in &results {
                self.log_result(result);
            }

            let aggregated = aggregate(results);
            if aggregated.should_block {
                info!(reason = ?aggregated.block_reason, "Hooks blocked the action");
            }
            if !aggregated.should_continue {
                info!(reason = ?aggregated.stop_reason, "Hooks stopped the agent");
            }
            aggregated
        }
        .instrument(span)
        .await
    }

    fn log_result(&self, result: &HookResult) {
        if self.debug {
            info!(
                command = %result.command,
                exit_code = result.exit_code,
                timed_out = result.timed_out,
                stdout = %result.stdout,
                stderr = %result.stderr,
                "Hook result"
            );
        } else {
            debug!(
                command = %result.command,
                exit_code = result.exit_code,
                timed_out = result.timed_out,
                "Hook result"
            );
        }
    }
}

/// Commands that apply to `event`, in matcher order then command order
pub fn select_commands<'a>(
    config: &'a HookConfig,
    event: HookType,
    match_key: Option<&str>,
) -> Vec<&'a HookCommand> {
    config
        .matchers(event)
        .iter()
        .filter(|matcher| matcher.selects(match_key))
        .flat_map(|matcher| matcher.commands())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookEvent, HookMatcher};
    use crate::runner::{MockRunner, MockScript};
    use serde_json::json;
    use std::time::Instant;

    fn cmd(command: &str) -> HookCommand {
        HookCommand::new(command).unwrap()
    }

    fn bash_payload() -> EventPayload {
        EventPayload::new(
            "s",
            "/t",
            "/w",
            HookEvent::pre_tool_use("Bash", json!({"command": "ls"})),
        )
    }

    fn mock_dispatcher() -> (Arc<MockRunner>, HookDispatcher) {
        let runner = Arc::new(MockRunner::new());
        let dispatcher = HookDispatcher::with_runner(runner.clone(), false);
        (runner, dispatcher)
    }

    #[test]
    fn test_select_flattens_in_matcher_then_command_order() {
        let config = HookConfig::new()
            .with_matcher(
                HookType::PreToolUse,
                HookMatcher::with_pattern("Bash", vec![cmd("a"), cmd("b")]),
            )
            .with_matcher(HookType::PreToolUse, HookMatcher::with_pattern("Edit", vec![cmd("x")]))
            .with_matcher(HookType::PreToolUse, HookMatcher::any(vec![cmd("c")]));

        let selected: Vec<_> = select_commands(&config, HookType::PreToolUse, Some("Bash"))
            .into_iter()
            .map(HookCommand::command)
            .collect();
        assert_eq!(selected, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_select_without_tool_skips_patterned_matchers() {
        let config = HookConfig::new()
            .with_matcher(HookType::Stop, HookMatcher::with_pattern("Bash", vec![cmd("a")]))
            .with_matcher(HookType::Stop, HookMatcher::any(vec![cmd("b")]));

        let selected: Vec<_> = select_commands(&config, HookType::Stop, None)
            .into_iter()
            .map(HookCommand::command)
            .collect();
        assert_eq!(selected, vec!["b"]);
    }

    #[tokio::test]
    async fn test_absent_event_yields_empty_result() {
        let (runner, dispatcher) = mock_dispatcher();
        let config = HookConfig::new()
            .with_matcher(HookType::Stop, HookMatcher::any(vec![cmd("stop-hook")]));

        let result = dispatcher
            .dispatch(HookType::PreToolUse, &bash_payload(), &config, Some("Bash"))
            .await;

        assert_eq!(result, DispatchResult::empty());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_excluded_matcher_runs_nothing() {
        let (runner, dispatcher) = mock_dispatcher();
        let config = HookConfig::new().with_matcher(
            HookType::PreToolUse,
            HookMatcher::with_pattern("Edit", vec![cmd("edit-hook")]),
        );

        let result = dispatcher
            .dispatch(HookType::PreToolUse, &bash_payload(), &config, Some("Bash"))
            .await;

        assert!(result.results.is_empty());
        assert!(!result.should_block);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_every_command_runs_once() {
        let (runner, dispatcher) = mock_dispatcher();
        let config = HookConfig::new()
            .with_matcher(HookType::PreToolUse, HookMatcher::any(vec![cmd("a"), cmd("b")]))
            .with_matcher(HookType::PreToolUse, HookMatcher::with_pattern("Bash", vec![cmd("c")]));

        let result = dispatcher
            .dispatch(HookType::PreToolUse, &bash_payload(), &config, Some("Bash"))
            .await;

        assert_eq!(result.results.len(), 3);
        let mut calls = runner.calls();
        calls.sort();
        assert_eq!(calls, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_results_keep_request_order_not_completion_order() {
        let (runner, dispatcher) = mock_dispatcher();
        runner.script(
            "slow",
            MockScript::exit(2)
                .stderr("slow says no")
                .delay(Duration::from_millis(150)),
        );
        runner.script("fast", MockScript::exit(2).stderr("fast says no"));
        let config = HookConfig::new().with_matcher(
            HookType::PreToolUse,
            HookMatcher::any(vec![cmd("fast"), cmd("slow")]),
        );

        let result = dispatcher
            .dispatch(HookType::PreToolUse, &bash_payload(), &config, Some("Bash"))
            .await;

        let order: Vec<_> = result.results.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(order, vec!["fast", "slow"]);
        // the last result in request order wins, even though it finished last
        assert_eq!(result.block_reason.as_deref(), Some("slow says no"));
    }

    #[tokio::test]
    async fn test_hooks_run_concurrently() {
        let (runner, dispatcher) = mock_dispatcher();
        let names = ["h1", "h2", "h3", "h4"];
        for name in names {
            runner.script(name, MockScript::exit(0).delay(Duration::from_millis(100)));
        }
        let config = HookConfig::new().with_matcher(
            HookType::Notification,
            HookMatcher::any(names.iter().map(|n| cmd(n)).collect()),
        );
        let payload = EventPayload::new(
            "s",
            "/t",
            "/w",
            HookEvent::Notification(crate::hooks::NotificationData {
                message: "waiting".to_string(),
            }),
        );

        let started = Instant::now();
        let result = dispatcher
            .dispatch(HookType::Notification, &payload, &config, None)
            .await;

        assert_eq!(result.results.len(), 4);
        assert_eq!(runner.max_in_flight(), 4);
        assert!(started.elapsed() < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_cancellation_reaches_every_hook() {
        let (runner, dispatcher) = mock_dispatcher();
        for name in ["a", "b"] {
            runner.script(name, MockScript::exit(0).delay(Duration::from_secs(30)));
        }
        let config = HookConfig::new()
            .with_matcher(HookType::PreToolUse, HookMatcher::any(vec![cmd("a"), cmd("b")]));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = dispatcher
            .dispatch_with_cancel(
                HookType::PreToolUse,
                &bash_payload(),
                &config,
                Some("Bash"),
                &cancel,
            )
            .await;

        assert_eq!(result.results.len(), 2);
        assert!(result.results.iter().all(|r| r.cancelled));
        assert!(!result.should_block);
    }

    #[tokio::test]
    async fn test_aggregates_structured_output() {
        let (runner, dispatcher) = mock_dispatcher();
        runner.script(
            "policy",
            MockScript::exit(0).stdout(r#"{"continue":false,"stopReason":"done","suppressOutput":true}"#),
        );
        runner.script("ctx", MockScript::exit(0).stdout("project uses tabs"));
        let config = HookConfig::new().with_matcher(
            HookType::UserPromptSubmit,
            HookMatcher::any(vec![cmd("policy"), cmd("ctx")]),
        );
        let payload = EventPayload::new("s", "/t", "/w", HookEvent::user_prompt_submit("hi"));

        let result = dispatcher
            .dispatch(HookType::UserPromptSubmit, &payload, &config, None)
            .await;

        assert!(!result.should_continue);
        assert_eq!(result.stop_reason.as_deref(), Some("done"));
        assert_eq!(result.context_to_add, vec!["project uses tabs".to_string()]);
    }

    #[test]
    fn test_default_config_uses_five_second_grace() {
        let config = DispatcherConfig::default();
        assert_eq!(config.kill_grace, Duration::from_millis(5000));
        assert!(!config.debug);
    }
}
