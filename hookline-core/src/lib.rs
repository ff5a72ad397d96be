//! hookline-core: lifecycle hook dispatch for coding agents
//!
//! At defined points in an agent's lifecycle (a prompt being submitted, a
//! tool about to run, a tool having run, the agent stopping) this crate runs
//! the externally configured hook commands for that event, feeds each one
//! the event as JSON on stdin, and turns their exit codes and output into a
//! single decision: block, continue, or add context.
//!
//! - **Configuration** - [`HookConfig`], [`HookMatcher`] and [`HookCommand`], validated on load
//! - **Matching** - [`hooks::matcher`] selects matchers by tool-name pattern
//! - **Execution** - [`ProcessRunner`] runs one command with timeout and kill escalation
//! - **Dispatch** - [`HookDispatcher`] runs all matching hooks concurrently
//! - **Aggregation** - [`hooks::aggregate`] folds results into a [`DispatchResult`]
//!
//! # Quick Start
//!
//! ```no_run
//! use hookline_core::{DispatcherConfig, EventPayload, HookConfig, HookDispatcher, HookEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HookConfig::from_json_str(
//!     r#"{"PreToolUse": [{"matcher": "Bash", "hooks": [{"type": "command", "command": "./guard.sh"}]}]}"#,
//! )?;
//! let payload = EventPayload::new(
//!     "session-1",
//!     "/tmp/transcript.jsonl",
//!     "/work",
//!     HookEvent::pre_tool_use("Bash", serde_json::json!({"command": "rm -rf /"})),
//! );
//!
//! let dispatcher = HookDispatcher::new(DispatcherConfig::default());
//! let result = dispatcher
//!     .dispatch(payload.hook_type(), &payload, &config, payload.tool_name())
//!     .await;
//!
//! if result.should_block {
//!     println!("blocked: {:?}", result.block_reason);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! dispatch(event, payload, config, match_key)
//!     │
//!     ├── matcher::selects ──► ordered HookCommands
//!     │
//!     ├── ProcessRunner::run ×N (concurrent, joined in request order)
//!     │
//!     └── aggregate ──► DispatchResult
//! ```

pub mod dispatcher;
pub mod error;
pub mod hooks;
pub mod runner;

// Re-export key types for convenience
pub use dispatcher::{DispatcherConfig, HookDispatcher, select_commands};
pub use error::HookError;
pub use hooks::{
    CompactTrigger, Decision, DispatchResult, EventPayload, ExitOutcome, HookCommand, HookConfig,
    HookEvent, HookMatcher, HookResult, HookType, StructuredDecision, aggregate,
    validate_command, validate_path,
};
pub use runner::{CommandRunner, MockRunner, MockScript, ProcessRunner, ShellConfig};
