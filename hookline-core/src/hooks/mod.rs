//! Hook configuration, matching and decision aggregation
//!
//! ## Hook Types
//!
//! - **UserPromptSubmit** - Called before a prompt is accepted
//! - **PreToolUse** - Called before a tool is executed
//! - **PostToolUse** - Called after a tool completes
//! - **Stop** / **SubagentStop** - Called when the agent or a subagent stops
//! - **Notification** - Called when the agent emits a notification
//! - **PreCompact** - Called before the transcript is compacted
//!
//! ## Output protocol
//!
//! | hook outcome | effect |
//! |---|---|
//! | exit 0 | stdout (unless suppressed) becomes context |
//! | exit 2 + stderr | blocks, stderr is the reason |
//! | other exit codes | reported as failure, never blocks |
//! | stdout is a JSON object | [`StructuredDecision`], see [`aggregate`] |

pub mod aggregator;
mod config;
pub mod matcher;
mod result;
mod types;
pub mod validator;

pub use aggregator::aggregate;
pub use config::{DEFAULT_TIMEOUT_SECS, HookCommand, HookConfig, HookMatcher};
pub use result::{Decision, DispatchResult, ExitOutcome, HookResult, StructuredDecision};
pub use types::{
    CompactTrigger, EventPayload, HookEvent, HookType, NotificationData, PostToolUseData,
    PreCompactData, PreToolUseData, StopData, UserPromptSubmitData,
};
pub use validator::{validate_command, validate_command_value, validate_path};
