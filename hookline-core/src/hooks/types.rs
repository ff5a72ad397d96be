//! Hook event types
//!
//! These types describe the lifecycle events hooks are attached to and the
//! JSON document each hook receives on stdin.
//!
//! All payload types derive `PartialEq` so events can be compared in tests.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HookError;

/// Lifecycle point a hook is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HookType {
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    Stop,
    SubagentStop,
    Notification,
    PreCompact,
}

impl HookType {
    /// Every hook type, in lifecycle order
    pub const ALL: [HookType; 7] = [
        HookType::UserPromptSubmit,
        HookType::PreToolUse,
        HookType::PostToolUse,
        HookType::Stop,
        HookType::SubagentStop,
        HookType::Notification,
        HookType::PreCompact,
    ];

    /// Get the hook type as it appears in configuration and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            HookType::UserPromptSubmit => "UserPromptSubmit",
            HookType::PreToolUse => "PreToolUse",
            HookType::PostToolUse => "PostToolUse",
            HookType::Stop => "Stop",
            HookType::SubagentStop => "SubagentStop",
            HookType::Notification => "Notification",
            HookType::PreCompact => "PreCompact",
        }
    }

    /// Whether events of this type carry a tool name to match against
    pub fn has_tool(&self) -> bool {
        matches!(self, HookType::PreToolUse | HookType::PostToolUse)
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookType {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookType::ALL
            .into_iter()
            .find(|hook_type| hook_type.as_str() == s)
            .ok_or_else(|| HookError::InvalidConfig(format!("unknown hook event '{}'", s)))
    }
}

/// What triggered a compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactTrigger {
    Manual,
    Auto,
}

/// Data for a UserPromptSubmit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPromptSubmitData {
    /// The prompt being submitted
    pub prompt: String,
}

/// Data for a PreToolUse event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreToolUseData {
    /// The tool about to run
    pub tool_name: String,
    /// Tool input parameters
    pub tool_input: Value,
}

/// Data for a PostToolUse event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostToolUseData {
    /// The tool that ran
    pub tool_name: String,
    /// Tool input parameters
    pub tool_input: Value,
    /// Tool output
    pub tool_response: Value,
}

/// Data for a Stop or SubagentStop event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopData {
    /// True when the agent is already continuing because of a stop hook
    pub stop_hook_active: bool,
}

/// Data for a Notification event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Notification message
    pub message: String,
}

/// Data for a PreCompact event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreCompactData {
    pub trigger: CompactTrigger,
    /// Instructions supplied with a manual compaction
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

/// Event-specific part of a hook payload
///
/// Serialized with a `hook_event_name` tag, so the JSON a hook receives looks
/// like `{"hook_event_name": "PreToolUse", "tool_name": "Bash", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hook_event_name")]
pub enum HookEvent {
    UserPromptSubmit(UserPromptSubmitData),
    PreToolUse(PreToolUseData),
    PostToolUse(PostToolUseData),
    Stop(StopData),
    SubagentStop(StopData),
    Notification(NotificationData),
    PreCompact(PreCompactData),
}

impl HookEvent {
    /// Get the hook type
    pub fn hook_type(&self) -> HookType {
        match self {
            HookEvent::UserPromptSubmit(_) => HookType::UserPromptSubmit,
            HookEvent::PreToolUse(_) => HookType::PreToolUse,
            HookEvent::PostToolUse(_) => HookType::PostToolUse,
            HookEvent::Stop(_) => HookType::Stop,
            HookEvent::SubagentStop(_) => HookType::SubagentStop,
            HookEvent::Notification(_) => HookType::Notification,
            HookEvent::PreCompact(_) => HookType::PreCompact,
        }
    }

    /// Get the tool name for tool events
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            HookEvent::PreToolUse(data) => Some(&data.tool_name),
            HookEvent::PostToolUse(data) => Some(&data.tool_name),
            _ => None,
        }
    }

    pub fn user_prompt_submit(prompt: impl Into<String>) -> Self {
        HookEvent::UserPromptSubmit(UserPromptSubmitData {
            prompt: prompt.into(),
        })
    }

    pub fn pre_tool_use(tool_name: impl Into<String>, tool_input: Value) -> Self {
        HookEvent::PreToolUse(PreToolUseData {
            tool_name: tool_name.into(),
            tool_input,
        })
    }

    pub fn post_tool_use(
        tool_name: impl Into<String>,
        tool_input: Value,
        tool_response: Value,
    ) -> Self {
        HookEvent::PostToolUse(PostToolUseData {
            tool_name: tool_name.into(),
            tool_input,
            tool_response,
        })
    }
}

/// The JSON document written to a hook's stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub session_id: String,
    /// Path to the session transcript
    pub transcript_path: PathBuf,
    /// Working directory of the agent; hooks run here
    pub cwd: PathBuf,
    #[serde(flatten)]
    pub event: HookEvent,
}

impl EventPayload {
    pub fn new(
        session_id: impl Into<String>,
        transcript_path: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
        event: HookEvent,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            transcript_path: transcript_path.into(),
            cwd: cwd.into(),
            event,
        }
    }

    /// Get the hook type of the carried event
    pub fn hook_type(&self) -> HookType {
        self.event.hook_type()
    }

    /// Get the tool name, if the event has one
    pub fn tool_name(&self) -> Option<&str> {
        self.event.tool_name()
    }
}
