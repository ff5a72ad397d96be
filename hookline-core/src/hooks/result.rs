//! Per-hook results and the aggregated dispatch result

use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Decision a hook can return in structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Block,
    /// Any other string; neither approves nor blocks
    #[serde(other)]
    Unknown,
}

/// JSON object a hook may print on stdout
///
/// ```json
/// {"decision": "block", "reason": "nope", "continue": false, "stopReason": "policy"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, rename = "continue", skip_serializing_if = "Option::is_none")]
    pub should_continue: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_output: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl StructuredDecision {
    /// Best-effort decode of a hook's trimmed stdout
    ///
    /// Returns `None` unless the text is exactly one JSON object whose known
    /// fields have the expected types. Plain-text output is not an error.
    pub fn parse(stdout: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(stdout).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn is_block(&self) -> bool {
        self.decision == Some(Decision::Block)
    }

    pub fn stops(&self) -> bool {
        self.should_continue == Some(false)
    }

    pub fn suppresses_output(&self) -> bool {
        self.suppress_output == Some(true)
    }
}

/// How a hook process ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, or `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub timed_out: bool,
    pub cancelled: bool,
}

/// Outcome of one hook command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResult {
    /// The command line that ran
    pub command: String,
    pub success: bool,
    /// Exit code; `-1` when the process never started or was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// Terminated because the dispatch was cancelled
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<StructuredDecision>,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl HookResult {
    /// Package the result of a process that ran to a terminal state
    pub fn from_exit(
        command: impl Into<String>,
        outcome: ExitOutcome,
        stdout: &str,
        stderr: &str,
        duration: Duration,
    ) -> Self {
        let exit_code = outcome.code.unwrap_or(-1);
        let stdout = stdout.trim().to_string();
        let stderr = stderr.trim().to_string();
        let structured_output = StructuredDecision::parse(&stdout);

        Self {
            command: command.into(),
            success: exit_code == 0,
            exit_code,
            stdout,
            stderr,
            timed_out: outcome.timed_out,
            cancelled: outcome.cancelled,
            error: None,
            structured_output,
            duration,
        }
    }

    /// Result for a command that could not be started
    pub fn failed(command: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            command: command.into(),
            success: false,
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            cancelled: false,
            error: Some(error.into()),
            structured_output: None,
            duration,
        }
    }
}

/// Aggregate decision over every hook run for one dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Per-hook results, in configuration order
    pub results: Vec<HookResult>,
    pub should_block: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    pub should_continue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Text hooks contributed back to the agent's context
    pub context_to_add: Vec<String>,
}

impl Default for DispatchResult {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            should_block: false,
            block_reason: None,
            should_continue: true,
            stop_reason: None,
            context_to_add: Vec::new(),
        }
    }
}

impl DispatchResult {
    /// Result of a dispatch that ran no hooks
    pub fn empty() -> Self {
        Self::default()
    }
}

pub(crate) fn serialize_millis<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
