//! Hook configuration
//!
//! A [`HookConfig`] maps each [`HookType`] to an ordered list of
//! [`HookMatcher`]s, each holding an ordered list of [`HookCommand`]s. The
//! whole structure is validated when it is built, so a loaded config never
//! needs re-checking at dispatch time.
//!
//! ## JSON format
//!
//! ```json
//! {
//!   "PreToolUse": [
//!     {
//!       "matcher": "Edit|Write",
//!       "hooks": [{ "type": "command", "command": "./lint.sh", "timeout": 30 }]
//!     }
//!   ]
//! }
//! ```
//!
//! A settings document with the same map under a top-level `hooks` key is
//! accepted too.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::matcher;
use super::types::HookType;
use super::validator::{validate_command, validate_command_value};
use crate::error::HookError;

/// Timeout applied when a hook does not configure one
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// One external program invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookCommand {
    command: String,
    #[serde(rename = "timeout_ms", serialize_with = "crate::hooks::result::serialize_millis")]
    timeout: Duration,
}

impl HookCommand {
    /// Create a command with the default timeout
    pub fn new(command: impl Into<String>) -> Result<Self, HookError> {
        let command = command.into();
        validate_command(&command, None)?;
        Ok(Self {
            command,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create a command with a timeout in (possibly fractional) seconds
    pub fn with_timeout_secs(command: impl Into<String>, secs: f64) -> Result<Self, HookError> {
        let command = command.into();
        validate_command(&command, Some(secs))?;
        let timeout = Duration::try_from_secs_f64(secs)
            .map_err(|e| HookError::InvalidHookCommand(format!("timeout {}: {}", secs, e)))?;
        Ok(Self { command, timeout })
    }

    /// The shell command line
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// A tool-name pattern and the commands it selects
#[derive(Debug, Clone)]
pub struct HookMatcher {
    pattern: Option<String>,
    compiled: Option<Regex>,
    commands: Vec<HookCommand>,
}

impl HookMatcher {
    /// A matcher that applies to every event of its category
    pub fn any(commands: Vec<HookCommand>) -> Self {
        Self {
            pattern: None,
            compiled: None,
            commands,
        }
    }

    /// A matcher restricted to tool names matching `pattern`
    ///
    /// An empty pattern behaves like [`HookMatcher::any`]. A pattern that is
    /// not a valid regular expression is kept and matched literally.
    pub fn with_pattern(pattern: impl Into<String>, commands: Vec<HookCommand>) -> Self {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Self::any(commands);
        }
        Self {
            compiled: matcher::compile_pattern(&pattern),
            pattern: Some(pattern),
            commands,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub(crate) fn compiled(&self) -> Option<&Regex> {
        self.compiled.as_ref()
    }

    pub fn commands(&self) -> &[HookCommand] {
        &self.commands
    }

    /// Whether this matcher applies to `tool_name`
    pub fn selects(&self, tool_name: Option<&str>) -> bool {
        matcher::selects(self, tool_name)
    }
}

/// Hook configuration for all lifecycle events
#[derive(Debug, Clone, Default)]
pub struct HookConfig {
    events: BTreeMap<HookType, Vec<HookMatcher>>,
}

impl HookConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a matcher for `event`
    pub fn with_matcher(mut self, event: HookType, matcher: HookMatcher) -> Self {
        self.push(event, matcher);
        self
    }

    /// Append a matcher for `event`
    pub fn push(&mut self, event: HookType, matcher: HookMatcher) {
        self.events.entry(event).or_default().push(matcher);
    }

    /// Matchers configured for `event`, in configuration order
    pub fn matchers(&self, event: HookType) -> &[HookMatcher] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over configured events and their matchers
    pub fn iter(&self) -> impl Iterator<Item = (HookType, &[HookMatcher])> {
        self.events.iter().map(|(event, m)| (*event, m.as_slice()))
    }

    /// Total number of commands across all events
    pub fn command_count(&self) -> usize {
        self.events
            .values()
            .flatten()
            .map(|m| m.commands().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, HookError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HookError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Validate an already-parsed JSON configuration document
    pub fn from_value(value: &Value) -> Result<Self, HookError> {
        let root = value.as_object().ok_or_else(|| {
            HookError::InvalidConfig("hook configuration must be a JSON object".to_string())
        })?;

        // Settings documents nest the event map under "hooks"
        let events = match root.get("hooks") {
            Some(Value::Object(events)) => events,
            Some(_) => {
                return Err(HookError::InvalidConfig(
                    "\"hooks\" must be an object".to_string(),
                ));
            }
            None => root,
        };

        let mut config = HookConfig::new();
        for (name, matchers) in events {
            let event: HookType = name.parse()?;
            let matchers = matchers.as_array().ok_or_else(|| {
                HookError::InvalidConfig(format!("{} must map to a list of matchers", name))
            })?;
            for entry in matchers {
                config.push(event, parse_matcher(event, entry)?);
            }
        }

        Ok(config)
    }
}

fn parse_matcher(event: HookType, entry: &Value) -> Result<HookMatcher, HookError> {
    let entry = entry.as_object().ok_or_else(|| {
        HookError::InvalidConfig(format!("{} matcher must be an object", event))
    })?;

    let pattern = match entry.get("matcher") {
        None | Some(Value::Null) => None,
        Some(Value::String(pattern)) => Some(pattern.clone()),
        Some(other) => {
            return Err(HookError::InvalidConfig(format!(
                "{} matcher pattern must be a string, got {}",
                event, other
            )));
        }
    };

    let hooks = match entry.get("hooks") {
        Some(Value::Array(hooks)) => hooks,
        _ => {
            return Err(HookError::InvalidConfig(format!(
                "{} matcher must have a \"hooks\" list",
                event
            )));
        }
    };

    let commands = hooks
        .iter()
        .map(validate_command_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match pattern {
        Some(pattern) => HookMatcher::with_pattern(pattern, commands),
        None => HookMatcher::any(commands),
    })
}
