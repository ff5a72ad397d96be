//! Structural validation of hook definitions and paths
//!
//! Everything here is synchronous and runs before any process is spawned.
//! Hook commands are treated as trusted configuration: only their shape is
//! checked, never their content.

use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};

use super::config::HookCommand;
use crate::error::HookError;

/// The only hook `type` currently supported
pub const COMMAND_HOOK_TYPE: &str = "command";

/// Check a command string and an optional timeout in seconds
///
/// A command must contain something other than whitespace. This is stricter
/// than plain non-emptiness: `"   "` passes an emptiness check but would
/// only ever run an empty shell script.
pub fn validate_command(command: &str, timeout_seconds: Option<f64>) -> Result<(), HookError> {
    if command.trim().is_empty() {
        return Err(HookError::InvalidHookCommand(
            "command must contain a non-whitespace character".to_string(),
        ));
    }

    if let Some(timeout) = timeout_seconds
        && !(timeout.is_finite() && timeout >= 0.0)
    {
        return Err(HookError::InvalidHookCommand(format!(
            "timeout must be a number >= 0, got {}",
            timeout
        )));
    }

    Ok(())
}

/// Validate one `{type, command, timeout}` entry from a configuration document
pub fn validate_command_value(value: &Value) -> Result<HookCommand, HookError> {
    let entry = value.as_object().ok_or_else(|| {
        HookError::InvalidHookCommand(format!("hook entry must be an object, got {}", value))
    })?;

    check_hook_type(entry)?;

    let command = match entry.get("command") {
        Some(Value::String(command)) => command.as_str(),
        Some(other) => {
            return Err(HookError::InvalidHookCommand(format!(
                "command must be a string, got {}",
                other
            )));
        }
        None => {
            return Err(HookError::InvalidHookCommand(
                "command is required".to_string(),
            ));
        }
    };

    let timeout = match entry.get("timeout") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(HookError::InvalidHookCommand(format!(
                "timeout must be a number, got {}",
                other
            )));
        }
    };

    match timeout {
        Some(secs) => HookCommand::with_timeout_secs(command, secs),
        None => HookCommand::new(command),
    }
}

fn check_hook_type(entry: &Map<String, Value>) -> Result<(), HookError> {
    match entry.get("type") {
        None => Ok(()),
        Some(Value::String(kind)) if kind == COMMAND_HOOK_TYPE => Ok(()),
        Some(other) => Err(HookError::InvalidHookCommand(format!(
            "unsupported hook type {}",
            other
        ))),
    }
}

/// Validate a path and resolve it against `cwd`
///
/// The path is normalized lexically first, so `a/../b` is accepted as `b`.
/// Any `..` that survives normalization is rejected. `..` directly under the
/// root collapses into the root, as it does on the filesystem.
pub fn validate_path(path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Result<PathBuf, HookError> {
    let path = path.as_ref();
    let normalized = normalize(path);

    if normalized
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(HookError::PathTraversal(path.to_path_buf()));
    }

    if normalized.is_absolute() {
        Ok(normalized)
    } else {
        Ok(cwd.as_ref().join(normalized))
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_accepts_plain_command() {
        assert!(validate_command("echo hi", None).is_ok());
        assert!(validate_command("echo hi", Some(0.0)).is_ok());
        assert!(validate_command("echo hi", Some(2.5)).is_ok());
    }

    #[test]
    fn test_rejects_blank_command() {
        assert!(matches!(
            validate_command("", None),
            Err(HookError::InvalidHookCommand(_))
        ));
        assert!(matches!(
            validate_command("   ", None),
            Err(HookError::InvalidHookCommand(_))
        ));
    }

    #[test]
    fn test_rejects_bad_timeouts() {
        for timeout in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    validate_command("true", Some(timeout)),
                    Err(HookError::InvalidHookCommand(_))
                ),
                "timeout {} should be rejected",
                timeout
            );
        }
    }

    #[test]
    fn test_shell_metacharacters_are_not_filtered() {
        assert!(validate_command("echo a; echo b | cat `true`", None).is_ok());
    }

    #[test]
    fn test_command_value_uses_default_timeout() {
        let command = validate_command_value(&json!({"type": "command", "command": "true"})).unwrap();
        assert_eq!(command.command(), "true");
        assert_eq!(command.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_command_value_reads_timeout() {
        let command = validate_command_value(&json!({"command": "true", "timeout": 5})).unwrap();
        assert_eq!(command.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_command_value_rejects_wrong_shapes() {
        let cases = [
            json!("echo hi"),
            json!({"type": "command"}),
            json!({"type": "command", "command": 42}),
            json!({"type": "command", "command": ""}),
            json!({"type": "command", "command": "true", "timeout": "10"}),
            json!({"type": "command", "command": "true", "timeout": -3}),
            json!({"type": "prompt", "command": "true"}),
        ];

        for case in cases {
            assert!(
                matches!(
                    validate_command_value(&case),
                    Err(HookError::InvalidHookCommand(_))
                ),
                "{} should be rejected",
                case
            );
        }
    }

    #[test]
    fn test_relative_path_resolves_against_cwd() {
        let resolved = validate_path("hooks/check.sh", "/work").unwrap();
        assert_eq!(resolved, PathBuf::from("/work/hooks/check.sh"));
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let resolved = validate_path("/etc/hookline/hooks.json", "/work").unwrap();
        assert_eq!(resolved, PathBuf::from("/etc/hookline/hooks.json"));
    }

    #[test]
    fn test_inner_parent_segments_normalize_away() {
        let resolved = validate_path("a/./b/../c", "/work").unwrap();
        assert_eq!(resolved, PathBuf::from("/work/a/c"));
    }

    #[test]
    fn test_escaping_parent_segments_are_rejected() {
        for path in ["../secret", "a/../../secret", "./../x"] {
            assert!(
                matches!(validate_path(path, "/work"), Err(HookError::PathTraversal(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_parent_of_root_collapses() {
        let resolved = validate_path("/../etc/hosts", "/work").unwrap();
        assert_eq!(resolved, PathBuf::from("/etc/hosts"));
    }
}
