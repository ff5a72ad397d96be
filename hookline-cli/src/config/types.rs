use hookline_core::runner::DEFAULT_KILL_GRACE;
use hookline_core::{DispatcherConfig, ShellConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHooklineConfig {
    #[serde(default)]
    pub dispatcher: RawDispatcherSection,
}

/// Dispatcher config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDispatcherSection {
    /// Shell executable used to run hook commands
    pub shell: Option<String>,

    /// Arguments passed to the shell before the command
    pub shell_args: Option<Vec<String>>,

    /// Milliseconds between SIGTERM and SIGKILL for hooks that time out
    pub kill_grace_ms: Option<u64>,

    /// Log every hook's output
    pub debug: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HooklineConfig {
    #[serde(default)]
    pub dispatcher: DispatcherSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherSection {
    pub shell: String,
    pub shell_args: Vec<String>,
    pub kill_grace_ms: u64,
    pub debug: bool,
}

impl Default for DispatcherSection {
    fn default() -> Self {
        let shell = ShellConfig::default();
        Self {
            shell: shell.program,
            shell_args: shell.args,
            kill_grace_ms: DEFAULT_KILL_GRACE.as_millis() as u64,
            debug: false,
        }
    }
}

impl DispatcherSection {
    /// Build the core dispatcher configuration
    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            shell: ShellConfig {
                program: self.shell.clone(),
                args: self.shell_args.clone(),
            },
            kill_grace: Duration::from_millis(self.kill_grace_ms),
            debug: self.debug,
        }
    }
}
