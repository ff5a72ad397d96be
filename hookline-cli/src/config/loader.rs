use super::types::{DispatcherSection, HooklineConfig, RawDispatcherSection, RawHooklineConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<HooklineConfig> {
        Self::load_layers(Some(&Self::user_config_path()), &Self::project_config_path())
    }

    /// Load and merge the given layers, later layers winning
    pub fn load_layers(user_path: Option<&Path>, project_path: &Path) -> Result<HooklineConfig> {
        let mut raw = RawHooklineConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project_path)?);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        hookline_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with HOOKLINE_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("HOOKLINE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            hookline_paths::project_dir(".").join("config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawHooklineConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawHooklineConfig, overlay: RawHooklineConfig) -> RawHooklineConfig {
        RawHooklineConfig {
            dispatcher: RawDispatcherSection {
                shell: overlay.dispatcher.shell.or(base.dispatcher.shell),
                shell_args: overlay.dispatcher.shell_args.or(base.dispatcher.shell_args),
                kill_grace_ms: overlay
                    .dispatcher
                    .kill_grace_ms
                    .or(base.dispatcher.kill_grace_ms),
                debug: overlay.dispatcher.debug.or(base.dispatcher.debug),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawHooklineConfig) -> HooklineConfig {
        let defaults = DispatcherSection::default();
        HooklineConfig {
            dispatcher: DispatcherSection {
                shell: raw.dispatcher.shell.unwrap_or(defaults.shell),
                shell_args: raw.dispatcher.shell_args.unwrap_or(defaults.shell_args),
                kill_grace_ms: raw.dispatcher.kill_grace_ms.unwrap_or(defaults.kill_grace_ms),
                debug: raw.dispatcher.debug.unwrap_or(defaults.debug),
            },
        }
    }
}
