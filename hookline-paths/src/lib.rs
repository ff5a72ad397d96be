//! Where hookline looks for its settings.
//!
//! Two layers: a per-user directory following the XDG Base Directory rules
//! on every platform, and a `.hookline/` directory inside the project.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the per-project settings directory
pub const PROJECT_DIR_NAME: &str = ".hookline";

const APP_DIR_NAME: &str = "hookline";

/// Get the per-user hookline config directory.
///
/// Returns `$XDG_CONFIG_HOME/hookline` when that variable holds an absolute
/// path, otherwise `~/.config/hookline`.
///
/// # Examples
///
/// ```
/// use hookline_paths::config_dir;
///
/// let settings = config_dir().join("config.toml");
/// assert!(settings.ends_with("hookline/config.toml"));
/// ```
pub fn config_dir() -> PathBuf {
    resolve_config_dir(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
}

/// Get the project settings directory under `project_root`.
pub fn project_dir(project_root: impl AsRef<Path>) -> PathBuf {
    project_root.as_ref().join(PROJECT_DIR_NAME)
}

// Empty and relative values are invalid per the XDG spec and are skipped
fn resolve_config_dir(xdg_config_home: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    let base = xdg_config_home
        .map(PathBuf::from)
        .filter(|dir| dir.is_absolute())
        .or_else(|| home.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join(APP_DIR_NAME)
}
