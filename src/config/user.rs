//! User configuration loading.
//!
//! User config location: `$XDG_CONFIG_HOME/cst-explorer/cst-explorer.toml`,
//! falling back to the platform config directory.

use std::path::{Path, PathBuf};

use super::settings::ExplorerSettings;
use crate::error::{ExplorerError, ExplorerResult};

const APP_DIR: &str = "cst-explorer";
const CONFIG_FILE: &str = "cst-explorer.toml";

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/cst-explorer/cst-explorer.toml
/// 2. Otherwise: `dirs::config_dir()`/cst-explorer/cst-explorer.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config),
        _ => dirs::config_dir()?,
    };
    Some(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Load settings from `path`.
///
/// # Errors
/// `Io` if the file cannot be read, `Config` naming the file if it is not
/// valid settings TOML.
pub fn load_from_path(path: &Path) -> ExplorerResult<ExplorerSettings> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|err| ExplorerError::config(format!("{}: {}", path.display(), err)))
}

/// Load the user configuration file if there is one.
pub fn load_user_config() -> ExplorerResult<Option<ExplorerSettings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.is_file() {
        log::debug!(
            target: "cst_explorer::config",
            "No user config at {}",
            path.display()
        );
        return Ok(None);
    }

    log::debug!(target: "cst_explorer::config", "Loading user config {}", path.display());
    load_from_path(&path).map(Some)
}
