//! Configuration: settings types, defaults and the layered load chain.
//!
//! Layers are merged in order defaults → user config → explicit `--config`
//! file → command line flags, later layers winning key by key.

pub mod defaults;
pub mod settings;
pub mod user;

use std::path::Path;

pub use defaults::{default_config_toml, default_settings};
pub use settings::{ExplorerSettings, LogSettings, SelectionSettings, TextSettings};
pub use user::{load_from_path, load_user_config, user_config_path};

use crate::error::ExplorerResult;

/// Merge two settings layers, preferring values from `primary` over `fallback`
pub fn merge_settings(fallback: ExplorerSettings, primary: ExplorerSettings) -> ExplorerSettings {
    let mut filetypes = fallback.filetypes;
    filetypes.extend(primary.filetypes);

    ExplorerSettings {
        language: primary.language.or(fallback.language),
        text: TextSettings {
            encoding: primary.text.encoding.or(fallback.text.encoding),
        },
        selection: SelectionSettings {
            include_trivia: primary
                .selection
                .include_trivia
                .or(fallback.selection.include_trivia),
            multi_range: primary
                .selection
                .multi_range
                .or(fallback.selection.multi_range),
        },
        log: LogSettings {
            level: primary.log.level.or(fallback.log.level),
        },
        filetypes,
    }
}

/// Load defaults, the user config and an optional explicit file, merged.
pub fn load_settings(explicit: Option<&Path>) -> ExplorerResult<ExplorerSettings> {
    let mut settings = default_settings();

    if let Some(user) = load_user_config()? {
        settings = merge_settings(settings, user);
    }
    if let Some(path) = explicit {
        log::debug!(target: "cst_explorer::config", "Loading config {}", path.display());
        settings = merge_settings(settings, load_from_path(path)?);
    }
    Ok(settings)
}
