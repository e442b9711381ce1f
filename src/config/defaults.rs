//! Default configuration values.
//!
//! Used as the bottom layer of the merge chain and by `config init` to print
//! a starting configuration file.

use std::collections::HashMap;

use super::settings::{ExplorerSettings, LogSettings, SelectionSettings, TextSettings};
use crate::error::{ExplorerError, ExplorerResult};
use crate::language::RUST_LANGUAGE;
use crate::selection::MultiRangePolicy;
use crate::text::IndexEncoding;

/// Fully populated settings with every built-in default.
pub fn default_settings() -> ExplorerSettings {
    ExplorerSettings {
        language: Some(RUST_LANGUAGE.to_string()),
        text: TextSettings {
            encoding: Some(IndexEncoding::Utf16),
        },
        selection: SelectionSettings {
            include_trivia: Some(false),
            multi_range: Some(MultiRangePolicy::First),
        },
        log: LogSettings {
            level: Some("warn".to_string()),
        },
        filetypes: HashMap::from([("rs".to_string(), RUST_LANGUAGE.to_string())]),
    }
}

/// Default settings rendered as TOML.
pub fn default_config_toml() -> ExplorerResult<String> {
    toml::to_string_pretty(&default_settings())
        .map_err(|err| ExplorerError::config(format!("failed to render defaults: {}", err)))
}
