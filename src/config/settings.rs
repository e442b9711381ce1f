use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::selection::{MultiRangePolicy, SelectionPolicy};
use crate::text::IndexEncoding;

/// Contents of a `cst-explorer.toml` file.
///
/// Every field is optional so that partial files can be layered on top of
/// each other with [`merge_settings`](super::merge_settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExplorerSettings {
    /// Language used when the file type cannot be detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub text: TextSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub log: LogSettings,
    /// File extension → language
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filetypes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TextSettings {
    /// Index space of selections reported by the text view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<IndexEncoding>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_trivia: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_range: Option<MultiRangePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// `env_logger` filter, e.g. `"info"` or `"cst_explorer::selection=debug"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl ExplorerSettings {
    pub fn encoding(&self) -> IndexEncoding {
        self.text.encoding.unwrap_or_default()
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            multi_range: self.selection.multi_range.unwrap_or_default(),
            include_trivia: self.selection.include_trivia.unwrap_or(false),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or("warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
            language = "rust"

            [text]
            encoding = "utf-32"

            [selection]
            include_trivia = true
            multi_range = "enclosing"

            [log]
            level = "debug"

            [filetypes]
            rsx = "rust"
        "#;
        let settings: ExplorerSettings = toml::from_str(toml).unwrap();

        assert_eq!(settings.language.as_deref(), Some("rust"));
        assert_eq!(settings.encoding(), IndexEncoding::Utf32);
        assert_eq!(
            settings.selection_policy(),
            SelectionPolicy {
                multi_range: MultiRangePolicy::Enclosing,
                include_trivia: true,
            }
        );
        assert_eq!(settings.log_level(), "debug");
        assert_eq!(settings.filetypes.get("rsx").map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_empty_settings_fall_back_to_defaults() {
        let settings: ExplorerSettings = toml::from_str("").unwrap();

        assert_eq!(settings.encoding(), IndexEncoding::Utf16);
        assert_eq!(settings.selection_policy(), SelectionPolicy::default());
        assert_eq!(settings.log_level(), "warn");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = toml::from_str::<ExplorerSettings>("[selection]\nmulti = \"first\"\n");
        assert!(result.is_err(), "typo in key should not be ignored");
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let result = toml::from_str::<ExplorerSettings>("[text]\nencoding = \"latin-1\"\n");
        assert!(result.is_err());
    }
}
