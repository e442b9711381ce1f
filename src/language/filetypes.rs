//! File extension → language resolution.

use std::collections::HashMap;
use std::path::Path;

use super::registry::RUST_LANGUAGE;

/// Extract the extension of `path` without the leading dot.
///
/// Hidden files without an extension (`.bashrc`) have none.
pub fn detect_from_extension(path: &Path) -> Option<&str> {
    let filename = path.file_name()?.to_str()?;
    let dot_pos = filename.rfind('.')?;
    if dot_pos == 0 {
        return None;
    }
    let ext = &filename[dot_pos + 1..];
    (!ext.is_empty()).then_some(ext)
}

/// Resolves file paths to language identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiletypeResolver {
    filetype_map: HashMap<String, String>,
}

impl Default for FiletypeResolver {
    fn default() -> Self {
        let mut filetype_map = HashMap::new();
        filetype_map.insert("rs".to_string(), RUST_LANGUAGE.to_string());
        Self { filetype_map }
    }
}

impl FiletypeResolver {
    /// Built-in mappings extended (and overridden) by `extra`
    pub fn with_mappings(extra: &HashMap<String, String>) -> Self {
        let mut resolver = Self::default();
        for (extension, language) in extra {
            resolver.add_mapping(extension.trim_start_matches('.'), language);
        }
        resolver
    }

    pub fn add_mapping(&mut self, extension: &str, language: &str) {
        self.filetype_map
            .insert(extension.to_string(), language.to_string());
    }

    pub fn language_for_extension(&self, extension: &str) -> Option<&str> {
        self.filetype_map.get(extension).map(String::as_str)
    }

    /// Language for a document path, by extension
    pub fn language_for_path(&self, path: &Path) -> Option<&str> {
        detect_from_extension(path).and_then(|ext| self.language_for_extension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/path/to/file.rs", Some("rs"))]
    #[case("/path/to/archive.tar.gz", Some("gz"))]
    #[case("/path/to/Makefile", None)]
    #[case("/home/.bashrc", None)]
    #[case("trailing.", None)]
    fn test_detect_from_extension(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(detect_from_extension(Path::new(path)), expected);
    }

    #[test]
    fn test_default_maps_rust() {
        let resolver = FiletypeResolver::default();
        assert_eq!(resolver.language_for_path(Path::new("src/lib.rs")), Some("rust"));
        assert_eq!(resolver.language_for_path(Path::new("README.md")), None);
    }

    #[test]
    fn test_extra_mappings_override_and_extend() {
        let extra = HashMap::from([
            (".rsx".to_string(), "rust".to_string()),
            ("rs".to_string(), "ron".to_string()),
        ]);
        let resolver = FiletypeResolver::with_mappings(&extra);

        assert_eq!(resolver.language_for_extension("rsx"), Some("rust"));
        assert_eq!(resolver.language_for_extension("rs"), Some("ron"));
    }
}
