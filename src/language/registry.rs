use crate::error::{ExplorerError, ExplorerResult, LockResultExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tree_sitter::Language;

/// Name of the grammar compiled into the binary
pub const RUST_LANGUAGE: &str = "rust";

/// Registry of tree-sitter languages available for parsing
#[derive(Clone)]
pub struct LanguageRegistry {
    languages: Arc<Mutex<HashMap<String, Language>>>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registry holding every grammar compiled into the binary
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(RUST_LANGUAGE, tree_sitter_rust::LANGUAGE.into());
        registry
    }

    /// Register a language with the given ID, replacing any previous one
    pub fn register(&self, language_id: impl Into<String>, language: Language) {
        let language_id = language_id.into();
        if let Ok(mut languages) = self.languages.lock().recover_poison("registry::register") {
            log::debug!(
                target: "cst_explorer::language",
                "Registered language {}",
                language_id
            );
            languages.insert(language_id, language);
        }
    }

    /// Get a language by ID
    pub fn get(&self, language_id: &str) -> Option<Language> {
        self.languages
            .lock()
            .recover_poison("registry::get")
            .ok()?
            .get(language_id)
            .cloned()
    }

    /// Like [`get`](Self::get), failing with `LanguageNotFound`
    pub fn require(&self, language_id: &str) -> ExplorerResult<Language> {
        self.get(language_id)
            .ok_or_else(|| ExplorerError::language_not_found(language_id))
    }

    pub fn contains(&self, language_id: &str) -> bool {
        self.get(language_id).is_some()
    }

    /// All registered language IDs, sorted
    pub fn language_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = match self
            .languages
            .lock()
            .recover_poison("registry::language_ids")
        {
            Ok(languages) => languages.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_rust() {
        let registry = LanguageRegistry::with_builtin();
        assert!(registry.contains("rust"));
        assert_eq!(registry.language_ids(), vec!["rust".to_string()]);
    }

    #[test]
    fn test_require_unknown_language() {
        let registry = LanguageRegistry::new();
        let err = registry.require("cobol").unwrap_err();
        assert!(
            matches!(err, ExplorerError::LanguageNotFound { ref language } if language == "cobol"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_registry_survives_poisoned_lock() {
        let registry = LanguageRegistry::with_builtin();
        let languages = Arc::clone(&registry.languages);
        let _ = std::thread::spawn(move || {
            let _guard = languages.lock().unwrap();
            panic!("poison the registry");
        })
        .join();

        assert!(registry.contains("rust"), "lookup should recover the lock");
    }
}
