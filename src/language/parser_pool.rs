use std::collections::HashMap;
use std::sync::Arc;
use tree_sitter::Parser;

use super::registry::LanguageRegistry;
use crate::error::{ExplorerError, ExplorerResult};

/// Creates tree-sitter parsers configured for a registered language
pub struct ParserFactory {
    language_registry: Arc<LanguageRegistry>,
}

impl ParserFactory {
    pub fn new(language_registry: Arc<LanguageRegistry>) -> Self {
        Self { language_registry }
    }

    /// Create a new parser for the specified language
    pub fn create_parser(&self, language_id: &str) -> ExplorerResult<Parser> {
        let language = self.language_registry.require(language_id)?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|err| ExplorerError::parse(language_id, err.to_string()))?;
        Ok(parser)
    }
}

/// Pool of idle parsers, keyed by language ID
pub struct DocumentParserPool {
    available: HashMap<String, Vec<Parser>>,
    factory: Arc<ParserFactory>,
}

impl DocumentParserPool {
    pub fn new(factory: Arc<ParserFactory>) -> Self {
        Self {
            available: HashMap::new(),
            factory,
        }
    }

    /// Pool over every built-in grammar
    pub fn with_builtin() -> Self {
        Self::new(Arc::new(ParserFactory::new(Arc::new(
            LanguageRegistry::with_builtin(),
        ))))
    }

    /// Acquire a parser for the specified language.
    /// Returns a pooled parser if one is idle, otherwise creates a new one.
    pub fn acquire(&mut self, language_id: &str) -> ExplorerResult<Parser> {
        if let Some(parsers) = self.available.get_mut(language_id)
            && let Some(parser) = parsers.pop()
        {
            return Ok(parser);
        }

        self.factory.create_parser(language_id)
    }

    /// Return a parser to the pool for reuse
    pub fn release(&mut self, language_id: String, mut parser: Parser) {
        parser.reset();
        self.available.entry(language_id).or_default().push(parser);
    }

    pub fn clear(&mut self) {
        self.available.clear();
    }

    /// Number of idle parsers for a language
    pub fn pool_size(&self, language_id: &str) -> usize {
        self.available
            .get(language_id)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}
