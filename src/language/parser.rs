//! Parsing source text into [`SyntaxTree`]s.

use super::parser_pool::DocumentParserPool;
use crate::error::{ExplorerError, ExplorerResult};
use crate::syntax::{SyntaxTree, lower_tree};

/// Anything that can turn source text into a syntax tree.
///
/// The explorer only ever talks to this trait, so hosts can plug in a
/// parser of their own.
pub trait SourceParser: Send {
    /// Language the parser produces trees for
    fn language(&self) -> &str;

    /// Parse `text` from scratch.
    ///
    /// # Returns
    /// A tree covering `[0, text.len())`, or an error if no tree could be
    /// produced at all. Syntax errors still yield a tree with error nodes.
    fn parse(&mut self, text: &str) -> ExplorerResult<SyntaxTree>;
}

/// Parse `text` with a parser from `pool` and lower the result.
pub fn parse_with_pool(
    pool: &mut DocumentParserPool,
    language_id: &str,
    text: &str,
) -> ExplorerResult<SyntaxTree> {
    let mut parser = pool.acquire(language_id)?;
    let parsed = parser.parse(text, None);
    pool.release(language_id.to_string(), parser);

    let tree = parsed
        .ok_or_else(|| ExplorerError::parse(language_id, "parser returned no tree"))?;
    if tree.root_node().has_error() {
        log::debug!(
            target: "cst_explorer::parser",
            "Parsed {} bytes of {} with syntax errors",
            text.len(),
            language_id
        );
    }
    lower_tree(&tree, text)
}

/// [`SourceParser`] backed by tree-sitter.
pub struct TreeSitterParser {
    language_id: String,
    pool: DocumentParserPool,
}

impl TreeSitterParser {
    /// # Errors
    /// `LanguageNotFound` if the pool's registry has no such language.
    pub fn new(
        language_id: impl Into<String>,
        mut pool: DocumentParserPool,
    ) -> ExplorerResult<Self> {
        let language_id = language_id.into();
        // Fail early instead of on first parse
        let parser = pool.acquire(&language_id)?;
        pool.release(language_id.clone(), parser);
        Ok(Self { language_id, pool })
    }

    /// Parser for a built-in grammar
    pub fn builtin(language_id: impl Into<String>) -> ExplorerResult<Self> {
        Self::new(language_id, DocumentParserPool::with_builtin())
    }
}

impl SourceParser for TreeSitterParser {
    fn language(&self) -> &str {
        &self.language_id
    }

    fn parse(&mut self, text: &str) -> ExplorerResult<SyntaxTree> {
        parse_with_pool(&mut self.pool, &self.language_id, text)
    }
}
