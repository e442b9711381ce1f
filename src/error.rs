//! Error handling types for cst-explorer
//!
//! This module provides the error type shared by the document layer, the
//! language/parser layer and configuration loading. Lookups that can
//! legitimately find nothing (e.g. `locate` past the end of the source)
//! return `Option` instead.

use std::path::PathBuf;
use std::sync::PoisonError;
use thiserror::Error;

use crate::syntax::Generation;

/// Comprehensive error type for explorer operations
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Language not registered
    #[error("Language not found: {language}")]
    LanguageNotFound { language: String },

    /// The parser produced no tree at all (no language set, timeout, cancellation)
    #[error("Parse failed for language {language}: {message}")]
    Parse { language: String, message: String },

    /// The file is not valid UTF-8
    #[error("Corrupt file (not valid UTF-8): {}", path.display())]
    CorruptFile { path: PathBuf },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A parse result arrived for a revision that has been superseded
    #[error("Stale parse for revision {parsed}, current revision is {current}")]
    StaleParse { parsed: u64, current: u64 },

    /// A node id from another parse generation was used
    #[error("Node id belongs to generation {node}, current generation is {current}")]
    StaleNode { node: Generation, current: Generation },

    /// Malformed tree structure handed to the builder
    #[error("Malformed syntax tree: {message}")]
    MalformedTree { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for explorer operations
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Helper trait to convert PoisonError into a recovered guard
pub trait LockResultExt<T> {
    /// Recover from a poisoned lock, logging which operation triggered it.
    fn recover_poison(self, context: &str) -> Result<T, ExplorerError>;
}

impl<T> LockResultExt<T> for Result<T, PoisonError<T>> {
    fn recover_poison(self, context: &str) -> Result<T, ExplorerError> {
        match self {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                log::warn!(
                    target: "cst_explorer::lock_recovery",
                    "Recovered from poisoned lock in {}",
                    context
                );
                Ok(poisoned.into_inner())
            }
        }
    }
}

/// Helper functions for common error patterns
impl ExplorerError {
    /// Create a language not found error
    pub fn language_not_found(language: impl Into<String>) -> Self {
        ExplorerError::LanguageNotFound {
            language: language.into(),
        }
    }

    /// Create a parse error
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        ExplorerError::Parse {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Create a corrupt file error
    pub fn corrupt_file(path: impl Into<PathBuf>) -> Self {
        ExplorerError::CorruptFile { path: path.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ExplorerError::Config {
            message: message.into(),
        }
    }

    /// Create a malformed tree error
    pub fn malformed_tree(message: impl Into<String>) -> Self {
        ExplorerError::MalformedTree {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ExplorerError::Internal(message.into())
    }
}
