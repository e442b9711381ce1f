//! Concrete syntax tree explorer core.
//!
//! Resolves byte offsets to syntax nodes, builds ancestor paths for
//! breadcrumbs, and keeps a text selection and a tree selection in sync
//! without feedback loops.

pub mod config;
pub mod document;
pub mod error;
pub mod explorer;
pub mod language;
pub mod selection;
pub mod syntax;
pub mod text;

pub use error::{ExplorerError, ExplorerResult};
pub use explorer::{Explorer, SelectionObserver};
