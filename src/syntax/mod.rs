//! Concrete syntax trees and the queries run against them.
//!
//! - [`tree`]: immutable arena tree with trivia, plus its builder
//! - [`lower`]: tree-sitter tree → [`SyntaxTree`]
//! - [`locate`]: byte offset → deepest node
//! - [`linker`] / [`identity`]: parent links and per-generation node ids
//! - [`path`]: root-to-node paths and breadcrumbs
//! - [`snapshot`]: one parse generation bundling all of the above

pub mod describe;
pub mod identity;
pub mod linker;
pub mod locate;
pub mod lower;
pub mod path;
pub mod snapshot;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_utils;

pub use describe::{NodeDetails, describe, dump_tree};
pub use identity::{Generation, NodeId};
pub use linker::{ParentLinker, ParentLinks};
pub use locate::locate;
pub use lower::lower_tree;
pub use path::{breadcrumb_label, breadcrumbs, path_to};
pub use snapshot::Snapshot;
pub use tree::{Node, NodeSpec, SyntaxTree, TreeBuilder};
