//! One parse generation: source text, tree, parent links and identities.

use std::sync::Arc;

use super::identity::{Generation, NodeId};
use super::linker::{ParentLinker, ParentLinks};
use super::locate::locate;
use super::path::path_to;
use super::tree::{Node, SyntaxTree};
use crate::error::{ExplorerError, ExplorerResult};

/// Immutable view of a single parse generation.
///
/// Everything node-related that the selection layer needs is answered
/// against a snapshot; a new snapshot is created for every accepted parse.
#[derive(Debug, Clone)]
pub struct Snapshot {
    source: Arc<str>,
    tree: SyntaxTree,
    links: ParentLinks,
}

impl Snapshot {
    /// Link `tree` and start a new generation for it.
    pub fn new(source: impl Into<Arc<str>>, tree: SyntaxTree) -> Self {
        let source = source.into();
        if tree.source_len() != source.len() {
            log::warn!(
                target: "cst_explorer::snapshot",
                "Tree built for {} bytes but source has {} bytes",
                tree.source_len(),
                source.len()
            );
        }
        if let Err(err) = tree.validate() {
            log::warn!(target: "cst_explorer::snapshot", "{}", err);
        }

        let links = ParentLinker::link(&tree);
        Self {
            source,
            tree,
            links,
        }
    }

    pub fn generation(&self) -> Generation {
        self.links.generation()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn links(&self) -> &ParentLinks {
        &self.links
    }

    /// Identity of `node` in this generation
    pub fn id(&self, node: Node<'_>) -> NodeId {
        self.links.id(node)
    }

    /// Resolve an identity back to its node.
    ///
    /// Ids of other generations are refused rather than reinterpreted.
    pub fn resolve(&self, id: NodeId) -> ExplorerResult<Node<'_>> {
        if id.generation() != self.generation() {
            return Err(ExplorerError::StaleNode {
                node: id.generation(),
                current: self.generation(),
            });
        }
        self.tree
            .node(id.index())
            .ok_or_else(|| ExplorerError::internal(format!("node id {} out of range", id)))
    }

    /// Deepest node containing `offset`
    pub fn locate(&self, offset: usize) -> Option<Node<'_>> {
        locate(&self.tree, offset)
    }

    /// Root-to-node path
    pub fn path_to<'s>(&'s self, node: Node<'s>) -> Vec<Node<'s>> {
        path_to(&self.links, node)
    }

    pub fn parent<'s>(&'s self, node: Node<'s>) -> Option<Node<'s>> {
        self.links.parent(node)
    }
}
