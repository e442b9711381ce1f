//! Parent links and node identities for one parse generation.

use super::identity::{Generation, NodeId};
use super::tree::{Node, SyntaxTree};

/// Parent table built once per parse generation.
///
/// Produced by a single pre-order walk over the tree's child links. The
/// same walk tags every visited node with a [`NodeId`] of the generation.
#[derive(Debug, Clone)]
pub struct ParentLinks {
    generation: Generation,
    parents: Vec<Option<u32>>,
    depths: Vec<u32>,
}

impl ParentLinks {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Identity of the node in this generation
    pub fn id(&self, node: Node<'_>) -> NodeId {
        NodeId::new(self.generation, node.index())
    }

    /// Parent of `node`, `None` for the root
    pub fn parent<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let parent = (*self.parents.get(node.index() as usize)?)?;
        node.tree().node(parent)
    }

    /// Parent identity of the node behind `id`
    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        if id.generation() != self.generation {
            return None;
        }
        let parent = (*self.parents.get(id.index() as usize)?)?;
        Some(NodeId::new(self.generation, parent))
    }

    /// Number of ancestors of `node` (0 for the root)
    pub fn depth(&self, node: Node<'_>) -> usize {
        self.depths
            .get(node.index() as usize)
            .map(|&depth| depth as usize)
            .unwrap_or(0)
    }

    /// Ancestors of `node`, innermost first, excluding `node` itself
    pub fn ancestors<'t, 'l>(&'l self, node: Node<'t>) -> impl Iterator<Item = Node<'t>> + 'l
    where
        't: 'l,
    {
        std::iter::successors(self.parent(node), move |&current| self.parent(current))
    }
}

/// Builds [`ParentLinks`] for a tree.
pub struct ParentLinker;

impl ParentLinker {
    /// Walk `tree` once, recording each node's parent and tagging it with
    /// an identity of a freshly allocated generation.
    ///
    /// O(n) time and space in the number of nodes.
    pub fn link(tree: &SyntaxTree) -> ParentLinks {
        let generation = Generation::next();
        let mut parents = vec![None; tree.len()];
        let mut depths = vec![0; tree.len()];
        let mut visited = vec![false; tree.len()];

        let mut stack = vec![(tree.root(), None::<u32>, 0u32)];
        while let Some((node, parent, depth)) = stack.pop() {
            let index = node.index() as usize;
            if visited[index] {
                log::error!(
                    target: "cst_explorer::linker",
                    "Node {:?} reachable through more than one parent; keeping first link",
                    node
                );
                continue;
            }
            visited[index] = true;
            parents[index] = parent;
            depths[index] = depth;

            for child in node.children() {
                stack.push((child, Some(node.index()), depth + 1));
            }
        }

        log::debug!(
            target: "cst_explorer::linker",
            "Linked {} nodes for generation {}",
            tree.len(),
            generation
        );

        ParentLinks {
            generation,
            parents,
            depths,
        }
    }
}
