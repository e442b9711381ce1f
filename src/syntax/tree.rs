//! Immutable concrete syntax tree with trivia.
//!
//! Nodes live in an arena in pre-order; every node records its byte range
//! including trivia, how much of that range is leading/trailing trivia, and
//! its ordered child links. The tree itself only knows child links; parent
//! links and identities are layered on top by [`super::ParentLinker`].

use std::fmt;
use std::ops::Range;

use crate::error::{ExplorerError, ExplorerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    kind: &'static str,
    field_name: Option<&'static str>,
    named: bool,
    error: bool,
    missing: bool,
    start: usize,
    total_len: usize,
    leading_trivia: usize,
    trailing_trivia: usize,
    children: Vec<u32>,
}

/// A parsed tree for one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    source_len: usize,
}

impl SyntaxTree {
    /// The root node (always arena index 0)
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            index: 0,
        }
    }

    /// Node at the given arena index
    pub fn node(&self, index: u32) -> Option<Node<'_>> {
        if (index as usize) < self.nodes.len() {
            Some(Node { tree: self, index })
        } else {
            None
        }
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Byte length of the source text the tree was built for
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.nodes.len() as u32).map(move |index| Node { tree: self, index })
    }

    fn data(&self, index: u32) -> &NodeData {
        &self.nodes[index as usize]
    }

    /// Check the structural invariants of the tree.
    ///
    /// The root must span exactly `[0, source_len)`, and every node's
    /// children must be ordered, pairwise disjoint and contained in it.
    pub fn validate(&self) -> ExplorerResult<()> {
        let root = self.root();
        if root.range() != (0..self.source_len) {
            return Err(ExplorerError::malformed_tree(format!(
                "root spans {:?}, source is {} bytes",
                root.range(),
                self.source_len
            )));
        }

        for node in self.nodes() {
            let range = node.range();
            let mut previous_end = range.start;
            for child in node.children() {
                let child_range = child.range();
                if child_range.start < previous_end {
                    return Err(ExplorerError::malformed_tree(format!(
                        "child {} `{}` at {:?} overlaps or precedes its previous sibling in node {}",
                        child.index(),
                        child.kind(),
                        child_range,
                        node.index()
                    )));
                }
                if child_range.end > range.end {
                    return Err(ExplorerError::malformed_tree(format!(
                        "child {} `{}` at {:?} escapes parent {} at {:?}",
                        child.index(),
                        child.kind(),
                        child_range,
                        node.index(),
                        range
                    )));
                }
                previous_end = child_range.end;
            }
        }

        Ok(())
    }
}

/// Lightweight handle to a node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    index: u32,
}

impl<'t> Node<'t> {
    /// Arena index of this node
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The tree this node belongs to
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Kind tag (grammar symbol name)
    pub fn kind(&self) -> &'t str {
        self.tree.data(self.index).kind
    }

    /// Field name under which this node appears in its parent, if any
    pub fn field_name(&self) -> Option<&'t str> {
        self.tree.data(self.index).field_name
    }

    /// Named nodes are grammar rules; anonymous ones are literal tokens
    pub fn is_named(&self) -> bool {
        self.tree.data(self.index).named
    }

    /// Error-recovery node produced for invalid syntax
    pub fn is_error(&self) -> bool {
        self.tree.data(self.index).error
    }

    /// Zero-width node inserted by error recovery
    pub fn is_missing(&self) -> bool {
        self.tree.data(self.index).missing
    }

    /// Start byte offset, including leading trivia
    pub fn start(&self) -> usize {
        self.tree.data(self.index).start
    }

    /// Total byte length, including trivia
    pub fn total_len(&self) -> usize {
        self.tree.data(self.index).total_len
    }

    pub fn end(&self) -> usize {
        self.start() + self.total_len()
    }

    /// Full byte range `[start, start + total_len)`
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn leading_trivia_len(&self) -> usize {
        self.tree.data(self.index).leading_trivia
    }

    pub fn trailing_trivia_len(&self) -> usize {
        self.tree.data(self.index).trailing_trivia
    }

    /// Byte range without leading and trailing trivia
    pub fn content_range(&self) -> Range<usize> {
        let end = self.end();
        let start = (self.start() + self.leading_trivia_len()).min(end);
        let content_end = end.saturating_sub(self.trailing_trivia_len()).max(start);
        start..content_end
    }

    /// Whether `offset` lies in the half-open full range of this node
    pub fn contains(&self, offset: usize) -> bool {
        self.range().contains(&offset)
    }

    pub fn child_count(&self) -> usize {
        self.tree.data(self.index).children.len()
    }

    pub fn child(&self, i: usize) -> Option<Node<'t>> {
        let tree = self.tree;
        tree.data(self.index)
            .children
            .get(i)
            .map(|&index| Node { tree, index })
    }

    /// Children in source order
    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        tree.data(self.index)
            .children
            .iter()
            .map(move |&index| Node { tree, index })
    }

    /// Full text of this node, trivia included
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.range()).unwrap_or_default()
    }

    /// Text of this node without trivia
    pub fn content_text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.content_range()).unwrap_or_default()
    }

    pub fn leading_trivia_text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start()..self.content_range().start)
            .unwrap_or_default()
    }

    pub fn trailing_trivia_text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.content_range().end..self.end())
            .unwrap_or_default()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}#{}", self.kind(), self.range(), self.index)
    }
}

/// Description of a node handed to [`TreeBuilder`].
///
/// `full` is the node's range including trivia; `content` is the part
/// without trivia. Trivia lengths are derived from the difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub kind: &'static str,
    pub field_name: Option<&'static str>,
    pub named: bool,
    pub error: bool,
    pub missing: bool,
    pub full: Range<usize>,
    pub content: Range<usize>,
}

impl NodeSpec {
    /// A named node without trivia
    pub fn new(kind: &'static str, full: Range<usize>) -> Self {
        Self {
            kind,
            field_name: None,
            named: true,
            error: false,
            missing: false,
            content: full.clone(),
            full,
        }
    }

    pub fn content(mut self, content: Range<usize>) -> Self {
        self.content = content;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.named = false;
        self
    }

    pub fn field(mut self, name: &'static str) -> Self {
        self.field_name = Some(name);
        self
    }

    pub fn error(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }
}

/// Incremental builder producing a [`SyntaxTree`] in pre-order.
///
/// The builder checks nesting only; range invariants are checked by
/// [`SyntaxTree::validate`] so that defective trees can still be built
/// and inspected.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<u32>,
    finished_root: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a node; subsequent nodes become its children until
    /// [`finish_node`](Self::finish_node).
    pub fn start_node(&mut self, spec: NodeSpec) -> ExplorerResult<u32> {
        if self.finished_root {
            return Err(ExplorerError::malformed_tree(format!(
                "node `{}` started after the root was finished",
                spec.kind
            )));
        }

        let index = self.nodes.len() as u32;
        let full = spec.full.start..spec.full.end.max(spec.full.start);
        let content_start = spec.content.start.clamp(full.start, full.end);
        let content_end = spec.content.end.clamp(content_start, full.end);

        self.nodes.push(NodeData {
            kind: spec.kind,
            field_name: spec.field_name,
            named: spec.named,
            error: spec.error,
            missing: spec.missing,
            start: full.start,
            total_len: full.end.saturating_sub(full.start),
            leading_trivia: content_start - full.start,
            trailing_trivia: full.end - content_end,
            children: Vec::new(),
        });

        if let Some(&parent) = self.stack.last() {
            self.nodes[parent as usize].children.push(index);
        }
        self.stack.push(index);
        Ok(index)
    }

    /// Close the innermost open node
    pub fn finish_node(&mut self) -> ExplorerResult<()> {
        if self.stack.pop().is_none() {
            return Err(ExplorerError::malformed_tree(
                "finish_node called without an open node",
            ));
        }
        if self.stack.is_empty() {
            self.finished_root = true;
        }
        Ok(())
    }

    /// Add a leaf node
    pub fn token(&mut self, spec: NodeSpec) -> ExplorerResult<u32> {
        let index = self.start_node(spec)?;
        self.finish_node()?;
        Ok(index)
    }

    /// Complete the tree for a source text of `source_len` bytes
    pub fn finish(self, source_len: usize) -> ExplorerResult<SyntaxTree> {
        if !self.stack.is_empty() {
            return Err(ExplorerError::malformed_tree(format!(
                "{} node(s) left open",
                self.stack.len()
            )));
        }
        if self.nodes.is_empty() {
            return Err(ExplorerError::malformed_tree("tree has no root"));
        }
        Ok(SyntaxTree {
            nodes: self.nodes,
            source_len,
        })
    }
}
