//! Lowering of tree-sitter trees into [`SyntaxTree`].
//!
//! tree-sitter leaves whitespace between nodes unowned. Lowering hands every
//! such gap to a neighbouring node as trivia so that children tile their
//! parent exactly and the root spans the whole source:
//!
//! - the part of a gap before its first newline trails the preceding sibling
//! - the rest (newline included) leads the following sibling
//! - gaps before the first child or after the last child go to that child

use std::ops::Range;

use super::tree::{NodeSpec, SyntaxTree, TreeBuilder};
use crate::error::ExplorerResult;

enum Step<'a> {
    Enter {
        node: tree_sitter::Node<'a>,
        field: Option<&'static str>,
        full: Range<usize>,
    },
    Exit,
}

/// Convert a tree-sitter tree for `source` into a [`SyntaxTree`].
///
/// Error-recovery nodes (`ERROR`, missing tokens) are kept as ordinary
/// nodes so partial trees of invalid input can still be explored.
pub fn lower_tree(tree: &tree_sitter::Tree, source: &str) -> ExplorerResult<SyntaxTree> {
    let mut builder = TreeBuilder::new();
    let mut stack = vec![Step::Enter {
        node: tree.root_node(),
        field: None,
        full: 0..source.len(),
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Exit => builder.finish_node()?,
            Step::Enter { node, field, full } => {
                builder.start_node(node_spec(node, field, full.clone()))?;
                stack.push(Step::Exit);

                let children = collect_children(node);
                let contents: Vec<_> = children
                    .iter()
                    .map(|(child, _)| child.byte_range())
                    .collect();
                let bounds = tile_children(&contents, full, source);

                // Reverse so the first child is entered first.
                for ((child, field), full) in children.into_iter().zip(bounds).rev() {
                    stack.push(Step::Enter {
                        node: child,
                        field,
                        full,
                    });
                }
            }
        }
    }

    builder.finish(source.len())
}

fn node_spec(
    node: tree_sitter::Node<'_>,
    field: Option<&'static str>,
    full: Range<usize>,
) -> NodeSpec {
    let mut spec = NodeSpec::new(node.kind(), full).content(node.byte_range());
    if !node.is_named() {
        spec = spec.anonymous();
    }
    if node.is_error() {
        spec = spec.error();
    }
    if node.is_missing() {
        spec = spec.missing();
    }
    if let Some(name) = field {
        spec = spec.field(name);
    }
    spec
}

fn collect_children(
    node: tree_sitter::Node<'_>,
) -> Vec<(tree_sitter::Node<'_>, Option<&'static str>)> {
    let mut children = Vec::with_capacity(node.child_count());
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            children.push((cursor.node(), cursor.field_name()));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    children
}

/// Compute the full (trivia-inclusive) range of every child so that the
/// children exactly tile `parent`.
///
/// # Arguments
/// * `contents` - Content byte ranges of the children, in source order
/// * `parent` - Full byte range of the parent
/// * `source` - The source text, used to find newlines in gaps
pub(crate) fn tile_children(
    contents: &[Range<usize>],
    parent: Range<usize>,
    source: &str,
) -> Vec<Range<usize>> {
    let mut bounds = Vec::with_capacity(contents.len());
    let mut start = parent.start;

    for (i, content) in contents.iter().enumerate() {
        let end = match contents.get(i + 1) {
            None => parent.end,
            Some(next) => {
                let gap_start = content.end.clamp(start, parent.end);
                let gap_end = next.start.clamp(gap_start, parent.end);
                split_gap(source, gap_start..gap_end)
            }
        };
        bounds.push(start..end);
        start = end;
    }

    bounds
}

/// Offset at which a gap stops trailing the previous node: its first line
/// break (`\n`, or the `\r` of a `\r\n` pair), or the end of the gap if it
/// has none.
fn split_gap(source: &str, gap: Range<usize>) -> usize {
    let Some(bytes) = source.as_bytes().get(gap.clone()) else {
        return gap.end;
    };
    match bytes.iter().position(|&b| b == b'\n') {
        Some(newline) if newline > 0 && bytes[newline - 1] == b'\r' => gap.start + newline - 1,
        Some(newline) => gap.start + newline,
        None => gap.end,
    }
}
