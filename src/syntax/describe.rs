//! Display-oriented views of nodes: detail records and tree dumps.

use std::fmt::Write as _;
use std::ops::Range;

use line_index::{LineIndex, TextSize};
use serde::Serialize;

use super::path::breadcrumb_label;
use super::snapshot::Snapshot;
use super::tree::Node;

/// Everything the detail pane shows about one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetails {
    pub index: u32,
    pub kind: String,
    pub named: bool,
    pub field: Option<String>,
    /// Byte offset where the node starts, trivia included
    pub position: usize,
    /// Byte length of the content, trivia excluded
    pub length: usize,
    pub total_length: usize,
    pub content_range: Range<usize>,
    /// 1-based line of the content start
    pub line: u32,
    /// 1-based UTF-8 column of the content start
    pub column: u32,
    pub leading_trivia: String,
    pub trailing_trivia: String,
    pub error: bool,
    pub missing: bool,
}

/// Collect the detail record for `node`.
pub fn describe(snapshot: &Snapshot, line_index: &LineIndex, node: Node<'_>) -> NodeDetails {
    let source = snapshot.source();
    let content = node.content_range();
    let line_col = line_index.line_col(TextSize::new(content.start as u32));

    NodeDetails {
        index: node.index(),
        kind: node.kind().to_string(),
        named: node.is_named(),
        field: node.field_name().map(str::to_string),
        position: node.start(),
        length: content.len(),
        total_length: node.total_len(),
        content_range: content,
        line: line_col.line + 1,
        column: line_col.col + 1,
        leading_trivia: node.leading_trivia_text(source).to_string(),
        trailing_trivia: node.trailing_trivia_text(source).to_string(),
        error: node.is_error(),
        missing: node.is_missing(),
    }
}

/// Render one node as a single dump row (without indentation).
pub fn node_row(snapshot: &Snapshot, node: Node<'_>) -> String {
    let source = snapshot.source();
    let mut row = String::new();

    if let Some(field) = node.field_name() {
        let _ = write!(row, "{}: ", field);
    }
    let _ = write!(row, "{} {}..{}", breadcrumb_label(node), node.start(), node.end());

    let leading = node.leading_trivia_text(source);
    if !leading.is_empty() {
        let _ = write!(row, " leading={:?}", leading);
    }
    let trailing = node.trailing_trivia_text(source);
    if !trailing.is_empty() {
        let _ = write!(row, " trailing={:?}", trailing);
    }
    if node.is_error() {
        row.push_str(" (error)");
    }
    if node.is_missing() {
        row.push_str(" (missing)");
    }
    row
}

/// Indented dump of the whole tree, one node per line in pre-order.
pub fn dump_tree(snapshot: &Snapshot) -> String {
    let links = snapshot.links();
    snapshot
        .tree()
        .nodes()
        .map(|node| {
            format!(
                "{}{}",
                "  ".repeat(links.depth(node)),
                node_row(snapshot, node)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
