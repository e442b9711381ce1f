//! Byte offset to deepest node resolution.

use super::tree::{Node, SyntaxTree};

/// Find the most deeply nested node whose full range contains `offset`.
///
/// Ranges are half-open, so an offset sitting exactly on the boundary
/// between two siblings resolves into the following sibling. Returns `None`
/// when `offset` lies outside the root (e.g. at end of source).
///
/// Two children claiming the same offset means the tree is malformed. That
/// trips a debug assertion; release builds log it and return `None` so a
/// pathological tree never takes the caller down.
///
/// # Arguments
/// * `tree` - The tree to search
/// * `offset` - Byte offset into the source text
pub fn locate(tree: &SyntaxTree, offset: usize) -> Option<Node<'_>> {
    let mut current = tree.root();
    if !current.contains(offset) {
        return None;
    }

    loop {
        let mut matching = current.children().filter(|child| child.contains(offset));
        let Some(next) = matching.next() else {
            return Some(current);
        };

        if let Some(other) = matching.next() {
            debug_assert!(
                false,
                "overlapping children {:?} and {:?} both contain offset {}",
                next, other, offset
            );
            log::error!(
                target: "cst_explorer::locate",
                "Malformed tree: children {:?} and {:?} of {:?} both contain offset {}",
                next,
                other,
                current,
                offset
            );
            return None;
        }

        current = next;
    }
}
