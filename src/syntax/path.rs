//! Root-to-node ancestor paths for breadcrumb navigation.

use super::linker::ParentLinks;
use super::tree::Node;

/// Build the path from the root down to `node`, both inclusive.
///
/// Follows the parent links upward and reverses, so the result always
/// starts with the tree root, ends with `node`, and has `depth + 1` entries.
pub fn path_to<'t>(links: &ParentLinks, node: Node<'t>) -> Vec<Node<'t>> {
    let mut path = Vec::with_capacity(links.depth(node) + 1);
    path.push(node);
    path.extend(links.ancestors(node));
    path.reverse();
    path
}

/// Breadcrumb label for a node: named nodes show their kind, anonymous
/// tokens show the quoted token text.
pub fn breadcrumb_label(node: Node<'_>) -> String {
    if node.is_named() {
        node.kind().to_string()
    } else {
        format!("\"{}\"", node.kind())
    }
}

/// Labels of every node on the path to `node`
pub fn breadcrumbs(links: &ParentLinks, node: Node<'_>) -> Vec<String> {
    path_to(links, node)
        .into_iter()
        .map(breadcrumb_label)
        .collect()
}
