//! Hand-built trees shared by unit tests.

use super::tree::{NodeSpec, SyntaxTree, TreeBuilder};

/// `"let x = 1\nlet y = 2"` with trivia attached the way the lowering pass
/// attaches it: spaces trail the preceding token, the newline leads the
/// second statement.
///
/// Pre-order indices:
/// 0 source_file, 1 let_declaration, 2 "let", 3 identifier, 4 "=",
/// 5 integer_literal, 6 let_declaration, 7 "let", 8 identifier, 9 "=",
/// 10 integer_literal
pub(crate) fn let_statements_tree() -> (&'static str, SyntaxTree) {
    let source = "let x = 1\nlet y = 2";
    let mut b = TreeBuilder::new();

    b.start_node(NodeSpec::new("source_file", 0..19)).unwrap();

    b.start_node(NodeSpec::new("let_declaration", 0..9)).unwrap();
    b.token(NodeSpec::new("let", 0..4).content(0..3).anonymous())
        .unwrap();
    b.token(
        NodeSpec::new("identifier", 4..6)
            .content(4..5)
            .field("pattern"),
    )
    .unwrap();
    b.token(NodeSpec::new("=", 6..8).content(6..7).anonymous())
        .unwrap();
    b.token(NodeSpec::new("integer_literal", 8..9).field("value"))
        .unwrap();
    b.finish_node().unwrap();

    b.start_node(NodeSpec::new("let_declaration", 9..19).content(10..19))
        .unwrap();
    b.token(NodeSpec::new("let", 9..14).content(10..13).anonymous())
        .unwrap();
    b.token(
        NodeSpec::new("identifier", 14..16)
            .content(14..15)
            .field("pattern"),
    )
    .unwrap();
    b.token(NodeSpec::new("=", 16..18).content(16..17).anonymous())
        .unwrap();
    b.token(NodeSpec::new("integer_literal", 18..19).field("value"))
        .unwrap();
    b.finish_node().unwrap();

    b.finish_node().unwrap();
    (source, b.finish(source.len()).unwrap())
}

/// Root `[0, 10)` whose two children both claim offset 5.
pub(crate) fn overlapping_tree() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.start_node(NodeSpec::new("root", 0..10)).unwrap();
    b.token(NodeSpec::new("left", 0..6)).unwrap();
    b.token(NodeSpec::new("right", 4..10)).unwrap();
    b.finish_node().unwrap();
    b.finish(10).unwrap()
}
