// Background parsing and stale-result rejection

use std::time::Duration;

use cst_explorer::document::{BackgroundParser, Document};
use cst_explorer::language::{DocumentParserPool, TreeSitterParser};
use cst_explorer::selection::TextSelection;
use cst_explorer::text::IndexEncoding;
use cst_explorer::{Explorer, ExplorerError};

fn explorer(text: &str) -> Explorer {
    let parser = TreeSitterParser::builtin("rust").unwrap();
    Explorer::new(Box::new(parser), Document::new(text)).unwrap()
}

#[tokio::test]
async fn test_newer_edit_cancels_parse_in_flight() {
    let mut explorer = explorer("fn a() {}");
    let mut background = BackgroundParser::new("rust", DocumentParserPool::with_builtin())
        .with_timeout(Duration::from_secs(30));

    let first_revision = explorer.edit_text("fn b() {}");
    let first = background.schedule(first_revision, explorer.document().shared_text());
    let second_revision = explorer.edit_text("fn c() {}");
    let second = background.schedule(second_revision, explorer.document().shared_text());

    assert!(
        first.await.unwrap().unwrap().is_none(),
        "superseded parse must not be delivered"
    );
    let outcome = second.await.unwrap().unwrap().expect("latest parse completes");
    assert_eq!(outcome.revision, second_revision);

    explorer.apply_parse(outcome).unwrap();
    assert_eq!(explorer.snapshot().source(), "fn c() {}");
    assert_eq!(explorer.locate(3).unwrap().content_text("fn c() {}"), "c");
}

#[tokio::test]
async fn test_completed_stale_parse_is_never_applied() {
    let mut explorer = explorer("fn a() {}");
    let mut background = BackgroundParser::new("rust", DocumentParserPool::with_builtin());

    let revision = explorer.edit_text("fn b() {}");
    let outcome = background
        .schedule(revision, explorer.document().shared_text())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    // Edit lands after the parse finished but before it was applied
    explorer.edit_text("fn bb() {}");
    let err = explorer.apply_parse(outcome).unwrap_err();

    assert!(matches!(err, ExplorerError::StaleParse { .. }), "got {err:?}");
    assert_eq!(explorer.snapshot().source(), "fn a() {}");
}

#[tokio::test]
async fn test_applied_parse_resyncs_selection() {
    let mut explorer = explorer("fn a() {}");
    let mut background = BackgroundParser::new("rust", DocumentParserPool::with_builtin());
    assert_eq!(explorer.encoding(), IndexEncoding::Utf16);

    explorer.text_selection_changed(TextSelection::caret(3));
    let before = explorer.tree_selection().unwrap();

    let revision = explorer.edit_text("fn abc() {}");
    let outcome = background
        .schedule(revision, explorer.document().shared_text())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    explorer.apply_parse(outcome).unwrap();

    let after = explorer.tree_selection().unwrap();
    assert_ne!(before, after);
    assert_eq!(
        explorer
            .selected_node()
            .unwrap()
            .content_text(explorer.snapshot().source()),
        "abc"
    );
}
