//! The explorer session: one document, its current parse and both selections.
//!
//! All state the synchronizer reads or writes (snapshot, text selection,
//! tree selection, phase) lives here and is replaced as a unit on every
//! event, before observers are notified.

use std::sync::Arc;

use line_index::LineIndex;

use crate::config::ExplorerSettings;
use crate::document::{Document, ParseOutcome, Revision};
use crate::error::{ExplorerError, ExplorerResult};
use crate::language::SourceParser;
use crate::selection::{
    DropReason, Outcome, SelectionEvent, SelectionPolicy, SelectionState, SyncContext,
    TextSelection, Transition, TreeSelection, resync, settle, transition,
};
use crate::syntax::{Node, NodeDetails, NodeId, Snapshot, describe};
use crate::text::IndexEncoding;

/// Receives the notifications emitted by the synchronizer.
///
/// A view that reacts to a notification by changing its own selection may
/// report that change as the return value. It is fed back while the
/// session is still propagating and therefore dropped.
pub trait SelectionObserver {
    fn selection_changed(&mut self, event: &SelectionEvent) -> Option<SelectionEvent>;
}

pub struct Explorer {
    document: Document,
    parser: Box<dyn SourceParser>,
    snapshot: Snapshot,
    line_index: LineIndex,
    selection: SelectionState,
    encoding: IndexEncoding,
    policy: SelectionPolicy,
    observers: Vec<Box<dyn SelectionObserver>>,
}

impl Explorer {
    /// Parse `document` and start a session with default options.
    pub fn new(mut parser: Box<dyn SourceParser>, document: Document) -> ExplorerResult<Self> {
        let tree = parser.parse(document.text())?;
        let snapshot = Snapshot::new(document.shared_text(), tree);
        log::debug!(
            target: "cst_explorer::explorer",
            "Opened {} document at {} as {}",
            parser.language(),
            document.revision(),
            snapshot.generation()
        );

        Ok(Self {
            line_index: LineIndex::new(document.text()),
            document,
            parser,
            snapshot,
            selection: SelectionState::default(),
            encoding: IndexEncoding::default(),
            policy: SelectionPolicy::default(),
            observers: Vec::new(),
        })
    }

    /// Like [`new`](Self::new), taking encoding and policy from settings.
    pub fn with_settings(
        parser: Box<dyn SourceParser>,
        document: Document,
        settings: &ExplorerSettings,
    ) -> ExplorerResult<Self> {
        let mut explorer = Self::new(parser, document)?;
        explorer.encoding = settings.encoding();
        explorer.policy = settings.selection_policy();
        Ok(explorer)
    }

    pub fn subscribe(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn text_selection(&self) -> &TextSelection {
        &self.selection.text
    }

    pub fn tree_selection(&self) -> TreeSelection {
        self.selection.tree
    }

    pub fn encoding(&self) -> IndexEncoding {
        self.encoding
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    /// Node currently selected in the tree view
    pub fn selected_node(&self) -> Option<Node<'_>> {
        self.selection
            .tree
            .and_then(|id| self.snapshot.resolve(id).ok())
    }

    /// Deepest node containing the byte `offset`
    pub fn locate(&self, offset: usize) -> Option<Node<'_>> {
        self.snapshot.locate(offset)
    }

    pub fn path_to<'s>(&'s self, node: Node<'s>) -> Vec<Node<'s>> {
        self.snapshot.path_to(node)
    }

    pub fn id(&self, node: Node<'_>) -> NodeId {
        self.snapshot.id(node)
    }

    /// Resolve an id of the current generation
    pub fn node(&self, id: NodeId) -> ExplorerResult<Node<'_>> {
        self.snapshot.resolve(id)
    }

    /// Detail record for the detail pane
    pub fn details(&self, node: Node<'_>) -> NodeDetails {
        describe(&self.snapshot, &self.line_index, node)
    }

    pub fn text_selection_changed(&mut self, selection: TextSelection) -> Outcome {
        self.handle(SelectionEvent::TextSelectionChanged(selection))
    }

    pub fn tree_selection_changed(&mut self, selection: TreeSelection) -> Outcome {
        self.handle(SelectionEvent::TreeSelectionChanged(selection))
    }

    /// Apply a selection event reported by one of the views.
    pub fn handle(&mut self, event: SelectionEvent) -> Outcome {
        let ctx = SyncContext::new(&self.snapshot, self.encoding, self.policy);
        let step = transition(&self.selection, &ctx, event);
        self.deliver(step)
    }

    /// Replace the text and reparse synchronously.
    ///
    /// # Errors
    /// Whatever the parser reports when it cannot produce a tree at all; the
    /// document, snapshot and selection are left untouched in that case.
    pub fn set_text(&mut self, text: impl Into<Arc<str>>) -> ExplorerResult<Outcome> {
        let text: Arc<str> = text.into();
        let tree = self.parser.parse(&text)?;
        let revision = self.document.update_text(Arc::clone(&text));
        Ok(self.install(revision, Snapshot::new(text, tree)))
    }

    /// Replace the text without parsing; the tree follows via
    /// [`apply_parse`](Self::apply_parse).
    pub fn edit_text(&mut self, text: impl Into<Arc<str>>) -> Revision {
        self.document.update_text(text)
    }

    /// Install a background parse result.
    ///
    /// # Errors
    /// `StaleParse` if the text has been edited since the parse was started.
    pub fn apply_parse(&mut self, outcome: ParseOutcome) -> ExplorerResult<Outcome> {
        let current = self.document.revision();
        if outcome.revision != current {
            log::debug!(
                target: "cst_explorer::explorer",
                "Discarding parse of {}, document is at {}",
                outcome.revision,
                current
            );
            return Err(ExplorerError::StaleParse {
                parsed: outcome.revision.get(),
                current: current.get(),
            });
        }
        Ok(self.install(outcome.revision, Snapshot::new(outcome.text, outcome.tree)))
    }

    fn install(&mut self, revision: Revision, snapshot: Snapshot) -> Outcome {
        log::debug!(
            target: "cst_explorer::explorer",
            "Installing {} for {}",
            snapshot.generation(),
            revision
        );
        self.line_index = LineIndex::new(snapshot.source());
        self.snapshot = snapshot;

        // Whatever was propagating belongs to the previous generation
        let state = settle(std::mem::take(&mut self.selection));
        let ctx = SyncContext::new(&self.snapshot, self.encoding, self.policy);
        let step = resync(&state, &ctx);
        self.deliver(step)
    }

    /// Store the new state, notify observers, then settle.
    fn deliver(&mut self, step: Transition) -> Outcome {
        let Transition {
            state,
            emitted,
            outcome,
        } = step;
        self.selection = state;

        if let Some(event) = emitted {
            log::debug!(target: "cst_explorer::explorer", "Propagating {:?}", event);
            let ctx = SyncContext::new(&self.snapshot, self.encoding, self.policy);
            for observer in self.observers.iter_mut() {
                if let Some(feedback) = observer.selection_changed(&event) {
                    let echo = transition(&self.selection, &ctx, feedback);
                    debug_assert_eq!(echo.outcome, Outcome::Dropped(DropReason::Reentrant));
                }
            }
            self.selection = settle(std::mem::take(&mut self.selection));
        }
        outcome
    }
}
