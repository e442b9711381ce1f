//! Pure selection transitions between the text view and the tree view.
//!
//! A transition takes the current [`SelectionState`] and one event and
//! returns the next state plus at most one notification for the other view.
//! Nothing here touches a view; the caller delivers the notification and then
//! calls [`settle`] to leave the propagating phase.

use std::ops::Range;

use super::state::{
    MultiRangePolicy, SelectionEvent, SelectionPolicy, SelectionState, SyncPhase, TextSelection,
    TreeSelection,
};
use crate::syntax::{Node, NodeId, Snapshot};
use crate::text::{IndexEncoding, TextMapper};

/// What the synchronizer needs to know about the current parse.
#[derive(Debug, Clone, Copy)]
pub struct SyncContext<'a> {
    pub snapshot: &'a Snapshot,
    pub encoding: IndexEncoding,
    pub policy: SelectionPolicy,
}

impl<'a> SyncContext<'a> {
    pub fn new(snapshot: &'a Snapshot, encoding: IndexEncoding, policy: SelectionPolicy) -> Self {
        Self {
            snapshot,
            encoding,
            policy,
        }
    }

    pub fn mapper(&self) -> TextMapper<'a> {
        TextMapper::new(self.snapshot.source(), self.encoding)
    }

    /// Native range a node maps to in the text view
    pub fn native_range_of(&self, node: Node<'_>) -> Option<Range<usize>> {
        let bytes = if self.policy.include_trivia {
            node.range()
        } else {
            node.content_range()
        };
        self.mapper().range_to_native(bytes)
    }

    /// The single native range a text selection is reduced to
    fn target_range(&self, selection: &TextSelection) -> Option<Range<usize>> {
        match self.policy.multi_range {
            MultiRangePolicy::First => selection.first().cloned(),
            MultiRangePolicy::Enclosing => {
                let start = selection.ranges().iter().map(|r| r.start).min()?;
                let end = selection.ranges().iter().map(|r| r.end).max()?;
                Some(start..end.max(start))
            }
        }
    }

    /// Node a native range selects.
    ///
    /// `Ok(None)` when the range maps but no node contains its start, e.g.
    /// a caret at the end of the source.
    fn node_for(&self, target: &Range<usize>) -> Result<Option<Node<'a>>, DropReason> {
        let mapper = self.mapper();
        let start = mapper.to_byte(target.start).ok_or(DropReason::Unmappable)?;
        let Some(node) = self.snapshot.locate(start) else {
            return Ok(None);
        };

        match self.policy.multi_range {
            MultiRangePolicy::First => Ok(Some(node)),
            MultiRangePolicy::Enclosing => {
                let Some(end) = mapper.to_byte(target.end) else {
                    return Ok(Some(node));
                };
                let enclosing = self
                    .snapshot
                    .path_to(node)
                    .into_iter()
                    .rev()
                    .find(|candidate| candidate.end() >= end);
                Ok(Some(enclosing.unwrap_or(node)))
            }
        }
    }
}

/// Why an event did not change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Arrived while a notification was being delivered
    Reentrant,
    /// Node id belongs to an older parse
    StaleNode,
    /// Selection does not fall on character boundaries of the text
    Unmappable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The other view must be told; a notification was emitted
    Propagated,
    /// The other view already agrees
    Consistent,
    /// Selection was emptied on one side and cleared on the other
    Cleared,
    Dropped(DropReason),
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SelectionState,
    /// Notification for the view that did not originate the event
    pub emitted: Option<SelectionEvent>,
    pub outcome: Outcome,
}

impl Transition {
    fn unchanged(state: &SelectionState, reason: DropReason) -> Self {
        Self {
            state: state.clone(),
            emitted: None,
            outcome: Outcome::Dropped(reason),
        }
    }

    fn quiet(state: SelectionState, outcome: Outcome) -> Self {
        Self {
            state,
            emitted: None,
            outcome,
        }
    }

    fn propagate(mut state: SelectionState, event: SelectionEvent) -> Self {
        state.phase = SyncPhase::Propagating;
        Self {
            state,
            emitted: Some(event),
            outcome: Outcome::Propagated,
        }
    }
}

/// Apply one selection event.
///
/// # Arguments
/// * `state` - Current state
/// * `ctx` - Snapshot and mapping options of the current parse
/// * `event` - Selection change reported by one of the views
///
/// # Returns
/// The next state. When `emitted` is set the state is `Propagating` until
/// [`settle`] is called.
pub fn transition(
    state: &SelectionState,
    ctx: &SyncContext<'_>,
    event: SelectionEvent,
) -> Transition {
    if state.phase == SyncPhase::Propagating {
        log::debug!(
            target: "cst_explorer::selection",
            "Dropping re-entrant {:?}",
            event
        );
        return Transition::unchanged(state, DropReason::Reentrant);
    }

    match event {
        SelectionEvent::TextSelectionChanged(selection) => text_changed(state, ctx, selection),
        SelectionEvent::TreeSelectionChanged(selection) => tree_changed(state, ctx, selection),
    }
}

/// Leave the propagating phase once the notification has been delivered.
pub fn settle(mut state: SelectionState) -> SelectionState {
    state.phase = SyncPhase::Idle;
    state
}

/// Recompute the tree selection after a new parse was installed.
///
/// The text selection is clamped to the new text and the tree selection is
/// derived from it again, since node ids of the previous parse are void.
pub fn resync(state: &SelectionState, ctx: &SyncContext<'_>) -> Transition {
    let text = state.text.clamped(ctx.mapper().native_len());
    let tree = ctx
        .target_range(&text)
        .and_then(|target| ctx.node_for(&target).ok().flatten())
        .map(|node| ctx.snapshot.id(node));

    let next = SelectionState {
        phase: SyncPhase::Idle,
        text,
        tree,
    };

    if tree.is_none() && state.tree.is_none() {
        Transition::quiet(next, Outcome::Consistent)
    } else {
        Transition::propagate(next, SelectionEvent::TreeSelectionChanged(tree))
    }
}

fn text_changed(
    state: &SelectionState,
    ctx: &SyncContext<'_>,
    selection: TextSelection,
) -> Transition {
    let Some(target) = ctx.target_range(&selection) else {
        let next = SelectionState {
            phase: SyncPhase::Idle,
            text: selection,
            tree: None,
        };
        return Transition::quiet(next, Outcome::Cleared);
    };

    // Keep the current node when the text already shows exactly its range
    if let Some(current) = state
        .tree
        .and_then(|id| ctx.snapshot.resolve(id).ok())
        .filter(|node| ctx.native_range_of(*node).as_ref() == Some(&target))
    {
        let next = SelectionState {
            phase: SyncPhase::Idle,
            text: selection,
            tree: Some(ctx.snapshot.id(current)),
        };
        return Transition::quiet(next, Outcome::Consistent);
    }

    let node = match ctx.node_for(&target) {
        Ok(node) => node,
        Err(reason) => {
            log::debug!(
                target: "cst_explorer::selection",
                "Native range {:?} does not map onto the text",
                target
            );
            return Transition::unchanged(state, reason);
        }
    };

    let tree: TreeSelection = node.map(|node| ctx.snapshot.id(node));
    let next = SelectionState {
        phase: SyncPhase::Idle,
        text: selection,
        tree,
    };
    if tree == state.tree {
        Transition::quiet(next, Outcome::Consistent)
    } else {
        Transition::propagate(next, SelectionEvent::TreeSelectionChanged(tree))
    }
}

fn tree_changed(
    state: &SelectionState,
    ctx: &SyncContext<'_>,
    selection: Option<NodeId>,
) -> Transition {
    let Some(id) = selection else {
        let next = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::empty(),
            tree: None,
        };
        return Transition::quiet(next, Outcome::Cleared);
    };

    let node = match ctx.snapshot.resolve(id) {
        Ok(node) => node,
        Err(err) => {
            log::warn!(target: "cst_explorer::selection", "{}", err);
            return Transition::unchanged(state, DropReason::StaleNode);
        }
    };

    let Some(range) = ctx.native_range_of(node) else {
        log::warn!(
            target: "cst_explorer::selection",
            "Node {} does not map onto character boundaries",
            id
        );
        return Transition::unchanged(state, DropReason::Unmappable);
    };

    let text = TextSelection::single(range);
    let next = SelectionState {
        phase: SyncPhase::Idle,
        text: text.clone(),
        tree: Some(id),
    };
    if text == state.text {
        Transition::quiet(next, Outcome::Consistent)
    } else {
        Transition::propagate(next, SelectionEvent::TextSelectionChanged(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::test_utils::let_statements_tree;

    fn snapshot() -> Snapshot {
        let (source, tree) = let_statements_tree();
        Snapshot::new(source, tree)
    }

    fn ctx(snapshot: &Snapshot) -> SyncContext<'_> {
        SyncContext::new(snapshot, IndexEncoding::Utf8, SelectionPolicy::default())
    }

    fn text_event(ranges: Vec<Range<usize>>) -> SelectionEvent {
        SelectionEvent::TextSelectionChanged(TextSelection::new(ranges))
    }

    /// Feed `event` and every emitted notification back in, settling in
    /// between, until nothing more is emitted.
    fn run_to_quiescence(
        state: SelectionState,
        ctx: &SyncContext<'_>,
        event: SelectionEvent,
    ) -> (SelectionState, usize) {
        let mut state = state;
        let mut next_event = Some(event);
        let mut propagations = 0;

        while let Some(event) = next_event.take() {
            let step = transition(&state, ctx, event);
            state = settle(step.state);
            if let Some(emitted) = step.emitted {
                propagations += 1;
                assert!(propagations <= 2, "propagation did not terminate");
                next_event = Some(emitted);
            }
        }
        (state, propagations)
    }

    #[test]
    fn test_text_selection_selects_deepest_node() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);

        let step = transition(&SelectionState::default(), &ctx, text_event(vec![4..4]));

        let expected = snapshot.id(snapshot.tree().node(3).unwrap());
        assert_eq!(step.outcome, Outcome::Propagated);
        assert_eq!(step.state.tree, Some(expected));
        assert_eq!(step.state.phase, SyncPhase::Propagating);
        assert_eq!(
            step.emitted,
            Some(SelectionEvent::TreeSelectionChanged(Some(expected)))
        );
    }

    #[test]
    fn test_tree_selection_selects_content_range() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);
        let id = snapshot.id(snapshot.tree().node(6).unwrap());

        let step = transition(
            &SelectionState::default(),
            &ctx,
            SelectionEvent::TreeSelectionChanged(Some(id)),
        );

        // Leading newline is trivia, not content
        assert_eq!(step.state.text, TextSelection::single(10..19));
        assert_eq!(
            step.emitted,
            Some(SelectionEvent::TextSelectionChanged(TextSelection::single(
                10..19
            )))
        );
    }

    #[test]
    fn test_round_trip_keeps_selected_node() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);

        for node in snapshot.tree().nodes() {
            let id = snapshot.id(node);
            let (state, _) = run_to_quiescence(
                SelectionState::default(),
                &ctx,
                SelectionEvent::TreeSelectionChanged(Some(id)),
            );
            assert_eq!(state.tree, Some(id), "round trip changed selection of {node:?}");
        }
    }

    #[test]
    fn test_propagation_terminates_within_two_steps() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);

        // Caret inside "let" of the second statement
        let (state, propagations) =
            run_to_quiescence(SelectionState::default(), &ctx, text_event(vec![11..11]));

        assert_eq!(propagations, 2);
        assert_eq!(state.text, TextSelection::single(10..13));
        assert_eq!(
            state.tree,
            Some(snapshot.id(snapshot.tree().node(7).unwrap()))
        );
    }

    #[test]
    fn test_consistent_selection_emits_nothing() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);
        let id = snapshot.id(snapshot.tree().node(3).unwrap());
        let state = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::single(4..5),
            tree: Some(id),
        };

        let text_step = transition(&state, &ctx, text_event(vec![4..5]));
        assert_eq!(text_step.outcome, Outcome::Consistent);
        assert_eq!(text_step.emitted, None);

        let tree_step = transition(&state, &ctx, SelectionEvent::TreeSelectionChanged(Some(id)));
        assert_eq!(tree_step.outcome, Outcome::Consistent);
        assert_eq!(tree_step.emitted, None);
        assert_eq!(tree_step.state, state);
    }

    #[test]
    fn test_empty_text_selection_clears_tree() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);
        let state = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::single(4..5),
            tree: Some(snapshot.id(snapshot.tree().node(3).unwrap())),
        };

        let step = transition(&state, &ctx, text_event(vec![]));

        assert_eq!(step.outcome, Outcome::Cleared);
        assert_eq!(step.emitted, None);
        assert_eq!(step.state.tree, None);
        assert!(step.state.is_idle());
    }

    #[test]
    fn test_deselecting_node_clears_text() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);
        let state = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::single(4..5),
            tree: Some(snapshot.id(snapshot.tree().node(3).unwrap())),
        };

        let step = transition(&state, &ctx, SelectionEvent::TreeSelectionChanged(None));

        assert_eq!(step.outcome, Outcome::Cleared);
        assert!(step.state.text.is_empty());
        assert_eq!(step.emitted, None);
    }

    #[test]
    fn test_events_while_propagating_are_dropped() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);

        let first = transition(&SelectionState::default(), &ctx, text_event(vec![4..4]));
        assert_eq!(first.state.phase, SyncPhase::Propagating);

        // The tree view echoes a different node back during delivery
        let echo = snapshot.id(snapshot.tree().node(1).unwrap());
        let second = transition(
            &first.state,
            &ctx,
            SelectionEvent::TreeSelectionChanged(Some(echo)),
        );

        assert_eq!(second.outcome, Outcome::Dropped(DropReason::Reentrant));
        assert_eq!(second.state, first.state);
        assert_eq!(second.emitted, None);
    }

    #[test]
    fn test_stale_node_is_dropped() {
        let old = snapshot();
        let current = snapshot();
        let ctx = ctx(&current);
        let stale = old.id(old.tree().node(3).unwrap());

        let step = transition(
            &SelectionState::default(),
            &ctx,
            SelectionEvent::TreeSelectionChanged(Some(stale)),
        );

        assert_eq!(step.outcome, Outcome::Dropped(DropReason::StaleNode));
        assert_eq!(step.state, SelectionState::default());
    }

    #[test]
    fn test_text_beyond_source_is_unmappable() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);

        let step = transition(&SelectionState::default(), &ctx, text_event(vec![40..41]));

        assert_eq!(step.outcome, Outcome::Dropped(DropReason::Unmappable));
        assert_eq!(step.emitted, None);
    }

    #[test]
    fn test_caret_at_end_of_source_clears_tree() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);
        let state = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::single(4..5),
            tree: Some(snapshot.id(snapshot.tree().node(3).unwrap())),
        };

        let step = transition(&state, &ctx, text_event(vec![19..19]));

        assert_eq!(step.outcome, Outcome::Propagated);
        assert_eq!(step.state.tree, None);
        assert_eq!(step.emitted, Some(SelectionEvent::TreeSelectionChanged(None)));

        // Nothing selected before, nothing to tell
        let quiet = transition(&SelectionState::default(), &ctx, text_event(vec![19..19]));
        assert_eq!(quiet.outcome, Outcome::Consistent);
        assert_eq!(quiet.emitted, None);
    }

    #[test]
    fn test_first_policy_ignores_later_ranges() {
        let snapshot = snapshot();
        let ctx = ctx(&snapshot);

        let step = transition(
            &SelectionState::default(),
            &ctx,
            text_event(vec![4..5, 14..15]),
        );

        assert_eq!(
            step.state.tree,
            Some(snapshot.id(snapshot.tree().node(3).unwrap()))
        );
    }

    #[test]
    fn test_enclosing_policy_selects_common_ancestor() {
        let snapshot = snapshot();
        let policy = SelectionPolicy {
            multi_range: MultiRangePolicy::Enclosing,
            include_trivia: false,
        };
        let ctx = SyncContext::new(&snapshot, IndexEncoding::Utf8, policy);

        let within_statement = transition(
            &SelectionState::default(),
            &ctx,
            text_event(vec![4..5, 8..9]),
        );
        assert_eq!(
            within_statement.state.tree,
            Some(snapshot.id(snapshot.tree().node(1).unwrap()))
        );

        let across_statements = transition(
            &SelectionState::default(),
            &ctx,
            text_event(vec![4..5, 14..15]),
        );
        assert_eq!(
            across_statements.state.tree,
            Some(snapshot.id(snapshot.tree().root()))
        );
    }

    #[test]
    fn test_include_trivia_selects_full_range() {
        let snapshot = snapshot();
        let policy = SelectionPolicy {
            multi_range: MultiRangePolicy::First,
            include_trivia: true,
        };
        let ctx = SyncContext::new(&snapshot, IndexEncoding::Utf8, policy);
        let id = snapshot.id(snapshot.tree().node(6).unwrap());

        let step = transition(
            &SelectionState::default(),
            &ctx,
            SelectionEvent::TreeSelectionChanged(Some(id)),
        );

        assert_eq!(step.state.text, TextSelection::single(9..19));
    }

    #[test]
    fn test_resync_recomputes_tree_for_new_generation() {
        let old = snapshot();
        let current = snapshot();
        let state = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::single(14..15),
            tree: Some(old.id(old.tree().node(8).unwrap())),
        };

        let step = resync(&state, &ctx(&current));

        let expected = current.id(current.tree().node(8).unwrap());
        assert_eq!(step.state.tree, Some(expected));
        assert_eq!(
            step.emitted,
            Some(SelectionEvent::TreeSelectionChanged(Some(expected)))
        );
    }

    #[test]
    fn test_resync_clamps_text_past_the_end() {
        let current = snapshot();
        let state = SelectionState {
            phase: SyncPhase::Idle,
            text: TextSelection::single(25..30),
            tree: None,
        };

        let step = resync(&state, &ctx(&current));

        assert_eq!(step.state.text, TextSelection::single(19..19));
        // End of text is inside no node
        assert_eq!(step.state.tree, None);
        assert_eq!(step.emitted, None);
    }
}
