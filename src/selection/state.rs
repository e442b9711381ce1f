//! Selection values and the synchronizer's state record.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::syntax::NodeId;

/// Ordered, disjoint half-open ranges in the host's native index space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSelection {
    ranges: Vec<Range<usize>>,
}

impl TextSelection {
    /// Normalize `ranges` into ascending, disjoint order.
    ///
    /// Reversed ranges are flipped, overlapping ones merged and duplicates
    /// dropped. Ranges that only touch stay separate.
    pub fn new(mut ranges: Vec<Range<usize>>) -> Self {
        for range in ranges.iter_mut() {
            if range.start > range.end {
                *range = range.end..range.start;
            }
        }
        ranges.sort_by_key(|range| (range.start, range.end));

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            if let Some(last) = merged.last_mut()
                && (*last == range || range.start < last.end)
            {
                last.end = last.end.max(range.end);
                continue;
            }
            merged.push(range);
        }
        Self { ranges: merged }
    }

    /// No selection at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(range: Range<usize>) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    /// Zero-width selection at `at`
    pub fn caret(at: usize) -> Self {
        Self::single(at..at)
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn first(&self) -> Option<&Range<usize>> {
        self.ranges.first()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Clamp every range into `[0, len]`, e.g. after the text shrank
    pub fn clamped(&self, len: usize) -> Self {
        Self::new(
            self.ranges
                .iter()
                .map(|range| range.start.min(len)..range.end.min(len))
                .collect(),
        )
    }
}

/// Zero or one selected node.
pub type TreeSelection = Option<NodeId>;

/// How a selection made of several ranges picks its node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiRangePolicy {
    /// Only the first range is honored
    #[default]
    First,
    /// The deepest node covering the span from the smallest start to the
    /// largest end of all ranges
    Enclosing,
}

/// Knobs that change how selections are mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub multi_range: MultiRangePolicy,
    /// Map a selected node to its full range instead of its content range
    pub include_trivia: bool,
}

/// Re-entrancy guard of the synchronizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Idle,
    /// A transition's notification is being delivered; incoming events are
    /// dropped
    Propagating,
}

/// Input events, also used as the notifications the synchronizer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    TextSelectionChanged(TextSelection),
    TreeSelectionChanged(TreeSelection),
}

/// Text selection, tree selection and guard, always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub phase: SyncPhase,
    pub text: TextSelection,
    pub tree: TreeSelection,
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        self.phase == SyncPhase::Idle
    }
}
