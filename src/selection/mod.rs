//! Two-way selection synchronization between text view and tree view.

pub mod state;
pub mod sync;

pub use state::{
    MultiRangePolicy, SelectionEvent, SelectionPolicy, SelectionState, SyncPhase, TextSelection,
    TreeSelection,
};
pub use sync::{DropReason, Outcome, SyncContext, Transition, resync, settle, transition};
