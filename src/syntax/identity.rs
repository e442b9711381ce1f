//! Per-generation node identities.
//!
//! Every parse produces a new [`Generation`]. Nodes of that parse are
//! addressed by [`NodeId`], a generation tag plus the node's dense arena
//! index. Ids are only meaningful inside their own generation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static GENERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Tag identifying one parse generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Allocate a new, never before seen generation.
    ///
    /// Thread-safe and monotonically increasing for the life of the process.
    pub fn next() -> Self {
        Generation(GENERATION_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Raw counter value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Stable handle for a node within one parse generation.
///
/// Suitable as a map key or selection value. Two ids from different
/// generations never compare equal, even when they share an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    generation: Generation,
    index: u32,
}

impl NodeId {
    pub(crate) fn new(generation: Generation, index: u32) -> Self {
        Self { generation, index }
    }

    pub fn generation(self) -> Generation {
        self.generation
    }

    /// Dense pre-order index of the node in its tree
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.generation, self.index)
    }
}
