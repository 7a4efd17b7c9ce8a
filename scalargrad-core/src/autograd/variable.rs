use crate::error::AutogradError;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for a node in the computation graph.
///
/// Used as the only key for visited sets and derivative accumulators during
/// the backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Returns the raw integer behind this id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonically increasing source of [`NodeId`]s.
///
/// Increments are atomic, so nodes may be constructed from several threads
/// without two of them sharing an id. Graphs hold the counter behind an `Arc`
/// so tests can inject a fresh one and get deterministic ids.
#[derive(Debug)]
pub struct IdCounter {
    next: AtomicU64,
}

impl IdCounter {
    /// Creates a counter whose first id is `1`.
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a counter whose first id is `first`.
    pub const fn starting_at(first: u64) -> Self {
        IdCounter {
            next: AtomicU64::new(first),
        }
    }

    /// Hands out the next id.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the id the next call to [`IdCounter::next_id`] will produce.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next.load(Ordering::Relaxed))
    }

    /// Restarts the sequence at `first`.
    ///
    /// Only safe while no node built from the earlier sequence is still in use,
    /// otherwise ids will collide.
    pub fn reset(&self, first: u64) {
        self.next.store(first, Ordering::Relaxed);
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_COUNTER: Lazy<Arc<IdCounter>> = Lazy::new(|| Arc::new(IdCounter::new()));

/// Returns the process-wide counter used by graphs that are not given one explicitly.
pub fn global_counter() -> Arc<IdCounter> {
    Arc::clone(&GLOBAL_COUNTER)
}

/// Capability every differentiable value must provide to take part in backpropagation.
///
/// Implementors are expected to be cheap handles (clone = pointer copy or
/// index copy). The engine only ever calls these six methods; it never looks
/// at the numeric payload of a node.
pub trait Variable: Clone {
    /// The type of derivative flowing through the graph (a scalar, a tensor, ...).
    type Derivative;

    /// Identity of this node, stable for its whole lifetime.
    fn unique_id(&self) -> NodeId;

    /// `true` iff the node has no parent edges.
    fn is_leaf(&self) -> bool;

    /// `true` iff the node takes no part in differentiation.
    fn is_constant(&self) -> bool;

    /// Direct inputs of the operation that produced this node, in argument order.
    fn parents(&self) -> Vec<Self>;

    /// Vector-Jacobian product of this node's operation.
    ///
    /// Returns one `(parent, contribution)` entry per parent edge, in the same
    /// order as [`Variable::parents`]. A parent listed twice gets two entries.
    fn chain_rule(
        &self,
        d_output: &Self::Derivative,
    ) -> Result<Vec<(Self, Self::Derivative)>, AutogradError>;

    /// Adds `value` into the node's own gradient storage. Only called on leaves.
    fn accumulate_derivative(&self, value: Self::Derivative) -> Result<(), AutogradError>;
}

#[cfg(test)]
#[path = "variable_test.rs"]
mod tests;
