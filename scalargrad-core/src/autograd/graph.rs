use crate::autograd::variable::{NodeId, Variable};
use crate::error::AutogradError;
use log::trace;
use std::collections::HashSet;

/// A pending step of the depth-first traversal.
enum Frame<V> {
    /// First visit: expand the node's parents.
    Enter(V),
    /// All parents resolved: finalize the node.
    Exit(V),
}

/// Computes the topological order of the computation graph rooted at `variable`.
///
/// Returns the non-constant nodes reachable from `variable` with the root first
/// and every node placed after all of its consumers. Constant nodes are skipped
/// entirely: they are never visited and never hold back the node that lists them
/// as a parent. A constant root yields an empty order.
///
/// The traversal uses an explicit stack, so graph depth is bounded by heap memory
/// rather than the call stack. Siblings appear in the order given by
/// [`Variable::parents`].
///
/// # Errors
/// Returns [`AutogradError::CycleDetected`] if a node is reached again while it
/// is still being expanded.
pub fn topological_sort<V: Variable>(variable: &V) -> Result<Vec<V>, AutogradError> {
    let mut finished: HashSet<NodeId> = HashSet::new();
    let mut in_progress: HashSet<NodeId> = HashSet::new();
    let mut post_order: Vec<V> = Vec::new();
    let mut stack: Vec<Frame<V>> = vec![Frame::Enter(variable.clone())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                let node_id = node.unique_id();
                if node.is_constant() || finished.contains(&node_id) {
                    continue;
                }
                if !in_progress.insert(node_id) {
                    return Err(AutogradError::CycleDetected { node: node_id });
                }

                let parents = node.parents();
                stack.push(Frame::Exit(node));
                // The last parent is popped first, so after the final reversal
                // siblings appear in `parents` order.
                for parent in parents {
                    if !parent.is_constant() && !finished.contains(&parent.unique_id()) {
                        stack.push(Frame::Enter(parent));
                    }
                }
            }
            Frame::Exit(node) => {
                let node_id = node.unique_id();
                in_progress.remove(&node_id);
                finished.insert(node_id);
                trace!("[topological_sort] finalized node {}", node_id);
                post_order.push(node);
            }
        }
    }

    post_order.reverse();
    Ok(post_order)
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
