use crate::autograd::graph::topological_sort;
use crate::autograd::variable::{NodeId, Variable};
use crate::error::AutogradError;
use log::{debug, error, trace};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::AddAssign;

/// Runs backpropagation from `variable`, seeding it with `deriv`.
///
/// Every leaf reachable from `variable` through non-constant nodes receives exactly
/// one [`Variable::accumulate_derivative`] call carrying the sum of the contributions
/// along all paths from the root. Nothing else is mutated; the per-node derivative
/// map lives only for the duration of the call.
///
/// # Errors
/// * [`AutogradError::ConstantRoot`] if `variable` is a constant.
/// * [`AutogradError::CycleDetected`] if the graph is not acyclic.
/// * [`AutogradError::MissingDerivative`] if a node is reached with no accumulated
///   derivative, i.e. some `chain_rule` did not cover all of its parents.
/// * Any error raised by `chain_rule` or `accumulate_derivative`.
///
/// On error the leaves may already hold part of the result; callers should discard it.
pub fn backpropagate<V>(variable: &V, deriv: V::Derivative) -> Result<(), AutogradError>
where
    V: Variable,
    V::Derivative: AddAssign,
{
    let root_id = variable.unique_id();
    if variable.is_constant() {
        return Err(AutogradError::ConstantRoot { node: root_id });
    }

    let sorted_nodes = topological_sort(variable)?;
    debug!(
        "backpropagate: {} node(s) reachable from root {}",
        sorted_nodes.len(),
        root_id
    );

    let mut derivatives: HashMap<NodeId, V::Derivative> = HashMap::new();
    derivatives.insert(root_id, deriv);

    for node in sorted_nodes {
        let node_id = node.unique_id();
        // Every consumer precedes this node, so the entry is final once we get here.
        let accumulated = match derivatives.remove(&node_id) {
            Some(d) => d,
            None => {
                error!(
                    "backpropagate: node {} has no accumulated derivative",
                    node_id
                );
                return Err(AutogradError::MissingDerivative { node: node_id });
            }
        };

        if node.is_leaf() {
            trace!("backpropagate: accumulating into leaf {}", node_id);
            node.accumulate_derivative(accumulated)?;
            continue;
        }

        for (parent, contribution) in node.chain_rule(&accumulated)? {
            match derivatives.entry(parent.unique_id()) {
                Entry::Occupied(mut entry) => *entry.get_mut() += contribution,
                Entry::Vacant(entry) => {
                    entry.insert(contribution);
                }
            }
        }
    }

    debug!("backpropagate: finished from root {}", root_id);
    Ok(())
}

#[cfg(test)]
#[path = "backward_test.rs"]
mod tests;
