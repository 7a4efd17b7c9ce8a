use crate::autograd::NodeId;
use thiserror::Error;

/// Error type for graph construction, traversal and backpropagation.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum AutogradError {
    /// A cycle among non-constant nodes was found while ordering the graph.
    #[error("Cycle detected in the computation graph at node {node}.")]
    CycleDetected { node: NodeId },

    /// A node was reached during backpropagation with no accumulated derivative.
    /// Means the ordering or a `chain_rule` implementation is inconsistent with `parents`.
    #[error("Internal error: node {node} was reached during backpropagation without an accumulated derivative")]
    MissingDerivative { node: NodeId },

    #[error("Invalid context: backward needs {expected} saved value(s), found {found}")]
    InvalidContext { expected: usize, found: usize },

    #[error("Domain error in '{operation}': got {value}")]
    ArithmeticDomain {
        operation: &'static str,
        value: f64,
    },

    #[error("Cannot backpropagate from constant node {node}")]
    ConstantRoot { node: NodeId },

    #[error("Derivatives can only be accumulated on leaf nodes, node {node} is not a leaf")]
    NotLeaf { node: NodeId },

    #[error("Node {node} does not belong to this graph")]
    UnknownNode { node: NodeId },

    #[error("No forward context recorded for operation node {node}")]
    MissingContext { node: NodeId },

    #[error("Arity mismatch for operation '{operation}': expected {expected}, got {actual}")]
    ArityMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot reduce an empty sequence with '{operation}'")]
    EmptyReduction { operation: &'static str },

    #[error("Argument index {arg} is out of range for {len} value(s)")]
    ArgumentOutOfRange { arg: usize, len: usize },
}
