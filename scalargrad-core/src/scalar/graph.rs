use crate::autograd::{backpropagate, global_counter, Context, IdCounter, NodeId, Variable};
use crate::error::AutogradError;
use crate::scalar::functions::{
    Add, Eq, Exp, Inv, Log, Lt, Mul, Neg, PowI, Relu, ScalarFunction, Sigmoid,
};
use log::warn;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
enum NodeKind {
    /// Excluded from differentiation.
    Constant,
    /// Differentiable leaf (parameter or input).
    Variable,
    /// Output of a function applied to at least one non-constant input.
    Operation(Arc<dyn ScalarFunction>),
}

/// One slot of the arena.
#[derive(Debug)]
struct ScalarNode {
    id: NodeId,
    value: f64,
    kind: NodeKind,
    /// Arena slots of the inputs, in argument order.
    parents: Vec<usize>,
    /// Accumulated derivative, only ever set on `Variable` nodes.
    derivative: Option<f64>,
}

/// Arena holding a scalar computation graph.
///
/// Nodes live in a `Vec` and refer to their inputs by slot, so the graph never
/// forms reference cycles and is torn down in one drop. Forward contexts are
/// kept in a side table keyed by [`NodeId`]. Both tables sit behind `RwLock`s;
/// concurrent backward passes over the same graph are serialized on the write
/// lock when leaves accumulate.
#[derive(Debug)]
pub struct Graph {
    ids: Arc<IdCounter>,
    nodes: RwLock<Vec<ScalarNode>>,
    contexts: RwLock<HashMap<NodeId, Context<f64>>>,
}

impl Graph {
    /// Creates an empty graph drawing ids from the process-wide counter.
    pub fn new() -> Self {
        Self::with_counter(global_counter())
    }

    /// Creates an empty graph drawing ids from `ids`.
    pub fn with_counter(ids: Arc<IdCounter>) -> Self {
        Graph {
            ids,
            nodes: RwLock::new(Vec::new()),
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a differentiable leaf.
    pub fn variable(&self, value: f64) -> Scalar<'_> {
        self.push(value, NodeKind::Variable, Vec::new())
    }

    /// Adds a constant. Constants never receive derivatives.
    pub fn constant(&self, value: f64) -> Scalar<'_> {
        self.push(value, NodeKind::Constant, Vec::new())
    }

    /// Runs `function` forward on `inputs` and records the result.
    ///
    /// If every input is constant the forward runs under `no_grad` and the result
    /// is itself a constant with no parents. Otherwise the result keeps `inputs`
    /// as its parents and its context is stored for the backward pass.
    ///
    /// # Errors
    /// * [`AutogradError::UnknownNode`] if an input belongs to another graph.
    /// * [`AutogradError::ArityMismatch`] if `inputs.len()` differs from `function.arity()`.
    /// * Any error from `function.forward`, e.g. [`AutogradError::ArithmeticDomain`].
    pub fn apply(
        &self,
        function: Arc<dyn ScalarFunction>,
        inputs: &[Scalar<'_>],
    ) -> Result<Scalar<'_>, AutogradError> {
        if function.arity() != inputs.len() {
            return Err(AutogradError::ArityMismatch {
                operation: function.name(),
                expected: function.arity(),
                actual: inputs.len(),
            });
        }
        if let Some(foreign) = inputs.iter().find(|s| !std::ptr::eq(s.graph, self)) {
            return Err(AutogradError::UnknownNode { node: foreign.id });
        }

        let (values, need_grad) = {
            let nodes = self.read_nodes();
            let values: Vec<f64> = inputs.iter().map(|s| nodes[s.slot].value).collect();
            let need_grad = inputs
                .iter()
                .any(|s| !matches!(nodes[s.slot].kind, NodeKind::Constant));
            (values, need_grad)
        };

        let mut ctx = Context::new(!need_grad);
        let value = function.forward(&mut ctx, &values)?;

        if !need_grad {
            return Ok(self.push(value, NodeKind::Constant, Vec::new()));
        }
        let parents = inputs.iter().map(|s| s.slot).collect();
        let out = self.push(value, NodeKind::Operation(function), parents);
        self.write_contexts().insert(out.id, ctx);
        Ok(out)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.read_nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears every accumulated leaf derivative.
    pub fn zero_grad(&self) {
        for node in self.write_nodes().iter_mut() {
            node.derivative = None;
        }
    }

    fn push(&self, value: f64, kind: NodeKind, parents: Vec<usize>) -> Scalar<'_> {
        let id = self.ids.next_id();
        let mut nodes = self.write_nodes();
        let slot = nodes.len();
        nodes.push(ScalarNode {
            id,
            value,
            kind,
            parents,
            derivative: None,
        });
        Scalar {
            graph: self,
            id,
            slot,
        }
    }

    fn read_nodes(&self) -> RwLockReadGuard<'_, Vec<ScalarNode>> {
        self.nodes.read().unwrap_or_else(|poisoned| {
            warn!("Graph: node table lock was poisoned. Recovering read guard.");
            poisoned.into_inner()
        })
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, Vec<ScalarNode>> {
        self.nodes.write().unwrap_or_else(|poisoned| {
            warn!("Graph: node table lock was poisoned. Recovering write guard.");
            poisoned.into_inner()
        })
    }

    fn read_contexts(&self) -> RwLockReadGuard<'_, HashMap<NodeId, Context<f64>>> {
        self.contexts.read().unwrap_or_else(|poisoned| {
            warn!("Graph: context table lock was poisoned. Recovering read guard.");
            poisoned.into_inner()
        })
    }

    fn write_contexts(&self) -> RwLockWriteGuard<'_, HashMap<NodeId, Context<f64>>> {
        self.contexts.write().unwrap_or_else(|poisoned| {
            warn!("Graph: context table lock was poisoned. Recovering write guard.");
            poisoned.into_inner()
        })
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a node of a [`Graph`].
///
/// Copying a `Scalar` copies the handle, not the node. Operations return
/// `Result` because forward passes can fail (e.g. `log` of a negative value).
#[derive(Clone, Copy)]
pub struct Scalar<'g> {
    graph: &'g Graph,
    id: NodeId,
    slot: usize,
}

impl<'g> Scalar<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph this node lives in.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Forward value of this node.
    pub fn value(&self) -> f64 {
        self.graph.read_nodes()[self.slot].value
    }

    /// Accumulated derivative, `None` until a backward pass reaches this leaf.
    pub fn derivative(&self) -> Option<f64> {
        self.graph.read_nodes()[self.slot].derivative
    }

    /// Backpropagates from this node with a seed of `1.0`.
    pub fn backward(&self) -> Result<(), AutogradError> {
        self.backward_with(1.0)
    }

    /// Backpropagates from this node with the given seed derivative.
    pub fn backward_with(&self, seed: f64) -> Result<(), AutogradError> {
        backpropagate(self, seed)
    }

    pub fn add(&self, other: &Scalar<'g>) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Add), &[*self, *other])
    }

    pub fn sub(&self, other: &Scalar<'g>) -> Result<Scalar<'g>, AutogradError> {
        self.add(&other.neg()?)
    }

    pub fn mul(&self, other: &Scalar<'g>) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Mul), &[*self, *other])
    }

    pub fn div(&self, other: &Scalar<'g>) -> Result<Scalar<'g>, AutogradError> {
        self.mul(&other.inv()?)
    }

    pub fn neg(&self) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Neg), &[*self])
    }

    pub fn inv(&self) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Inv), &[*self])
    }

    pub fn log(&self) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Log), &[*self])
    }

    pub fn exp(&self) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Exp), &[*self])
    }

    pub fn sigmoid(&self) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Sigmoid), &[*self])
    }

    pub fn relu(&self) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Relu), &[*self])
    }

    pub fn powi(&self, exponent: i32) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(PowI { exponent }), &[*self])
    }

    pub fn lt(&self, other: &Scalar<'g>) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Lt), &[*self, *other])
    }

    /// `1.0` if both values are equal, else `0.0`.
    pub fn equals(&self, other: &Scalar<'g>) -> Result<Scalar<'g>, AutogradError> {
        self.graph.apply(Arc::new(Eq), &[*self, *other])
    }
}

impl fmt::Debug for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar")
            .field("id", &self.id)
            .field("value", &self.value())
            .finish()
    }
}

impl PartialEq for Scalar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<'g> Variable for Scalar<'g> {
    type Derivative = f64;

    fn unique_id(&self) -> NodeId {
        self.id
    }

    fn is_leaf(&self) -> bool {
        self.graph.read_nodes()[self.slot].parents.is_empty()
    }

    fn is_constant(&self) -> bool {
        matches!(self.graph.read_nodes()[self.slot].kind, NodeKind::Constant)
    }

    fn parents(&self) -> Vec<Self> {
        let nodes = self.graph.read_nodes();
        nodes[self.slot]
            .parents
            .iter()
            .map(|&slot| Scalar {
                graph: self.graph,
                id: nodes[slot].id,
                slot,
            })
            .collect()
    }

    fn chain_rule(&self, d_output: &f64) -> Result<Vec<(Self, f64)>, AutogradError> {
        let function = match &self.graph.read_nodes()[self.slot].kind {
            NodeKind::Operation(function) => Arc::clone(function),
            _ => return Ok(Vec::new()),
        };
        let parents = self.parents();

        let local_grads = {
            let contexts = self.graph.read_contexts();
            let ctx = contexts
                .get(&self.id)
                .ok_or(AutogradError::MissingContext { node: self.id })?;
            function.backward(ctx, *d_output)?
        };
        if local_grads.len() != parents.len() {
            return Err(AutogradError::ArityMismatch {
                operation: function.name(),
                expected: parents.len(),
                actual: local_grads.len(),
            });
        }
        Ok(parents.into_iter().zip(local_grads).collect())
    }

    fn accumulate_derivative(&self, value: f64) -> Result<(), AutogradError> {
        let mut nodes = self.graph.write_nodes();
        let node = &mut nodes[self.slot];
        if !matches!(node.kind, NodeKind::Variable) {
            return Err(AutogradError::NotLeaf { node: self.id });
        }
        node.derivative = Some(node.derivative.unwrap_or(0.0) + value);
        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
