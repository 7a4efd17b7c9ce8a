use crate::autograd::{IdCounter, NodeId, Variable};
use crate::error::AutogradError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Hand-wired graph node for exercising the engine without an operator layer.
///
/// Each parent edge carries a fixed local partial derivative; `chain_rule`
/// multiplies it by the upstream derivative. The node records every call the
/// engine makes so tests can assert on them.
#[derive(Clone)]
pub(crate) struct MockNode(Rc<MockInner>);

pub(crate) struct MockInner {
    id: NodeId,
    constant: bool,
    /// When set, `chain_rule` returns nothing, breaking the parents contract.
    silent: bool,
    parents: RefCell<Vec<(MockNode, f64)>>,
    accumulated: RefCell<Vec<f64>>,
    chain_rule_calls: Cell<usize>,
}

impl MockNode {
    fn build(ids: &IdCounter, constant: bool, silent: bool, parents: &[(&MockNode, f64)]) -> Self {
        MockNode(Rc::new(MockInner {
            id: ids.next_id(),
            constant,
            silent,
            parents: RefCell::new(parents.iter().map(|(p, d)| ((*p).clone(), *d)).collect()),
            accumulated: RefCell::new(Vec::new()),
            chain_rule_calls: Cell::new(0),
        }))
    }

    pub(crate) fn leaf(ids: &IdCounter) -> Self {
        Self::build(ids, false, false, &[])
    }

    pub(crate) fn constant(ids: &IdCounter) -> Self {
        Self::build(ids, true, false, &[])
    }

    /// Non-leaf node with `(parent, local partial)` edges.
    pub(crate) fn op(ids: &IdCounter, parents: &[(&MockNode, f64)]) -> Self {
        Self::build(ids, false, false, parents)
    }

    /// Non-leaf node whose `chain_rule` omits every parent.
    pub(crate) fn silent(ids: &IdCounter, parents: &[(&MockNode, f64)]) -> Self {
        Self::build(ids, false, true, parents)
    }

    /// Adds an edge after construction, which is the only way to build a cycle.
    pub(crate) fn link(&self, parent: &MockNode, local: f64) {
        self.0.parents.borrow_mut().push((parent.clone(), local));
    }

    /// Drops all parent edges so reference cycles built by `link` are freed.
    pub(crate) fn unlink(&self) {
        self.0.parents.borrow_mut().clear();
    }

    pub(crate) fn id(&self) -> NodeId {
        self.0.id
    }

    pub(crate) fn accumulated(&self) -> Vec<f64> {
        self.0.accumulated.borrow().clone()
    }

    pub(crate) fn chain_rule_calls(&self) -> usize {
        self.0.chain_rule_calls.get()
    }
}

impl Variable for MockNode {
    type Derivative = f64;

    fn unique_id(&self) -> NodeId {
        self.0.id
    }

    fn is_leaf(&self) -> bool {
        self.0.parents.borrow().is_empty()
    }

    fn is_constant(&self) -> bool {
        self.0.constant
    }

    fn parents(&self) -> Vec<Self> {
        self.0.parents.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    fn chain_rule(&self, d_output: &f64) -> Result<Vec<(Self, f64)>, AutogradError> {
        self.0.chain_rule_calls.set(self.0.chain_rule_calls.get() + 1);
        if self.0.silent {
            return Ok(Vec::new());
        }
        Ok(self
            .0
            .parents
            .borrow()
            .iter()
            .map(|(p, local)| (p.clone(), d_output * local))
            .collect())
    }

    fn accumulate_derivative(&self, value: f64) -> Result<(), AutogradError> {
        self.0.accumulated.borrow_mut().push(value);
        Ok(())
    }
}

/// Ids of `nodes`, in order.
pub(crate) fn ids_of(nodes: &[MockNode]) -> Vec<NodeId> {
    nodes.iter().map(MockNode::id).collect()
}
