//! The differentiation engine: node capability, forward contexts, graph ordering,
//! backpropagation and numerical gradient checking.

pub mod backward;
pub mod context;
pub mod grad_check;
pub mod graph;
pub mod variable;

pub use backward::backpropagate;
pub use context::Context;
pub use grad_check::{central_difference, check_gradients, GradCheckConfig, GradCheckError};
pub use graph::topological_sort;
pub use variable::{global_counter, IdCounter, NodeId, Variable};
