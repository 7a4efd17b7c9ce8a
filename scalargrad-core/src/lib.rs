//! # scalargrad-core
//!
//! Reverse-mode automatic differentiation over a graph of scalar nodes.
//!
//! ```
//! use scalargrad_core::scalar::Graph;
//!
//! let graph = Graph::new();
//! let x = graph.variable(3.0);
//! let z = x.powi(2)?.add(&x.powi(3)?)?;
//! z.backward()?;
//! // dz/dx = 2x + 3x^2
//! assert!((x.derivative().unwrap() - 33.0).abs() < 1e-10);
//! # Ok::<(), scalargrad_core::AutogradError>(())
//! ```

pub mod autograd;
pub mod error;
pub mod operators;
pub mod scalar;
#[cfg(test)]
mod utils;

pub use autograd::{backpropagate, topological_sort, Context, NodeId, Variable};
pub use error::AutogradError;
pub use scalar::{Graph, Scalar};
// Re-export traits required by public functions
pub use num_traits;
