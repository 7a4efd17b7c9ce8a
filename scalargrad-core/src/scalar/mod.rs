//! Arena-backed scalar operator layer built on top of the autograd engine.

pub mod functions;
pub mod graph;

pub use functions::ScalarFunction;
pub use graph::{Graph, Scalar};
