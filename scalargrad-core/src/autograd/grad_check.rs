use crate::error::AutogradError;
use crate::scalar::{Graph, Scalar};
use approx::relative_eq;
use log::debug;
use num_traits::Float;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for argument {arg}: analytical grad {analytical:?} != numerical grad {numerical:?}. Difference: {difference:?}")]
    GradientMismatch {
        arg: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Gradient for argument {arg} is NaN or infinite: analytical {analytical:?}, numerical {numerical:?}")]
    NonFinite {
        arg: usize,
        analytical: f64,
        numerical: f64,
    },

    #[error("Graph error during gradient check: {0}")]
    Autograd(#[from] AutogradError),
}

/// Step size and tolerance used by [`check_gradients`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Perturbation added to one argument for the finite difference.
    pub epsilon: f64,
    /// Accepted absolute or relative gap between analytical and numerical values.
    pub tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            epsilon: 1e-6,
            tolerance: 1e-2,
        }
    }
}

/// Approximates the partial derivative of `f` with respect to `values[arg]`.
///
/// Computes the forward difference `(f(.., x_arg + epsilon, ..) - f(..)) / epsilon`.
/// Pure: `f` is only ever called on plain values.
///
/// # Errors
/// Returns [`AutogradError::ArgumentOutOfRange`] if `arg >= values.len()`.
pub fn central_difference<T, F>(
    f: F,
    values: &[T],
    arg: usize,
    epsilon: T,
) -> Result<T, AutogradError>
where
    T: Float,
    F: Fn(&[T]) -> T,
{
    try_central_difference(|vals| Ok::<T, AutogradError>(f(vals)), values, arg, epsilon)
}

/// Same as [`central_difference`] for a function whose evaluation can fail.
pub fn try_central_difference<T, E, F>(
    f: F,
    values: &[T],
    arg: usize,
    epsilon: T,
) -> Result<T, E>
where
    T: Float,
    E: From<AutogradError>,
    F: Fn(&[T]) -> Result<T, E>,
{
    if arg >= values.len() {
        return Err(AutogradError::ArgumentOutOfRange {
            arg,
            len: values.len(),
        }
        .into());
    }
    let mut moved = values.to_vec();
    moved[arg] = moved[arg] + epsilon;
    Ok((f(&moved)? - f(values)?) / epsilon)
}

/// Checks the derivatives produced by backpropagation through `f` against
/// finite differences.
///
/// `f` is evaluated once on fresh variables holding `values`, differentiated with
/// a seed of `1.0`, and then re-evaluated on perturbed values for each argument.
/// A variable that the output does not depend on is expected to have a numerical
/// derivative of zero.
///
/// # Errors
/// * [`GradCheckError::GradientMismatch`] for the first argument outside tolerance.
/// * [`GradCheckError::NonFinite`] if either derivative is NaN or infinite.
/// * [`GradCheckError::Autograd`] if building or differentiating the graph fails.
pub fn check_gradients<F>(
    f: F,
    values: &[f64],
    config: &GradCheckConfig,
) -> Result<(), GradCheckError>
where
    F: for<'g> Fn(&[Scalar<'g>]) -> Result<Scalar<'g>, AutogradError>,
{
    let graph = Graph::new();
    let inputs: Vec<Scalar<'_>> = values.iter().map(|&v| graph.variable(v)).collect();
    let output = f(inputs.as_slice())?;
    output.backward()?;

    let evaluate = |vals: &[f64]| -> Result<f64, AutogradError> {
        let scratch = Graph::new();
        let scratch_inputs: Vec<Scalar<'_>> =
            vals.iter().map(|&v| scratch.variable(v)).collect();
        let output = f(scratch_inputs.as_slice())?;
        Ok(output.value())
    };

    for (arg, input) in inputs.iter().enumerate() {
        // No path from the output means the true derivative is zero.
        let analytical = input.derivative().unwrap_or(0.0);
        let numerical = try_central_difference(&evaluate, values, arg, config.epsilon)?;
        debug!(
            "check_gradients: arg {}: analytical {}, numerical {}",
            arg, analytical, numerical
        );

        if !analytical.is_finite() || !numerical.is_finite() {
            return Err(GradCheckError::NonFinite {
                arg,
                analytical,
                numerical,
            });
        }
        if !relative_eq!(
            analytical,
            numerical,
            epsilon = config.tolerance,
            max_relative = config.tolerance
        ) {
            return Err(GradCheckError::GradientMismatch {
                arg,
                analytical,
                numerical,
                difference: (analytical - numerical).abs(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
