use crate::autograd::Context;
use crate::error::AutogradError;
use crate::operators;
use std::fmt::Debug;

/// A differentiable scalar operation.
///
/// `forward` computes the output value and may stash what `backward` needs in the
/// [`Context`]. `backward` maps the derivative of the output to one local
/// contribution per input, in input order.
pub trait ScalarFunction: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of inputs `forward` expects.
    fn arity(&self) -> usize;

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError>;

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl ScalarFunction for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, _ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        Ok(operators::add(inputs[0], inputs[1]))
    }

    fn backward(&self, _ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        Ok(vec![d_output, d_output])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mul;

impl ScalarFunction for Mul {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        ctx.save_for_backward([inputs[0], inputs[1]]);
        Ok(operators::mul(inputs[0], inputs[1]))
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let saved = ctx.saved_values(2)?;
        let (a, b) = (saved[0], saved[1]);
        Ok(vec![d_output * b, d_output * a])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Neg;

impl ScalarFunction for Neg {
    fn name(&self) -> &'static str {
        "neg"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, _ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        Ok(operators::neg(inputs[0]))
    }

    fn backward(&self, _ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        Ok(vec![operators::neg(d_output)])
    }
}

/// `1 / a`. Fails on zero input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inv;

impl ScalarFunction for Inv {
    fn name(&self) -> &'static str {
        "inv"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        let out = operators::checked_inv(inputs[0])?;
        ctx.save_for_backward([inputs[0]]);
        Ok(out)
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let a = ctx.saved_values(1)?[0];
        Ok(vec![operators::inv_back(a, d_output)])
    }
}

/// Natural logarithm. Fails on non-positive input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

impl ScalarFunction for Log {
    fn name(&self) -> &'static str {
        "log"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        let out = operators::checked_log(inputs[0])?;
        ctx.save_for_backward([inputs[0]]);
        Ok(out)
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let a = ctx.saved_values(1)?[0];
        Ok(vec![operators::log_back(a, d_output)])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Exp;

impl ScalarFunction for Exp {
    fn name(&self) -> &'static str {
        "exp"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        let out = operators::exp(inputs[0]);
        // d/da exp(a) = exp(a): keep the output rather than the input.
        ctx.save_for_backward([out]);
        Ok(out)
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let out = ctx.saved_values(1)?[0];
        Ok(vec![d_output * out])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl ScalarFunction for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        let out = operators::sigmoid(inputs[0]);
        ctx.save_for_backward([out]);
        Ok(out)
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let out = ctx.saved_values(1)?[0];
        Ok(vec![d_output * out * (1.0 - out)])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

impl ScalarFunction for Relu {
    fn name(&self) -> &'static str {
        "relu"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        ctx.save_for_backward([inputs[0]]);
        Ok(operators::relu(inputs[0]))
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let a = ctx.saved_values(1)?[0];
        Ok(vec![operators::relu_back(a, d_output)])
    }
}

/// `a^exponent` for an integer exponent.
#[derive(Debug, Clone, Copy)]
pub struct PowI {
    pub exponent: i32,
}

impl ScalarFunction for PowI {
    fn name(&self) -> &'static str {
        "powi"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&self, ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        let a = inputs[0];
        if self.exponent < 0 && a == 0.0 {
            return Err(AutogradError::ArithmeticDomain {
                operation: "powi",
                value: a,
            });
        }
        ctx.save_for_backward([a]);
        Ok(a.powi(self.exponent))
    }

    fn backward(&self, ctx: &Context<f64>, d_output: f64) -> Result<Vec<f64>, AutogradError> {
        let a = ctx.saved_values(1)?[0];
        if self.exponent == 0 {
            return Ok(vec![0.0]);
        }
        let local = f64::from(self.exponent) * a.powi(self.exponent - 1);
        Ok(vec![d_output * local])
    }
}

/// `1.0` if `a < b`, else `0.0`. Piecewise constant, so both derivatives are zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lt;

impl ScalarFunction for Lt {
    fn name(&self) -> &'static str {
        "lt"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, _ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        Ok(operators::lt(inputs[0], inputs[1]))
    }

    fn backward(&self, _ctx: &Context<f64>, _d_output: f64) -> Result<Vec<f64>, AutogradError> {
        Ok(vec![0.0, 0.0])
    }
}

/// `1.0` if `a == b`, else `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eq;

impl ScalarFunction for Eq {
    fn name(&self) -> &'static str {
        "eq"
    }

    fn arity(&self) -> usize {
        2
    }

    fn forward(&self, _ctx: &mut Context<f64>, inputs: &[f64]) -> Result<f64, AutogradError> {
        Ok(operators::eq(inputs[0], inputs[1]))
    }

    fn backward(&self, _ctx: &Context<f64>, _d_output: f64) -> Result<Vec<f64>, AutogradError> {
        Ok(vec![0.0, 0.0])
    }
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
