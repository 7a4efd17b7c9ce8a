use super::*;
use approx::assert_relative_eq;

fn run(function: &dyn ScalarFunction, inputs: &[f64], d_output: f64) -> (f64, Vec<f64>) {
    let mut ctx = Context::new(false);
    let out = function.forward(&mut ctx, inputs).unwrap();
    let grads = function.backward(&ctx, d_output).unwrap();
    assert_eq!(grads.len(), function.arity(), "{} gradient count", function.name());
    (out, grads)
}

#[test]
fn test_add_and_mul() {
    let (out, grads) = run(&Add, &[2.0, 3.0], 2.0);
    assert_eq!(out, 5.0);
    assert_eq!(grads, vec![2.0, 2.0]);

    let (out, grads) = run(&Mul, &[2.0, 3.0], 2.0);
    assert_eq!(out, 6.0);
    assert_eq!(grads, vec![6.0, 4.0]);
}

#[test]
fn test_neg_and_inv() {
    let (out, grads) = run(&Neg, &[2.0], 1.5);
    assert_eq!(out, -2.0);
    assert_eq!(grads, vec![-1.5]);

    let (out, grads) = run(&Inv, &[2.0], 1.0);
    assert_relative_eq!(out, 0.5);
    assert_relative_eq!(grads[0], -0.25);
}

#[test]
fn test_log_exp_sigmoid() {
    let (out, grads) = run(&Log, &[2.0], 1.0);
    assert_relative_eq!(out, 2.0f64.ln());
    assert_relative_eq!(grads[0], 0.5);

    let (out, grads) = run(&Exp, &[1.0], 2.0);
    assert_relative_eq!(out, 1.0f64.exp());
    assert_relative_eq!(grads[0], 2.0 * 1.0f64.exp());

    let (out, grads) = run(&Sigmoid, &[0.0], 1.0);
    assert_relative_eq!(out, 0.5);
    assert_relative_eq!(grads[0], 0.25);
}

#[test]
fn test_relu() {
    assert_eq!(run(&Relu, &[-1.0], 3.0), (0.0, vec![0.0]));
    assert_eq!(run(&Relu, &[2.0], 3.0), (2.0, vec![3.0]));
}

#[test]
fn test_powi() {
    let (out, grads) = run(&PowI { exponent: 3 }, &[2.0], 1.0);
    assert_relative_eq!(out, 8.0);
    assert_relative_eq!(grads[0], 12.0);

    let (out, grads) = run(&PowI { exponent: 0 }, &[2.0], 1.0);
    assert_relative_eq!(out, 1.0);
    assert_eq!(grads, vec![0.0]);

    let (out, grads) = run(&PowI { exponent: -1 }, &[2.0], 1.0);
    assert_relative_eq!(out, 0.5);
    assert_relative_eq!(grads[0], -0.25);
}

#[test]
fn test_comparisons_have_zero_derivative() {
    assert_eq!(run(&Lt, &[1.0, 2.0], 5.0), (1.0, vec![0.0, 0.0]));
    assert_eq!(run(&Eq, &[1.0, 2.0], 5.0), (0.0, vec![0.0, 0.0]));
}

#[test]
fn test_domain_errors_in_forward() {
    let mut ctx = Context::new(false);
    assert!(matches!(
        Log.forward(&mut ctx, &[0.0]),
        Err(AutogradError::ArithmeticDomain { operation: "log", .. })
    ));
    assert!(matches!(
        Inv.forward(&mut ctx, &[0.0]),
        Err(AutogradError::ArithmeticDomain { operation: "inv", .. })
    ));
    assert!(matches!(
        PowI { exponent: -2 }.forward(&mut ctx, &[0.0]),
        Err(AutogradError::ArithmeticDomain { operation: "powi", .. })
    ));
}

#[test]
fn test_backward_without_saved_values_is_invalid_context() {
    let mut ctx = Context::new(true);
    let out = Mul.forward(&mut ctx, &[2.0, 3.0]).unwrap();
    assert_eq!(out, 6.0);
    assert_eq!(
        Mul.backward(&ctx, 1.0),
        Err(AutogradError::InvalidContext {
            expected: 2,
            found: 0
        })
    );
}
