use super::*;

#[test]
fn test_save_for_backward_stores_values_in_order() {
    let mut ctx = Context::new(false);
    ctx.save_for_backward([1.0, 2.0, 3.0]);
    assert_eq!(ctx.saved_tensors(), &[1.0, 2.0, 3.0]);
    assert_eq!(ctx.saved_values(2).unwrap(), &[1.0, 2.0, 3.0]);
}

#[test]
fn test_no_grad_never_saves() {
    let mut ctx = Context::new(true);
    ctx.save_for_backward([1.0]);
    ctx.save_for_backward(vec![2.0, 3.0]);
    ctx.save_for_backward(std::iter::repeat(4.0).take(10));
    assert!(ctx.no_grad());
    assert!(ctx.saved_tensors().is_empty());
}

#[test]
fn test_second_save_overwrites() {
    let mut ctx = Context::new(false);
    ctx.save_for_backward([1.0, 2.0]);
    ctx.save_for_backward([5.0]);
    assert_eq!(ctx.saved_tensors(), &[5.0]);
}

#[test]
fn test_saved_values_reports_invalid_context() {
    let ctx: Context<f64> = Context::new(true);
    assert_eq!(
        ctx.saved_values(1),
        Err(AutogradError::InvalidContext {
            expected: 1,
            found: 0
        })
    );

    let mut ctx = Context::new(false);
    ctx.save_for_backward([1.0]);
    assert_eq!(
        ctx.saved_values(2),
        Err(AutogradError::InvalidContext {
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn test_default_context_records() {
    let mut ctx: Context<i32> = Context::default();
    assert!(!ctx.no_grad());
    assert!(ctx.saved_tensors().is_empty());
    ctx.save_for_backward([7]);
    assert_eq!(ctx.saved_tensors(), &[7]);
}
