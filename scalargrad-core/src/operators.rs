//! Elementary scalar functions and small list combinators.
//!
//! These are the numeric building blocks the scalar operator layer uses in its
//! forward and backward passes. They are generic over [`num_traits::Float`] so
//! they work for both `f32` and `f64`.

use crate::error::AutogradError;
use num_traits::Float;

pub fn mul<T: Float>(a: T, b: T) -> T {
    a * b
}

pub fn id<T: Float>(a: T) -> T {
    a
}

pub fn add<T: Float>(a: T, b: T) -> T {
    a + b
}

pub fn neg<T: Float>(a: T) -> T {
    -a
}

/// `1.0` if `a < b`, else `0.0`.
pub fn lt<T: Float>(a: T, b: T) -> T {
    if a < b {
        T::one()
    } else {
        T::zero()
    }
}

/// `1.0` if `a == b`, else `0.0`.
pub fn eq<T: Float>(a: T, b: T) -> T {
    if a == b {
        T::one()
    } else {
        T::zero()
    }
}

pub fn max<T: Float>(a: T, b: T) -> T {
    if a > b {
        a
    } else {
        b
    }
}

/// `|a - b| < 1e-2`.
pub fn is_close<T: Float>(a: T, b: T) -> bool {
    let tolerance = T::from(1e-2).unwrap_or_else(T::epsilon);
    (a - b).abs() < tolerance
}

/// Logistic sigmoid, evaluated on the branch that cannot overflow `exp`.
pub fn sigmoid<T: Float>(a: T) -> T {
    if a >= T::zero() {
        T::one() / (T::one() + (-a).exp())
    } else {
        a.exp() / (T::one() + a.exp())
    }
}

pub fn relu<T: Float>(a: T) -> T {
    max(T::zero(), a)
}

/// Natural logarithm. Non-positive input gives `NaN`/`-inf`; see [`checked_log`].
pub fn log<T: Float>(a: T) -> T {
    a.ln()
}

pub fn exp<T: Float>(a: T) -> T {
    a.exp()
}

/// `1 / a`. Zero input gives an infinity; see [`checked_inv`].
pub fn inv<T: Float>(a: T) -> T {
    T::one() / a
}

/// Derivative of `log` at `a`, times `d`.
pub fn log_back<T: Float>(a: T, d: T) -> T {
    d / a
}

/// Derivative of `inv` at `a`, times `d`.
pub fn inv_back<T: Float>(a: T, d: T) -> T {
    -d / (a * a)
}

/// Derivative of `relu` at `a`, times `d`.
pub fn relu_back<T: Float>(a: T, d: T) -> T {
    if a > T::zero() {
        d
    } else {
        T::zero()
    }
}

/// Logarithm that rejects non-positive input.
pub fn checked_log<T: Float>(a: T) -> Result<T, AutogradError> {
    if a <= T::zero() || a.is_nan() {
        return Err(domain_error("log", a));
    }
    Ok(log(a))
}

/// Reciprocal that rejects zero.
pub fn checked_inv<T: Float>(a: T) -> Result<T, AutogradError> {
    if a == T::zero() || a.is_nan() {
        return Err(domain_error("inv", a));
    }
    Ok(inv(a))
}

fn domain_error<T: Float>(operation: &'static str, value: T) -> AutogradError {
    AutogradError::ArithmeticDomain {
        operation,
        value: value.to_f64().unwrap_or(f64::NAN),
    }
}

// --- Higher-order helpers ---

pub fn map<T, F>(f: F, items: &[T]) -> Vec<T>
where
    T: Copy,
    F: Fn(T) -> T,
{
    items.iter().map(|&x| f(x)).collect()
}

/// Combines two slices element-wise. Stops at the shorter one.
pub fn zip_with<T, F>(f: F, left: &[T], right: &[T]) -> Vec<T>
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    left.iter().zip(right).map(|(&a, &b)| f(a, b)).collect()
}

/// Left fold seeded with the first element.
///
/// # Errors
/// Returns [`AutogradError::EmptyReduction`] on an empty slice, since there is
/// no value to start from.
pub fn reduce<T, F>(f: F, items: &[T]) -> Result<T, AutogradError>
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    let (first, rest) = items
        .split_first()
        .ok_or(AutogradError::EmptyReduction { operation: "reduce" })?;
    Ok(rest.iter().fold(*first, |acc, &x| f(acc, x)))
}

pub fn neg_list<T: Float>(items: &[T]) -> Vec<T> {
    map(neg, items)
}

pub fn add_lists<T: Float>(left: &[T], right: &[T]) -> Vec<T> {
    zip_with(add, left, right)
}

/// Sum of `items`; `0` for an empty slice.
pub fn sum<T: Float>(items: &[T]) -> T {
    items.iter().fold(T::zero(), |acc, &x| add(acc, x))
}

/// Product of `items`; `1` for an empty slice.
pub fn prod<T: Float>(items: &[T]) -> T {
    items.iter().fold(T::one(), |acc, &x| mul(acc, x))
}

#[cfg(test)]
#[path = "operators_test.rs"]
mod tests;
