//! Scalar root finders converging to the precision of the working float type.

mod bisection;
pub use bisection::*;

mod bracket;
pub use bracket::*;

mod secant;
pub use secant::*;

use num_traits::Float;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RootError {
    #[error("root is not bracketed: f({a}) = {fa}, f({b}) = {fb}")]
    NotBracketed { a: f64, b: f64, fa: f64, fb: f64 },

    #[error("function value is not finite at x = {x}")]
    NonFinite { x: f64 },

    #[error("secant step stalled at x = {x}: function is locally flat")]
    Stalled { x: f64 },

    #[error("secant iteration diverged from x = {x}")]
    Diverged { x: f64 },

    #[error("bracket step must be positive and finite, got {step}")]
    InvalidStep { step: f64 },

    #[error("no convergence after {iter} iterations")]
    MaxIterations { iter: usize },
}

pub(crate) fn to_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

pub(crate) fn check_finite<T: Float>(x: T, fx: T) -> Result<T, RootError> {
    if fx.is_finite() {
        Ok(fx)
    } else {
        Err(RootError::NonFinite { x: to_f64(x) })
    }
}

pub(crate) fn same_sign<T: Float>(a: T, b: T) -> bool {
    a.is_sign_negative() == b.is_sign_negative()
}

/// Of two points, the one whose function value is closer to zero.
pub(crate) fn closest<T: Float>(a: T, fa: T, b: T, fb: T) -> T {
    if fa.abs() <= fb.abs() {
        a
    } else {
        b
    }
}
