use crate::{check_finite, to_f64, RootError};
use num_traits::Float;

/// Walks outward from `x0` on both sides, doubling the distance every round,
/// until `f` changes sign between two consecutive points on one side.
///
/// Returns the bracketing pair with the point nearer to `x0` first. In each
/// round the lower side is evaluated before the upper one. A zero of `f` hit
/// on the way is returned as a degenerate pair.
pub fn expand_bracket<T, F>(mut f: F, x0: T, step: T, max_iter: usize) -> Result<(T, T), RootError>
where
    T: Float,
    F: FnMut(T) -> T,
{
    if !(step > T::zero() && step.is_finite()) {
        return Err(RootError::InvalidStep { step: to_f64(step) });
    }

    let f0 = check_finite(x0, f(x0))?;

    if f0.is_zero() {
        return Ok((x0, x0));
    }

    let positive = f0 > T::zero();

    let mut lower = x0;
    let mut upper = x0;
    let mut width = step;

    for _ in 0..max_iter {
        let x = x0 - width;
        let fx = check_finite(x, f(x))?;

        if fx.is_zero() {
            return Ok((x, x));
        }

        if (fx > T::zero()) != positive {
            return Ok((lower, x));
        }

        lower = x;

        let x = x0 + width;
        let fx = check_finite(x, f(x))?;

        if fx.is_zero() {
            return Ok((x, x));
        }

        if (fx > T::zero()) != positive {
            return Ok((upper, x));
        }

        upper = x;

        width = width + width;

        if !width.is_finite() {
            break;
        }
    }

    Err(RootError::MaxIterations { iter: max_iter })
}
