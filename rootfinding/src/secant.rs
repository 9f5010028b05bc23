use crate::{check_finite, closest, same_sign, to_f64, RootError};
use num_traits::Float;

// bracketed phase: at least every second step halves the bracket, so this
// is far above what a 64-bit float can need
const BRACKETED_MAX_ITER: usize = 4096;

/// Secant iteration started from the single point `x0`, safeguarded by
/// bisection as soon as two iterates bracket a sign change.
///
/// The second starting point is `x0` shifted by the cube root of the machine
/// epsilon, scaled with `|x0|`. Before a bracket is found at most `max_iter`
/// secant steps are taken; a flat function (zero secant slope) or a step to
/// a non-finite point stops the iteration with an error.
pub fn secant<T, F>(mut f: F, x0: T, xatol: T, max_iter: usize) -> Result<T, RootError>
where
    T: Float,
    F: FnMut(T) -> T,
{
    let mut x_prev = x0;
    let mut f_prev = check_finite(x_prev, f(x_prev))?;

    if f_prev.is_zero() {
        return Ok(x_prev);
    }

    let step = T::epsilon().cbrt() * x0.abs().max(T::one());

    let mut x = x0 + step;
    let mut fx = check_finite(x, f(x))?;

    for _ in 0..max_iter {
        if fx.is_zero() {
            return Ok(x);
        }

        if !same_sign(fx, f_prev) {
            return refine_bracket(&mut f, x_prev, f_prev, x, fx, xatol);
        }

        let denom = fx - f_prev;

        if denom.is_zero() {
            return Err(RootError::Stalled { x: to_f64(x) });
        }

        let x_next = x - fx * (x - x_prev) / denom;

        if !x_next.is_finite() {
            return Err(RootError::Diverged { x: to_f64(x) });
        }

        if (x_next - x).abs() <= xatol {
            return Ok(x_next);
        }

        x_prev = x;
        f_prev = fx;

        x = x_next;
        fx = check_finite(x, f(x))?;
    }

    Err(RootError::MaxIterations { iter: max_iter })
}

/// Secant iteration kept inside the bracket `[a, b]`, falling back to the
/// midpoint whenever a secant step leaves the bracket or fails to halve it.
///
/// `f(a)` and `f(b)` must have opposite signs.
pub fn bracketed_secant<T, F>(mut f: F, a: T, b: T, xatol: T) -> Result<T, RootError>
where
    T: Float,
    F: FnMut(T) -> T,
{
    let fa = check_finite(a, f(a))?;
    if fa.is_zero() {
        return Ok(a);
    }

    let fb = check_finite(b, f(b))?;
    if fb.is_zero() {
        return Ok(b);
    }

    if same_sign(fa, fb) {
        return Err(RootError::NotBracketed {
            a: to_f64(a),
            b: to_f64(b),
            fa: to_f64(fa),
            fb: to_f64(fb),
        });
    }

    refine_bracket(&mut f, a, fa, b, fb, xatol)
}

fn refine_bracket<T, F>(f: &mut F, a: T, fa: T, b: T, fb: T, xatol: T) -> Result<T, RootError>
where
    T: Float,
    F: FnMut(T) -> T,
{
    let (mut a, mut fa, mut b, mut fb) = (a, fa, b, fb);

    let two = T::one() + T::one();

    let mut last_width = (b - a).abs();
    let mut halved = false;

    for _ in 0..BRACKETED_MAX_ITER {
        let lo = a.min(b);
        let hi = a.max(b);
        let width = hi - lo;
        let mid = lo + width / two;

        if width <= xatol || mid <= lo || mid >= hi {
            return Ok(closest(a, fa, b, fb));
        }

        let s = b - fb * (b - a) / (fb - fa);

        // fall back to the midpoint when the secant point leaves the bracket
        // or the previous secant step failed to halve it
        let x = if s > lo && s < hi && (halved || width <= last_width / two) {
            s
        } else {
            mid
        };

        halved = x == mid;
        last_width = width;

        let fx = check_finite(x, f(x))?;

        if fx.is_zero() {
            return Ok(x);
        }

        if same_sign(fx, fa) {
            a = x;
            fa = fx;
        } else {
            b = x;
            fb = fx;
        }
    }

    Err(RootError::MaxIterations {
        iter: BRACKETED_MAX_ITER,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_secant_converges_on_smooth_function() {
        let root = secant(|x: f64| x.cos() - x, 0.5, f64::EPSILON, 100).unwrap();

        assert_relative_eq!(root, 0.7390851332151607, epsilon = 1.0e-14);
    }

    #[test]
    fn test_secant_switches_to_bracket_on_sign_change() {
        // steep step-like function: plain secant overshoots badly here
        let f = |x: f64| (50.0 * (x - 1.3)).tanh();

        let root = secant(f, 1.25, f64::EPSILON, 100).unwrap();

        assert_relative_eq!(root, 1.3, epsilon = 1.0e-14);
    }

    #[test]
    fn test_secant_reports_flat_function() {
        let err = secant(|_x: f64| 1.0, 0.0, f64::EPSILON, 100).unwrap_err();

        assert!(matches!(err, RootError::Stalled { .. }));
    }

    #[test]
    fn test_bracketed_secant_finds_root_of_steep_function() {
        let f = |x: f64| (50.0 * (x - 1.3)).tanh();

        let root = bracketed_secant(f, 0.0, 2.0, f64::EPSILON).unwrap();

        assert_relative_eq!(root, 1.3, epsilon = 1.0e-14);
    }

    #[test]
    fn test_bracketed_secant_rejects_same_sign_ends() {
        let err = bracketed_secant(|x: f64| x * x + 1.0, -1.0, 1.0, f64::EPSILON).unwrap_err();

        assert!(matches!(err, RootError::NotBracketed { .. }));
    }

    #[test]
    fn test_bracketed_secant_stops_at_a_jump() {
        let f = |x: f64| if x < 0.25 { -1.0 } else { 1.0 };

        let root = bracketed_secant(f, -1.0, 1.0, f64::EPSILON).unwrap();

        assert!((root - 0.25).abs() < 1.0e-15);
    }

    #[test]
    fn test_secant_returns_exact_root_at_start() {
        let root = secant(|x: f64| x - 2.0, 2.0, f64::EPSILON, 10).unwrap();

        assert_eq!(root, 2.0);
    }
}
