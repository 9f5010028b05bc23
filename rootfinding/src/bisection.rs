use crate::{check_finite, closest, same_sign, to_f64, RootError};
use num_traits::Float;

/// Bisection on `[a, b]` until the bracket is narrower than `xatol` or no
/// float lies strictly between its ends.
///
/// `f(a)` and `f(b)` must have opposite signs. Returns the bracket end whose
/// function value is closest to zero.
pub fn bisection<T, F>(mut f: F, a: T, b: T, xatol: T) -> Result<T, RootError>
where
    T: Float,
    F: FnMut(T) -> T,
{
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };

    let mut fa = check_finite(a, f(a))?;
    if fa.is_zero() {
        return Ok(a);
    }

    let mut fb = check_finite(b, f(b))?;
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

    let two = T::one() + T::one();

    loop {
        let mid = a + (b - a) / two;

        if b - a <= xatol || mid <= a || mid >= b {
            return Ok(closest(a, fa, b, fb));
        }

        let fm = check_finite(mid, f(mid))?;

        if fm.is_zero() {
            return Ok(mid);
        }

        if same_sign(fm, fa) {
            a = mid;
            fa = fm;
        } else {
            b = mid;
            fb = fm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bisection_converges_to_machine_precision() {
        let root = bisection(|x: f64| x * x * x - 2.0, 0.0, 3.0, f64::EPSILON).unwrap();

        assert_relative_eq!(root, 2f64.cbrt(), epsilon = 4.0 * f64::EPSILON);
    }

    #[test]
    fn test_bisection_accepts_reversed_bracket() {
        let root = bisection(|x: f64| x - 0.25, 1.0, -1.0, f64::EPSILON).unwrap();

        assert_eq!(root, 0.25);
    }

    #[test]
    fn test_bisection_works_in_single_precision() {
        let root = bisection(|x: f32| x * x - 2.0, 0.0, 2.0, f32::EPSILON).unwrap();

        assert!((root - 2f32.sqrt()).abs() <= 2.0 * f32::EPSILON);
    }

    #[test]
    fn test_bisection_rejects_missing_sign_change() {
        let err = bisection(|x: f64| x * x + 1.0, -1.0, 1.0, f64::EPSILON).unwrap_err();

        assert_eq!(
            err,
            RootError::NotBracketed {
                a: -1.0,
                b: 1.0,
                fa: 2.0,
                fb: 2.0
            }
        );
    }

    #[test]
    fn test_bisection_reports_nan() {
        let err = bisection(|x: f64| if x > 0.5 { f64::NAN } else { x - 0.7 }, 0.0, 1.0, 1e-12)
            .unwrap_err();

        assert!(matches!(err, RootError::NonFinite { .. }));
    }
}
