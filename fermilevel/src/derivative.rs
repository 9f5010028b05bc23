use finitediff::FiniteDiff;

/// Derivative of a scalar function of the Fermi level.
pub trait Differentiator {
    fn derivative(&self, f: &dyn Fn(f64) -> f64, x: f64) -> f64;
}

/// Central finite difference of `finitediff` over the single coordinate.
#[derive(Debug, Default, Clone, Copy)]
pub struct CentralDifference;

impl Differentiator for CentralDifference {
    fn derivative(&self, f: &dyn Fn(f64) -> f64, x: f64) -> f64 {
        let point = vec![x];

        let grad = point.central_diff(&|p: &Vec<f64>| f(p[0]));

        grad[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_central_difference() {
        let d = CentralDifference;

        assert_relative_eq!(d.derivative(&|x| x.sin(), 0.3), 0.3f64.cos(), epsilon = 1.0e-6);
        assert_relative_eq!(d.derivative(&|x| x * x * x, 10.0), 300.0, max_relative = 1.0e-6);
    }

    #[test]
    fn test_central_difference_of_a_flat_function_is_zero() {
        assert_eq!(CentralDifference.derivative(&|_x| 2.0, -0.25), 0.0);
    }
}
