use crate::Smearing;
use dwconsts::*;

/// Methfessel-Paxton smearing of arbitrary order.
///
/// `f(x) = erfc(x)/2 + sum_{n=1..N} A_n H_{2n-1}(x) exp(-x^2)` with
/// `A_n = (-1)^n / (n! 4^n sqrt(pi))` and `H` the physicists' Hermite
/// polynomials. The correction terms make the curve overshoot one below the
/// Fermi level and undershoot zero above it.
pub struct SmearingMP {
    order: usize,
}

impl SmearingMP {
    pub fn new(order: usize) -> SmearingMP {
        SmearingMP { order }
    }

    pub fn get_order(&self) -> usize {
        self.order
    }
}

impl Smearing for SmearingMP {
    fn occupation(&self, x: f64) -> f64 {
        let mut occ = 0.5 * libm::erfc(x);

        let gauss = (-x * x).exp();

        if gauss == 0.0 {
            return occ;
        }

        let mut a = INV_SQRT_PI;

        // h_prev = H_{k-1}, h = H_k
        let mut h_prev = 1.0;
        let mut h = 2.0 * x;
        let mut k = 1.0;

        for n in 1..=self.order {
            a *= -1.0 / (4.0 * n as f64);

            occ += a * h * gauss;

            for _ in 0..2 {
                let h_next = 2.0 * x * h - 2.0 * k * h_prev;
                h_prev = h;
                h = h_next;
                k += 1.0;
            }
        }

        occ
    }

    fn is_monotonic(&self) -> bool {
        false
    }

    fn get_name(&self) -> String {
        format!("mp{}", self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mp1_closed_form(x: f64) -> f64 {
        0.5 * (1.0 - libm::erf(x) - 1.0 / PI.sqrt() * x * (-x * x).exp())
    }

    fn mp2_closed_form(x: f64) -> f64 {
        0.5 * (1.0
            - libm::erf(x)
            - 1.0 / PI.sqrt() * x * (7.0 / 4.0 - 0.5 * x * x) * (-x * x).exp())
    }

    #[test]
    fn test_mp_recursion_matches_closed_forms() {
        let mp1 = SmearingMP::new(1);
        let mp2 = SmearingMP::new(2);

        for i in -40..=40 {
            let x = i as f64 * 0.1;
            assert_relative_eq!(mp1.occupation(x), mp1_closed_form(x), epsilon = 1.0e-14);
            assert_relative_eq!(mp2.occupation(x), mp2_closed_form(x), epsilon = 1.0e-14);
        }
    }

    #[test]
    fn test_mp_overshoots_below_fermi_level() {
        let mp1 = SmearingMP::new(1);

        assert!(mp1.occupation(-1.0) > 1.0);
        assert!(mp1.occupation(1.0) < 0.0);
        assert_relative_eq!(mp1.occupation(0.0), 0.5);
    }
}
