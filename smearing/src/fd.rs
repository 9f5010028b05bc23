use crate::Smearing;

/// Fermi-Dirac distribution.
pub struct SmearingFD {}

impl Smearing for SmearingFD {
    fn occupation(&self, x: f64) -> f64 {
        // exp overflows to +inf for large x, which correctly gives zero
        1.0 / (x.exp() + 1.0)
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn get_name(&self) -> String {
        "fd".to_string()
    }
}
