use crate::Smearing;
use dwconsts::*;

/// Marzari-Vanderbilt cold smearing.
pub struct SmearingMV {}

impl Smearing for SmearingMV {
    fn occupation(&self, x: f64) -> f64 {
        let u = x + INV_SQRT_2;

        0.5 * libm::erfc(u) + INV_SQRT_PI * INV_SQRT_2 * (-u * u).exp()
    }

    fn is_monotonic(&self) -> bool {
        false
    }

    fn get_name(&self) -> String {
        "mv".to_string()
    }
}
