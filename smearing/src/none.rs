use crate::Smearing;

/// Sharp step, half occupation exactly at the Fermi level.
pub struct SmearingNone {}

impl Smearing for SmearingNone {
    fn occupation(&self, x: f64) -> f64 {
        if x < 0.0 {
            1.0
        } else if x > 0.0 {
            0.0
        } else {
            0.5
        }
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn get_name(&self) -> String {
        "none".to_string()
    }
}
