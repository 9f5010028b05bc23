use crate::Smearing;

/// Gaussian smearing: the occupation is a complementary error function.
pub struct SmearingGS {}

impl Smearing for SmearingGS {
    fn occupation(&self, x: f64) -> f64 {
        0.5 * libm::erfc(x)
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn get_name(&self) -> String {
        "gs".to_string()
    }
}
