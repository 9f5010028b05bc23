//! Occupation curves used to smear the Fermi surface.
//!
//! Every curve is a function of the normalised energy `x = (e - ef) / T` and
//! goes from one at `x = -inf` to zero at `x = +inf`. The spin factor is
//! applied by the caller.

mod fd;
pub use fd::*;
mod gs;
pub use gs::*;
mod mp;
pub use mp::*;
mod mv;
pub use mv::*;
mod none;
pub use none::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmearingError {
    #[error("unsupported smearing_scheme '{0}'. Supported: fd, gs, mp1, mp2, mpN, mv, none")]
    UnknownScheme(String),

    #[error("Methfessel-Paxton order must be at least 1, got '{0}'")]
    InvalidOrder(String),
}

pub trait Smearing {
    /// Occupation at a finite normalised energy.
    fn occupation(&self, x: f64) -> f64;

    /// Whether the occupation is non-increasing in `x` everywhere. Only then
    /// is the electron count a monotonic function of the Fermi level.
    fn is_monotonic(&self) -> bool;

    fn get_name(&self) -> String;

    /// Occupation including the limits `x = -inf -> 1` and `x = +inf -> 0`,
    /// which are returned exactly.
    fn get_occupation_number(&self, x: f64) -> f64 {
        if x == f64::INFINITY {
            0.0
        } else if x == f64::NEG_INFINITY {
            1.0
        } else {
            self.occupation(x)
        }
    }
}

pub fn new(smearing_scheme: &str) -> Result<Box<dyn Smearing + Send + Sync>, SmearingError> {
    let scheme = smearing_scheme.trim().to_lowercase();

    let smearing: Box<dyn Smearing + Send + Sync> = match scheme.as_str() {
        "fd" => Box::new(SmearingFD {}),
        "gs" => Box::new(SmearingGS {}),
        "mv" => Box::new(SmearingMV {}),
        "none" => Box::new(SmearingNone {}),
        other => match other.strip_prefix("mp") {
            Some(order) => {
                let order: usize = order
                    .parse()
                    .map_err(|_| SmearingError::UnknownScheme(smearing_scheme.to_string()))?;

                if order == 0 {
                    return Err(SmearingError::InvalidOrder(smearing_scheme.to_string()));
                }

                Box::new(SmearingMP::new(order))
            }
            None => return Err(SmearingError::UnknownScheme(smearing_scheme.to_string())),
        },
    };

    Ok(smearing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const ALL_SCHEMES: [&str; 7] = ["fd", "gs", "mp1", "mp2", "mp5", "mv", "none"];

    #[test]
    fn test_new_known_schemes() {
        for scheme in ALL_SCHEMES.iter() {
            let s = new(scheme).unwrap();
            assert_eq!(s.get_name(), *scheme);
        }

        assert!(new("FD").is_ok());
    }

    #[test]
    fn test_new_rejects_unknown_schemes() {
        assert_eq!(
            new("lorentz").err(),
            Some(SmearingError::UnknownScheme("lorentz".to_string()))
        );
        assert_eq!(
            new("mpx").err(),
            Some(SmearingError::UnknownScheme("mpx".to_string()))
        );
        assert_eq!(
            new("mp0").err(),
            Some(SmearingError::InvalidOrder("mp0".to_string()))
        );
    }

    #[test]
    fn test_infinite_limits_are_exact() {
        for scheme in ALL_SCHEMES.iter() {
            let s = new(scheme).unwrap();
            assert_eq!(s.get_occupation_number(f64::NEG_INFINITY), 1.0, "{}", scheme);
            assert_eq!(s.get_occupation_number(f64::INFINITY), 0.0, "{}", scheme);
        }
    }

    #[test]
    fn test_large_finite_arguments_are_finite() {
        for scheme in ALL_SCHEMES.iter() {
            let s = new(scheme).unwrap();
            for &x in [-1.0e200, -1.0e5, -40.0, 40.0, 1.0e5, 1.0e200].iter() {
                let occ = s.get_occupation_number(x);
                assert!(occ.is_finite(), "{} at {} gave {}", scheme, x, occ);
            }
            assert!((s.get_occupation_number(-1.0e5) - 1.0).abs() < 1.0e-12);
            assert!(s.get_occupation_number(1.0e5).abs() < 1.0e-12);
        }
    }

    #[test]
    fn test_monotonic_tags_match_sampled_curves() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut xs: Vec<f64> = (0..2000).map(|_| rng.gen_range(-8.0, 8.0)).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());

        for scheme in ALL_SCHEMES.iter() {
            let s = new(scheme).unwrap();

            let occ: Vec<f64> = xs.iter().map(|&x| s.get_occupation_number(x)).collect();
            let non_increasing = occ.windows(2).all(|w| w[1] <= w[0] + 1.0e-15);

            assert_eq!(non_increasing, s.is_monotonic(), "{}", scheme);
        }
    }
}
