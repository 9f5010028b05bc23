use rootfinding::RootError;
use std::fmt;
use thiserror::Error;

/// Fatal failures of an occupation solve.
///
/// Every condition is decided on globally reduced quantities, so all workers
/// of a group fail with the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FermiLevelError {
    #[error(
        "could not obtain {n_electrons} electrons by filling every state \
         (at most {max_electrons}); increase the number of bands"
    )]
    InsufficientBands { n_electrons: f64, max_electrons: f64 },

    #[error(
        "excess electrons do not change sign on [{min}, {max}] \
         (excess {excess_min} and {excess_max}); the smearing function is not monotonic"
    )]
    BracketingContractViolation {
        min: f64,
        max: f64,
        excess_min: f64,
        excess_max: f64,
    },

    #[error(
        "bisection stopped at Fermi level {fermi_level} with residual {residual} \
         above the tolerance {tol_nelec}"
    )]
    ResidualContractViolation {
        fermi_level: f64,
        residual: f64,
        tol_nelec: f64,
    },

    #[error(
        "{n_electrons} electrons cannot be attained by filling states with occupation {unit}; \
         add a temperature or switch to a spin-polarised calculation"
    )]
    FractionalOccupation { n_electrons: f64, unit: f64 },

    #[error(
        "unable to find non-fractional occupations with the correct number of electrons \
         (excess {excess} at Fermi level {fermi_level}); add a temperature"
    )]
    UnattainableOccupation { fermi_level: f64, excess: f64 },

    #[error(
        "only full occupation is supported, but k-point {ik} of spin channel {ispin} \
         has occupations {occupation:?}"
    )]
    PartialOccupation {
        ispin: usize,
        ik: usize,
        occupation: Vec<f64>,
    },

    #[error("unsupported fermi_scheme '{0}'. Supported: bisection, twostage, zerotemp")]
    UnknownScheme(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    RootFinding(#[from] RootError),
}

/// Non-fatal findings of a solve. The result is still returned but may be
/// unphysical.
#[derive(Debug, Clone, PartialEq)]
pub enum FermiWarning {
    LargeResidual { residual: f64, tol_nelec: f64 },
    NegativeDensityOfStates { dos: f64 },
}

impl fmt::Display for FermiWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FermiWarning::LargeResidual {
                residual,
                tol_nelec,
            } => write!(
                f,
                "large deviation of electron count ({} > {}); the Fermi level may be unphysical",
                residual.abs(),
                tol_nelec
            ),
            FermiWarning::NegativeDensityOfStates { dos } => write!(
                f,
                "negative density of states ({}) at the Fermi level; the solution is probably unphysical",
                dos
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FermiLevelError::FractionalOccupation {
            n_electrons: 3.0,
            unit: 2.0,
        };
        assert_eq!(
            err.to_string(),
            "3 electrons cannot be attained by filling states with occupation 2; \
             add a temperature or switch to a spin-polarised calculation"
        );

        let err: FermiLevelError = RootError::Stalled { x: 0.5 }.into();
        assert_eq!(
            err.to_string(),
            "secant step stalled at x = 0.5: function is locally flat"
        );
    }

    #[test]
    fn test_warning_messages() {
        let w = FermiWarning::NegativeDensityOfStates { dos: -0.5 };
        assert!(w.to_string().starts_with("negative density of states (-0.5)"));
    }
}
