//! Occupation numbers and Fermi level of a set of Kohn-Sham eigenvalues.
//!
//! The k-points may be distributed over several workers; every global
//! quantity goes through the [`dwmpi::Reducer`] held by the [`SolveContext`],
//! and all decisions are taken on reduced values so that the workers stay in
//! lock-step.

mod error;
pub use error::*;

mod occupation;
pub use occupation::*;

mod guess;
pub use guess::*;

mod bisection;
pub use bisection::*;

mod twostage;
pub use twostage::*;

mod zerotemp;
pub use zerotemp::*;

mod derivative;
pub use derivative::*;

mod observer;
pub use observer::*;

mod solver;
pub use solver::*;

mod validate;
pub use validate::*;

use dfttypes::VKEigenValue;
use dwmpi::Reducer;
use smearing::Smearing;
use std::fmt;
use std::str::FromStr;

/// Everything a strategy needs to evaluate the excess electron count.
pub struct SolveContext<'a> {
    pub vkevals: &'a VKEigenValue,
    pub n_electrons: f64,
    pub temperature: f64,
    pub smearing: &'a dyn Smearing,
    pub tol_nelec: f64,
    pub cheap_exit: f64,
    pub reducer: &'a dyn Reducer,
    pub observer: &'a dyn FermiObserver,
}

impl<'a> SolveContext<'a> {
    /// Excess electron count at `fermi_level`. Collective.
    pub fn excess(&self, fermi_level: f64) -> f64 {
        let excess = get_excess_electrons(
            self.vkevals,
            fermi_level,
            self.temperature,
            self.smearing,
            self.n_electrons,
            self.reducer,
        );

        self.observer.on_excess(fermi_level, excess);

        excess
    }

    /// Same context with another occupation curve.
    pub fn with_smearing<'b>(&'b self, smearing: &'b dyn Smearing) -> SolveContext<'b> {
        SolveContext {
            vkevals: self.vkevals,
            n_electrons: self.n_electrons,
            temperature: self.temperature,
            smearing,
            tol_nelec: self.tol_nelec,
            cheap_exit: self.cheap_exit,
            reducer: self.reducer,
            observer: self.observer,
        }
    }
}

pub trait FermiLevel {
    fn get_fermi_level(&self, ctx: &SolveContext) -> Result<f64, FermiLevelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FermiLevelAlgorithm {
    Bisection,
    TwoStage,
    ZeroTemperature,
}

impl FermiLevelAlgorithm {
    /// Bisection is only safe when the electron count is monotonic in the
    /// Fermi level, which holds for monotonic occupation curves.
    pub fn default_for(smearing: &dyn Smearing) -> FermiLevelAlgorithm {
        if smearing.is_monotonic() {
            FermiLevelAlgorithm::Bisection
        } else {
            FermiLevelAlgorithm::TwoStage
        }
    }
}

impl fmt::Display for FermiLevelAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FermiLevelAlgorithm::Bisection => "bisection",
            FermiLevelAlgorithm::TwoStage => "twostage",
            FermiLevelAlgorithm::ZeroTemperature => "zerotemp",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for FermiLevelAlgorithm {
    type Err = FermiLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bisection" => Ok(FermiLevelAlgorithm::Bisection),
            "twostage" => Ok(FermiLevelAlgorithm::TwoStage),
            "zerotemp" => Ok(FermiLevelAlgorithm::ZeroTemperature),
            other => Err(FermiLevelError::UnknownScheme(other.to_string())),
        }
    }
}

pub fn new(algorithm: FermiLevelAlgorithm) -> Box<dyn FermiLevel> {
    match algorithm {
        FermiLevelAlgorithm::Bisection => Box::new(FermiLevelBisection {}),
        FermiLevelAlgorithm::TwoStage => Box::new(FermiLevelTwoStage {}),
        FermiLevelAlgorithm::ZeroTemperature => Box::new(FermiLevelZeroTemperature {}),
    }
}
