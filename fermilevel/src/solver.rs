use crate::*;
use dfttypes::{VKEigenValue, VKOccupation};
use dwconsts::*;
use dwmpi::Reducer;
use smearing::Smearing;
use std::time::Instant;

static NOOP_OBSERVER: NoopObserver = NoopObserver;

/// Physical parameters of one occupation solve.
pub struct FermiModel<'a> {
    pub n_electrons: f64,
    pub temperature: f64,
    pub smearing: &'a dyn Smearing,
    pub fermi_level: Option<f64>,
}

impl<'a> FermiModel<'a> {
    pub fn new(n_electrons: f64, temperature: f64, smearing: &'a dyn Smearing) -> FermiModel<'a> {
        FermiModel {
            n_electrons,
            temperature,
            smearing,
            fermi_level: None,
        }
    }

    /// Skip the solve and occupy the states at `fermi_level`.
    pub fn with_fixed_fermi_level(mut self, fermi_level: f64) -> FermiModel<'a> {
        self.fermi_level = Some(fermi_level);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupationResult {
    occupation: VKOccupation,
    fermi_level: f64,
    algorithm: Option<FermiLevelAlgorithm>,
    warnings: Vec<FermiWarning>,
}

impl OccupationResult {
    pub fn get_occupation(&self) -> &VKOccupation {
        &self.occupation
    }

    pub fn get_fermi_level(&self) -> f64 {
        self.fermi_level
    }

    /// `None` when the Fermi level was fixed by the caller.
    pub fn get_algorithm(&self) -> Option<FermiLevelAlgorithm> {
        self.algorithm
    }

    pub fn get_warnings(&self) -> &[FermiWarning] {
        &self.warnings
    }
}

/// Entry point of the occupation solve.
///
/// The reducer decides whether this is a single-process or a distributed
/// solve; every worker of a group has to call [`FermiSolver::solve`] with
/// its own k-points and identical parameters.
pub struct FermiSolver<'a> {
    reducer: &'a dyn Reducer,
    observer: &'a dyn FermiObserver,
    differentiator: Box<dyn Differentiator + 'a>,
    cheap_exit: f64,
}

impl<'a> FermiSolver<'a> {
    pub fn new(reducer: &'a dyn Reducer) -> FermiSolver<'a> {
        FermiSolver {
            reducer,
            observer: &NOOP_OBSERVER,
            differentiator: Box::new(CentralDifference),
            cheap_exit: DEFAULT_FERMI_CHEAP_EXIT,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn FermiObserver) -> FermiSolver<'a> {
        self.observer = observer;
        self
    }

    pub fn with_differentiator<D: Differentiator + 'a>(mut self, differentiator: D) -> FermiSolver<'a> {
        self.differentiator = Box::new(differentiator);
        self
    }

    /// Fraction of `tol_nelec` below which the integer-filling guess is
    /// accepted by the bisection without iterating.
    pub fn with_cheap_exit(mut self, cheap_exit: f64) -> FermiSolver<'a> {
        self.cheap_exit = cheap_exit;
        self
    }

    pub fn solve(
        &self,
        vkevals: &VKEigenValue,
        model: &FermiModel,
        tol_nelec: f64,
        algorithm: Option<FermiLevelAlgorithm>,
    ) -> Result<OccupationResult, FermiLevelError> {
        check_input(model, tol_nelec, self.cheap_exit)?;

        if let Some(fermi_level) = model.fermi_level {
            return Ok(OccupationResult {
                occupation: compute_occupation(
                    vkevals,
                    fermi_level,
                    model.temperature,
                    model.smearing,
                ),
                fermi_level,
                algorithm: None,
                warnings: Vec::new(),
            });
        }

        let max_electrons = get_max_electrons(vkevals, self.reducer);

        if max_electrons < model.n_electrons - tol_nelec {
            return Err(FermiLevelError::InsufficientBands {
                n_electrons: model.n_electrons,
                max_electrons,
            });
        }

        let algorithm =
            algorithm.unwrap_or_else(|| FermiLevelAlgorithm::default_for(model.smearing));

        let ctx = SolveContext {
            vkevals,
            n_electrons: model.n_electrons,
            temperature: model.temperature,
            smearing: model.smearing,
            tol_nelec,
            cheap_exit: self.cheap_exit,
            reducer: self.reducer,
            observer: self.observer,
        };

        if self.reducer.is_root() {
            log::info!(
                "fermi level: {} with {} smearing, T = {:.6E} Ha, nelec = {}",
                algorithm,
                model.smearing.get_name(),
                model.temperature,
                model.n_electrons
            );
        }

        let start = Instant::now();

        let fermi_level = new(algorithm).get_fermi_level(&ctx)?;

        self.observer.on_solved(algorithm, fermi_level, start.elapsed());

        let mut warnings = Vec::new();

        let residual = ctx.excess(fermi_level);

        if residual.abs() > tol_nelec {
            warnings.push(FermiWarning::LargeResidual {
                residual,
                tol_nelec,
            });
        }

        let dos = self
            .differentiator
            .derivative(&|ef| ctx.excess(ef), fermi_level);

        if dos < -f64::EPSILON.sqrt() {
            warnings.push(FermiWarning::NegativeDensityOfStates { dos });
        }

        if self.reducer.is_root() {
            for w in warnings.iter() {
                log::warn!("{}", w);
            }
        }

        Ok(OccupationResult {
            occupation: compute_occupation(vkevals, fermi_level, model.temperature, model.smearing),
            fermi_level,
            algorithm: Some(algorithm),
            warnings,
        })
    }
}

fn check_input(model: &FermiModel, tol_nelec: f64, cheap_exit: f64) -> Result<(), FermiLevelError> {
    if !(tol_nelec > 0.0 && tol_nelec.is_finite()) {
        return Err(FermiLevelError::InvalidInput(format!(
            "tol_nelec must be positive, got {}",
            tol_nelec
        )));
    }

    if !(model.temperature >= 0.0 && model.temperature.is_finite()) {
        return Err(FermiLevelError::InvalidInput(format!(
            "temperature must be non-negative, got {}",
            model.temperature
        )));
    }

    if !(model.n_electrons >= 0.0 && model.n_electrons.is_finite()) {
        return Err(FermiLevelError::InvalidInput(format!(
            "number of electrons must be non-negative, got {}",
            model.n_electrons
        )));
    }

    if !(cheap_exit >= 0.0 && cheap_exit.is_finite()) {
        return Err(FermiLevelError::InvalidInput(format!(
            "cheap exit fraction must be non-negative, got {}",
            cheap_exit
        )));
    }

    if let Some(ef) = model.fermi_level {
        if !ef.is_finite() {
            return Err(FermiLevelError::InvalidInput(format!(
                "fixed Fermi level must be finite, got {}",
                ef
            )));
        }
    }

    Ok(())
}
