use crate::FermiLevelAlgorithm;
use std::time::Duration;

/// Instrumentation hooks of a solve. All methods default to doing nothing.
pub trait FermiObserver {
    /// Called after every evaluation of the excess electron count.
    fn on_excess(&self, _fermi_level: f64, _excess: f64) {}

    /// Called once the strategy has returned a Fermi level.
    fn on_solved(&self, _algorithm: FermiLevelAlgorithm, _fermi_level: f64, _elapsed: Duration) {}
}

pub struct NoopObserver;

impl FermiObserver for NoopObserver {}

/// Traces every excess evaluation at debug level and the solve time at info
/// level.
pub struct LogObserver;

impl FermiObserver for LogObserver {
    fn on_excess(&self, fermi_level: f64, excess: f64) {
        log::debug!("Ef = {:.16E} Ha, excess electrons = {:+.6E}", fermi_level, excess);
    }

    fn on_solved(&self, algorithm: FermiLevelAlgorithm, fermi_level: f64, elapsed: Duration) {
        log::info!(
            "{} Fermi level {:.10} Ha found in {:.3} ms",
            algorithm,
            fermi_level,
            elapsed.as_secs_f64() * 1.0E3
        );
    }
}
