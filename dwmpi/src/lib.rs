//! Collective reductions over the workers that share a k-point set.
//!
//! Every solver in the workspace talks to the other workers only through the
//! [`Reducer`] trait, so a single process, a group of in-process threads and
//! an MPI job all run the same solver code.

mod serial;
pub use serial::*;

mod thread;
pub use thread::*;

#[cfg(feature = "mpi")]
mod mpi;
#[cfg(feature = "mpi")]
pub use mpi::*;

/// Blocking collective reductions.
///
/// Each call is collective: all workers of the group must issue the same
/// sequence of calls, otherwise the group deadlocks. The returned value is
/// identical on every worker.
pub trait Reducer {
    fn sum(&self, local: f64) -> f64;

    fn min(&self, local: f64) -> f64;

    fn max(&self, local: f64) -> f64;

    fn get_rank(&self) -> usize;

    fn get_size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.get_rank() == 0
    }
}

impl<R: Reducer + ?Sized> Reducer for &R {
    fn sum(&self, local: f64) -> f64 {
        (**self).sum(local)
    }

    fn min(&self, local: f64) -> f64 {
        (**self).min(local)
    }

    fn max(&self, local: f64) -> f64 {
        (**self).max(local)
    }

    fn get_rank(&self) -> usize {
        (**self).get_rank()
    }

    fn get_size(&self) -> usize {
        (**self).get_size()
    }
}

/// Reduction operators shared by the reducer implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Min,
    Max,
}

impl ReduceOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ReduceOp::Sum => a + b,
            ReduceOp::Min => a.min(b),
            ReduceOp::Max => a.max(b),
        }
    }

    pub fn identity(self) -> f64 {
        match self {
            ReduceOp::Sum => 0.0,
            ReduceOp::Min => f64::INFINITY,
            ReduceOp::Max => f64::NEG_INFINITY,
        }
    }
}
