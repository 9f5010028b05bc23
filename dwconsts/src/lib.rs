use std::f64;

// units : energy

pub const RY_TO_EV: f64 = 13.605698066;
pub const HA_TO_EV: f64 = 2.0 * RY_TO_EV;
pub const EV_TO_HA: f64 = 1.0 / HA_TO_EV;

// Boltzmann constant

pub const BOLTZMANN_CONSTANT: f64 = 8.617333262145E-5 * EV_TO_HA; // Hartree K^-1

// pi

pub const PI: f64 = f64::consts::PI;
pub const SQRT_PI: f64 = 1.772453850905516;
pub const INV_SQRT_PI: f64 = 1.0 / SQRT_PI;
pub const INV_SQRT_2: f64 = f64::consts::FRAC_1_SQRT_2;

// numerical convergence

pub const EPS10: f64 = 1E-10;

// occupation and Fermi level defaults

pub const DEFAULT_TOL_NELEC: f64 = EPS10;

// the integer-filling guess is accepted without iterating when its residual
// is below this fraction of the electron-count tolerance

pub const DEFAULT_FERMI_CHEAP_EXIT: f64 = 0.1;

// distance (Hartree) the bisection bracket is pushed beyond the extreme eigenvalues

pub const FERMI_BRACKET_PADDING: f64 = 1.0;

// upper bound on secant refinement steps

pub const SECANT_MAX_ITER: usize = 200;

// upper bound on doublings when a bracket is grown around a Fermi level

pub const FERMI_BRACKET_MAX_DOUBLING: usize = 64;
