use crate::*;
use dwconsts::*;

/// Bisection on the excess electron count. Requires a monotonic occupation
/// curve; at zero temperature the zero-temperature strategy is used.
pub struct FermiLevelBisection {}

impl FermiLevel for FermiLevelBisection {
    fn get_fermi_level(&self, ctx: &SolveContext) -> Result<f64, FermiLevelError> {
        if ctx.temperature == 0.0 {
            return FermiLevelZeroTemperature {}.get_fermi_level(ctx);
        }

        let fermi_guess = get_initial_fermi_level(ctx.vkevals, ctx.n_electrons, ctx.reducer);

        let excess_guess = ctx.excess(fermi_guess);

        // large-gap systems are usually done here
        if excess_guess == 0.0 || excess_guess.abs() < ctx.cheap_exit * ctx.tol_nelec {
            log::debug!("integer-filling guess {} accepted without bisection", fermi_guess);
            return Ok(fermi_guess);
        }

        let (min, max, excess_min, excess_max) = get_fermi_bracket(ctx, fermi_guess, excess_guess);

        if !(excess_min < 0.0 && 0.0 < excess_max) {
            return Err(FermiLevelError::BracketingContractViolation {
                min,
                max,
                excess_min,
                excess_max,
            });
        }

        let fermi_level = rootfinding::bisection(|ef| ctx.excess(ef), min, max, f64::EPSILON)?;

        let residual = ctx.excess(fermi_level);

        if residual.abs() > ctx.tol_nelec {
            return Err(FermiLevelError::ResidualContractViolation {
                fermi_level,
                residual,
                tol_nelec: ctx.tol_nelec,
            });
        }

        Ok(fermi_level)
    }
}

/// Bracket `(min, max, excess(min), excess(max))` for the bisection: from the
/// guess up to the highest eigenvalue plus padding when the guess holds too
/// few electrons, else from the lowest eigenvalue minus padding up to the
/// guess. Collective.
pub fn get_fermi_bracket(ctx: &SolveContext, fermi_guess: f64, excess_guess: f64) -> (f64, f64, f64, f64) {
    let (emin, emax) = get_eigenvalue_range(ctx.vkevals, ctx.reducer);

    if excess_guess < 0.0 {
        let max = emax + FERMI_BRACKET_PADDING;
        (fermi_guess, max, excess_guess, ctx.excess(max))
    } else {
        let min = emin - FERMI_BRACKET_PADDING;
        (min, fermi_guess, ctx.excess(min), excess_guess)
    }
}
