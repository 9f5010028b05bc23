use crate::*;
use dwconsts::*;
use rootfinding::RootError;
use smearing::SmearingGS;

/// For occupation curves that are not monotonic (Methfessel-Paxton,
/// Marzari-Vanderbilt) the electron count can reach the target at several
/// Fermi levels. A bisection with Gaussian smearing at the same temperature
/// first locates the physically meaningful region; a safeguarded secant
/// iteration on the true excess then refines from there.
///
/// When the secant iteration cannot reach a root from the Gaussian reference
/// (it slides into a dip of the excess that stays above zero, or the excess
/// is flat), a bracket is grown around the reference in steps of the
/// temperature and the root is refined inside it. If no sign change turns
/// up, the reference is returned and the caller sees the residual.
pub struct FermiLevelTwoStage {}

impl FermiLevel for FermiLevelTwoStage {
    fn get_fermi_level(&self, ctx: &SolveContext) -> Result<f64, FermiLevelError> {
        if ctx.temperature == 0.0 {
            return FermiLevelZeroTemperature {}.get_fermi_level(ctx);
        }

        let gaussian = SmearingGS {};

        let fermi_gaussian = FermiLevelBisection {}.get_fermi_level(&ctx.with_smearing(&gaussian))?;

        log::debug!("Gaussian reference Fermi level {}", fermi_gaussian);

        match rootfinding::secant(|ef| ctx.excess(ef), fermi_gaussian, f64::EPSILON, SECANT_MAX_ITER) {
            Ok(fermi_level) => return Ok(fermi_level),

            Err(e @ RootError::Stalled { .. })
            | Err(e @ RootError::Diverged { .. })
            | Err(e @ RootError::MaxIterations { .. }) => {
                log::debug!("secant refinement failed: {}", e);
            }

            Err(e) => return Err(e.into()),
        }

        // excess is flat around the reference, e.g. inside a gap
        if ctx.excess(fermi_gaussian).abs() <= ctx.tol_nelec {
            return Ok(fermi_gaussian);
        }

        match rootfinding::expand_bracket(
            |ef| ctx.excess(ef),
            fermi_gaussian,
            ctx.temperature,
            FERMI_BRACKET_MAX_DOUBLING,
        ) {
            Ok((a, b)) => {
                log::debug!("secant restarted inside [{}, {}]", a.min(b), a.max(b));

                Ok(rootfinding::bracketed_secant(|ef| ctx.excess(ef), a, b, f64::EPSILON)?)
            }

            Err(RootError::MaxIterations { .. }) => {
                log::debug!("no sign change of the excess around {}", fermi_gaussian);

                Ok(fermi_gaussian)
            }

            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfttypes::*;
    use dwmpi::SerialReducer;
    use smearing::{SmearingMP, SmearingMV, SmearingNone};

    fn context<'a>(
        vkevals: &'a VKEigenValue,
        smearing: &'a dyn Smearing,
        n_electrons: f64,
        temperature: f64,
    ) -> SolveContext<'a> {
        SolveContext {
            vkevals,
            n_electrons,
            temperature,
            smearing,
            tol_nelec: 1.0e-10,
            cheap_exit: DEFAULT_FERMI_CHEAP_EXIT,
            reducer: &SerialReducer,
            observer: &NoopObserver,
        }
    }

    #[test]
    fn test_twostage_refines_on_true_smearing() {
        let v = VKEigenValue::NonSpin(vec![
            KEigenValue::new(0.5, vec![-1.0, -0.1, 0.05, 0.3]),
            KEigenValue::new(0.5, vec![-0.9, -0.02, 0.1, 0.4]),
        ]);

        for smearing in [
            Box::new(SmearingMP::new(1)) as Box<dyn Smearing>,
            Box::new(SmearingMV {}),
        ]
        .iter()
        {
            let ctx = context(&v, smearing.as_ref(), 3.0, 0.01);

            let ef = FermiLevelTwoStage {}.get_fermi_level(&ctx).unwrap();

            let ef_gaussian = FermiLevelBisection {}
                .get_fermi_level(&ctx.with_smearing(&SmearingGS {}))
                .unwrap();

            assert!(ctx.excess(ef).abs() <= 1.0e-10);
            assert!((ef - ef_gaussian).abs() < 5.0 * ctx.temperature);
        }
    }

    #[test]
    fn test_twostage_crosses_positive_dip_of_cold_smearing() {
        // from the Gaussian reference the slope of the MV excess leads to a
        // dip that stays above zero; the only root lies further down
        let v = VKEigenValue::NonSpin(vec![
            KEigenValue::new(0.5, vec![-1.0, -0.1, 0.05, 0.3]),
            KEigenValue::new(0.5, vec![-0.9, -0.02, 0.1, 0.4]),
        ]);
        let smearing = SmearingMV {};
        let ctx = context(&v, &smearing, 3.0, 0.01);

        let ef_gaussian = FermiLevelBisection {}
            .get_fermi_level(&ctx.with_smearing(&SmearingGS {}))
            .unwrap();

        let ef = FermiLevelTwoStage {}.get_fermi_level(&ctx).unwrap();

        assert!(ctx.excess(ef).abs() <= 1.0e-10);
        assert!(ef < ef_gaussian);
        assert!((ef + 0.0907).abs() < 2.0e-3);
    }

    #[test]
    fn test_twostage_brackets_a_jump_and_returns_its_residual() {
        // the sharp step holds 0, 1 or 2 electrons, never half of one: the
        // secant stalls on the flat count and the bracket ends at the jump
        let v = VKEigenValue::NonSpin(vec![KEigenValue::new(1.0, vec![-1.0, 1.0])]);
        let smearing = SmearingNone {};
        let ctx = context(&v, &smearing, 0.5, 0.01);

        let ef = FermiLevelTwoStage {}.get_fermi_level(&ctx).unwrap();

        assert!((ef + 1.0).abs() < 1.0e-12);
        assert_eq!(ctx.excess(ef).abs(), 0.5);
    }

    #[test]
    fn test_twostage_in_gap_keeps_reference() {
        let v = VKEigenValue::NonSpin(vec![KEigenValue::new(1.0, vec![-1.0, 1.0])]);
        let smearing = SmearingMP::new(2);
        let ctx = context(&v, &smearing, 2.0, 0.01);

        let ef = FermiLevelTwoStage {}.get_fermi_level(&ctx).unwrap();

        assert!(ef.abs() < 1.0e-12);
        assert!(ctx.excess(ef).abs() <= 1.0e-10);
    }

    #[test]
    fn test_twostage_delegates_at_zero_temperature() {
        let v = VKEigenValue::NonSpin(vec![KEigenValue::new(1.0, vec![-1.0, 0.5, 2.0])]);
        let smearing = SmearingMP::new(1);
        let ctx = context(&v, &smearing, 3.0, 0.0);

        let err = FermiLevelTwoStage {}.get_fermi_level(&ctx).unwrap_err();

        assert!(matches!(err, FermiLevelError::FractionalOccupation { .. }));
    }
}
