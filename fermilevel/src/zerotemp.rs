use crate::*;

/// Integer filling without smearing. Only possible when the electrons fill a
/// whole number of bands at every k-point.
pub struct FermiLevelZeroTemperature {}

impl FermiLevel for FermiLevelZeroTemperature {
    fn get_fermi_level(&self, ctx: &SolveContext) -> Result<f64, FermiLevelError> {
        let unit = ctx.vkevals.get_n_spin() as f64 * ctx.vkevals.get_filled_occ();

        let remainder = ctx.n_electrons % unit;

        if remainder > ctx.tol_nelec && unit - remainder > ctx.tol_nelec {
            return Err(FermiLevelError::FractionalOccupation {
                n_electrons: ctx.n_electrons,
                unit,
            });
        }

        let fermi_level = get_initial_fermi_level(ctx.vkevals, ctx.n_electrons, ctx.reducer);

        let excess = ctx.excess(fermi_level);

        if excess.abs() > ctx.tol_nelec {
            return Err(FermiLevelError::UnattainableOccupation {
                fermi_level,
                excess,
            });
        }

        Ok(fermi_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dfttypes::*;
    use dwconsts::*;
    use dwmpi::SerialReducer;
    use smearing::SmearingFD;

    fn solve(v: &VKEigenValue, n_electrons: f64) -> Result<f64, FermiLevelError> {
        let ctx = SolveContext {
            vkevals: v,
            n_electrons,
            temperature: 0.0,
            smearing: &SmearingFD {},
            tol_nelec: 1.0e-10,
            cheap_exit: DEFAULT_FERMI_CHEAP_EXIT,
            reducer: &SerialReducer,
            observer: &NoopObserver,
        };

        FermiLevelZeroTemperature {}.get_fermi_level(&ctx)
    }

    #[test]
    fn test_zero_temperature_insulator() {
        let v = VKEigenValue::NonSpin(vec![
            KEigenValue::new(0.5, vec![-1.0, 0.5, 2.0]),
            KEigenValue::new(0.5, vec![-1.0, 0.5, 2.0]),
        ]);

        assert_eq!(solve(&v, 2.0).unwrap(), -0.25);
        assert_eq!(solve(&v, 4.0).unwrap(), 1.25);
    }

    #[test]
    fn test_zero_temperature_rejects_odd_electron_count() {
        let v = VKEigenValue::NonSpin(vec![KEigenValue::new(1.0, vec![-1.0, 0.5, 2.0])]);

        assert_eq!(
            solve(&v, 3.0),
            Err(FermiLevelError::FractionalOccupation {
                n_electrons: 3.0,
                unit: 2.0
            })
        );
    }

    #[test]
    fn test_zero_temperature_spin_polarised_odd_count_needs_both_channels() {
        // 3 electrons with n_spin = 2 and filled_occ = 1 is still fractional
        let v = VKEigenValue::Spin(
            vec![KEigenValue::new(1.0, vec![-1.0, 0.5])],
            vec![KEigenValue::new(1.0, vec![-1.0, 0.5])],
        );

        assert!(matches!(
            solve(&v, 3.0),
            Err(FermiLevelError::FractionalOccupation { .. })
        ));
        assert_eq!(solve(&v, 2.0).unwrap(), -0.25);
    }

    #[test]
    fn test_zero_temperature_overlapping_bands() {
        // the second band of the first k-point lies below the first band of
        // the second one, so no Fermi level gives integer filling
        let v = VKEigenValue::NonSpin(vec![
            KEigenValue::new(0.25, vec![-1.0, 0.1]),
            KEigenValue::new(0.75, vec![0.2, 0.9]),
        ]);

        match solve(&v, 2.0) {
            Err(FermiLevelError::UnattainableOccupation {
                fermi_level,
                excess,
            }) => {
                assert_relative_eq!(fermi_level, 0.15, epsilon = 1.0e-15);
                assert_eq!(excess, -1.0);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
