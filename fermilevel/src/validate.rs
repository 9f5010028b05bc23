use crate::FermiLevelError;
use dfttypes::VKOccupation;
use itertools::Itertools;

/// Fails on the first k-point that has a state not fully occupied.
///
/// Meant for callers that only compute the occupied bands of an insulator.
/// Local check, no reduction involved.
pub fn validate_fully_filled(vkocc: &VKOccupation, filled_occ: f64) -> Result<(), FermiLevelError> {
    let tol = f64::EPSILON.sqrt();

    for (ispin, channel) in vkocc.channels().into_iter().enumerate() {
        let partial = channel
            .iter()
            .find_position(|occ| occ.iter().any(|&o| (o - filled_occ).abs() > tol));

        if let Some((ik, occ)) = partial {
            return Err(FermiLevelError::PartialOccupation {
                ispin,
                ik,
                occupation: occ.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_filled_passes() {
        let occ = VKOccupation::NonSpin(vec![vec![2.0, 2.0], vec![2.0, 2.0 - 1.0e-12]]);

        assert!(validate_fully_filled(&occ, 2.0).is_ok());
    }

    #[test]
    fn test_first_partial_kpoint_is_reported() {
        let occ = VKOccupation::Spin(
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            vec![vec![1.0, 1.0], vec![1.0, 0.4], vec![1.0, 0.0]],
        );

        assert_eq!(
            validate_fully_filled(&occ, 1.0),
            Err(FermiLevelError::PartialOccupation {
                ispin: 1,
                ik: 1,
                occupation: vec![1.0, 0.4],
            })
        );
    }

    #[test]
    fn test_empty_state_is_not_full() {
        let occ = VKOccupation::NonSpin(vec![vec![2.0, 0.0]]);

        assert!(matches!(
            validate_fully_filled(&occ, 2.0),
            Err(FermiLevelError::PartialOccupation { ik: 0, .. })
        ));
    }
}
