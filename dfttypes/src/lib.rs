use enum_as_inner::EnumAsInner;
use std::ops::Range;

/// Band energies (Hartree, ascending) of one k-point together with its
/// integration weight.
#[derive(Debug, Clone, PartialEq)]
pub struct KEigenValue {
    k_weight: f64,
    evals: Vec<f64>,
}

impl KEigenValue {
    pub fn new(k_weight: f64, evals: Vec<f64>) -> KEigenValue {
        debug_assert!(
            evals.windows(2).all(|w| w[0] <= w[1]),
            "eigenvalues must be sorted in ascending order"
        );

        KEigenValue { k_weight, evals }
    }

    pub fn get_k_weight(&self) -> f64 {
        self.k_weight
    }

    pub fn get_evals(&self) -> &[f64] {
        &self.evals
    }

    pub fn get_n_band(&self) -> usize {
        self.evals.len()
    }

    pub fn get_lowest(&self) -> Option<f64> {
        self.evals.first().copied()
    }

    pub fn get_highest(&self) -> Option<f64> {
        self.evals.last().copied()
    }
}

/// Eigenvalues of the k-points owned by this worker.
///
/// In the spin-polarised case the up and down channels are stored as two
/// separate k-point lists sharing the same weights.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum VKEigenValue {
    NonSpin(Vec<KEigenValue>),
    Spin(Vec<KEigenValue>, Vec<KEigenValue>),
}

impl VKEigenValue {
    pub fn get_n_spin(&self) -> usize {
        match self {
            VKEigenValue::NonSpin(_) => 1,
            VKEigenValue::Spin(_, _) => 2,
        }
    }

    /// Maximum occupation of a single state.
    pub fn get_filled_occ(&self) -> f64 {
        match self {
            VKEigenValue::NonSpin(_) => 2.0,
            VKEigenValue::Spin(_, _) => 1.0,
        }
    }

    pub fn channels(&self) -> Vec<&[KEigenValue]> {
        match self {
            VKEigenValue::NonSpin(vk) => vec![vk.as_slice()],
            VKEigenValue::Spin(up, dn) => vec![up.as_slice(), dn.as_slice()],
        }
    }

    /// All k-points of all spin channels.
    pub fn iter(&self) -> impl Iterator<Item = &KEigenValue> + '_ {
        self.channels().into_iter().flat_map(|c| c.iter())
    }

    /// Number of k-points per spin channel owned by this worker.
    pub fn get_n_kpoints(&self) -> usize {
        match self {
            VKEigenValue::NonSpin(vk) => vk.len(),
            VKEigenValue::Spin(up, _) => up.len(),
        }
    }

    /// The subset of k-points in `range`, in every spin channel.
    pub fn select_kpoints(&self, range: Range<usize>) -> VKEigenValue {
        match self {
            VKEigenValue::NonSpin(vk) => VKEigenValue::NonSpin(vk[range].to_vec()),
            VKEigenValue::Spin(up, dn) => {
                VKEigenValue::Spin(up[range.clone()].to_vec(), dn[range].to_vec())
            }
        }
    }
}

/// Occupation numbers laid out exactly like the [`VKEigenValue`] they were
/// computed from.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum VKOccupation {
    NonSpin(Vec<Vec<f64>>),
    Spin(Vec<Vec<f64>>, Vec<Vec<f64>>),
}

impl VKOccupation {
    pub fn channels(&self) -> Vec<&[Vec<f64>]> {
        match self {
            VKOccupation::NonSpin(vk) => vec![vk.as_slice()],
            VKOccupation::Spin(up, dn) => vec![up.as_slice(), dn.as_slice()],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<f64>> + '_ {
        self.channels().into_iter().flat_map(|c| c.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_kpoints() -> Vec<KEigenValue> {
        vec![
            KEigenValue::new(0.5, vec![-1.0, 0.5, 2.0]),
            KEigenValue::new(0.5, vec![-0.8, 0.7]),
        ]
    }

    #[test]
    fn test_spin_bookkeeping_follows_variant() {
        let nonspin = VKEigenValue::NonSpin(two_kpoints());
        let spin = VKEigenValue::Spin(two_kpoints(), two_kpoints());

        assert_eq!(nonspin.get_n_spin(), 1);
        assert_eq!(nonspin.get_filled_occ(), 2.0);
        assert_eq!(spin.get_n_spin(), 2);
        assert_eq!(spin.get_filled_occ(), 1.0);

        assert_eq!(nonspin.iter().count(), 2);
        assert_eq!(spin.iter().count(), 4);
        assert_eq!(spin.get_n_kpoints(), 2);
    }

    #[test]
    fn test_select_kpoints_keeps_both_channels() {
        let spin = VKEigenValue::Spin(two_kpoints(), two_kpoints());

        let sub = spin.select_kpoints(1..2);
        let (up, dn) = sub.as_spin().unwrap();

        assert_eq!(up.len(), 1);
        assert_eq!(dn.len(), 1);
        assert_eq!(up[0].get_evals(), &[-0.8, 0.7]);
        assert_eq!(up[0].get_highest(), Some(0.7));
    }
}
