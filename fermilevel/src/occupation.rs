use dfttypes::*;
use dwmpi::Reducer;
use smearing::Smearing;

/// Normalised energy `(e - ef) / T`.
///
/// At zero temperature the step-function limit is taken explicitly: states
/// below the Fermi level map to `-inf`, states above to `+inf`, and a state
/// exactly at the Fermi level to zero.
pub fn get_normalised_energy(energy: f64, fermi_level: f64, temperature: f64) -> f64 {
    if temperature > 0.0 {
        (energy - fermi_level) / temperature
    } else if energy < fermi_level {
        f64::NEG_INFINITY
    } else if energy > fermi_level {
        f64::INFINITY
    } else {
        0.0
    }
}

pub fn compute_occupation_k(
    evals: &[f64],
    fermi_level: f64,
    temperature: f64,
    smearing: &dyn Smearing,
    filled_occ: f64,
) -> Vec<f64> {
    evals
        .iter()
        .map(|&ev| {
            filled_occ
                * smearing.get_occupation_number(get_normalised_energy(ev, fermi_level, temperature))
        })
        .collect()
}

/// Occupations of every local state. Pure function of its inputs.
pub fn compute_occupation(
    vkevals: &VKEigenValue,
    fermi_level: f64,
    temperature: f64,
    smearing: &dyn Smearing,
) -> VKOccupation {
    let filled_occ = vkevals.get_filled_occ();

    let occ_channel = |vk: &[KEigenValue]| -> Vec<Vec<f64>> {
        vk.iter()
            .map(|k| {
                compute_occupation_k(k.get_evals(), fermi_level, temperature, smearing, filled_occ)
            })
            .collect()
    };

    match vkevals {
        VKEigenValue::NonSpin(vk) => VKOccupation::NonSpin(occ_channel(vk)),
        VKEigenValue::Spin(up, dn) => VKOccupation::Spin(occ_channel(up), occ_channel(dn)),
    }
}

/// k-weighted electron count over all workers. Collective.
pub fn get_total_electrons(
    vkevals: &VKEigenValue,
    fermi_level: f64,
    temperature: f64,
    smearing: &dyn Smearing,
    reducer: &dyn Reducer,
) -> f64 {
    let filled_occ = vkevals.get_filled_occ();

    let ntot_local: f64 = vkevals
        .iter()
        .map(|k| {
            let occ =
                compute_occupation_k(k.get_evals(), fermi_level, temperature, smearing, filled_occ);

            occ.iter().sum::<f64>() * k.get_k_weight()
        })
        .sum();

    reducer.sum(ntot_local)
}

/// Electron count at `fermi_level` minus the target. Collective.
pub fn get_excess_electrons(
    vkevals: &VKEigenValue,
    fermi_level: f64,
    temperature: f64,
    smearing: &dyn Smearing,
    n_electrons: f64,
    reducer: &dyn Reducer,
) -> f64 {
    get_total_electrons(vkevals, fermi_level, temperature, smearing, reducer) - n_electrons
}

/// Electron count with every computed state fully occupied. Collective.
pub fn get_max_electrons(vkevals: &VKEigenValue, reducer: &dyn Reducer) -> f64 {
    let nstates_local: f64 = vkevals
        .iter()
        .map(|k| k.get_n_band() as f64 * k.get_k_weight())
        .sum();

    vkevals.get_filled_occ() * reducer.sum(nstates_local)
}
