use dfttypes::VKEigenValue;
use dwconsts::*;
use dwmpi::Reducer;

/// Fermi level assuming integer occupation and the same number of filled
/// bands at every k-point.
///
/// With `n_fill = ceil(n_electrons / (n_spin * filled_occ))`, the HOMO is the
/// highest `n_fill`-th band and the LUMO the lowest `(n_fill + 1)`-th band over
/// all workers; the guess is their midpoint. k-points without an
/// `(n_fill + 1)`-th band do not take part in the LUMO, and if none has one
/// the guess is placed above the HOMO. Collective: always two reductions.
pub fn get_initial_fermi_level(
    vkevals: &VKEigenValue,
    n_electrons: f64,
    reducer: &dyn Reducer,
) -> f64 {
    let unit = vkevals.get_n_spin() as f64 * vkevals.get_filled_occ();

    let n_fill = (n_electrons / unit).ceil().max(0.0) as usize;

    let mut homo_local = f64::NEG_INFINITY;
    let mut lumo_local = f64::INFINITY;

    for k in vkevals.iter() {
        let evals = k.get_evals();

        if n_fill > 0 {
            if let Some(&ev) = evals.get(n_fill - 1) {
                homo_local = homo_local.max(ev);
            }
        }

        if let Some(&ev) = evals.get(n_fill) {
            lumo_local = lumo_local.min(ev);
        }
    }

    let homo = reducer.max(homo_local);
    let lumo = reducer.min(lumo_local);

    match (homo.is_finite(), lumo.is_finite()) {
        (true, true) => (homo + lumo) / 2.0,
        (true, false) => homo + FERMI_BRACKET_PADDING,
        (false, true) => lumo - FERMI_BRACKET_PADDING,
        (false, false) => 0.0,
    }
}

/// Lowest and highest eigenvalue over all workers. Collective.
pub fn get_eigenvalue_range(vkevals: &VKEigenValue, reducer: &dyn Reducer) -> (f64, f64) {
    let emin_local = vkevals
        .iter()
        .filter_map(|k| k.get_lowest())
        .fold(f64::INFINITY, f64::min);

    let emax_local = vkevals
        .iter()
        .filter_map(|k| k.get_highest())
        .fold(f64::NEG_INFINITY, f64::max);

    (reducer.min(emin_local), reducer.max(emax_local))
}
