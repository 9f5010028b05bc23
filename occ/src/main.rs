mod eig;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use control::Control;
use dfttypes::*;
use dwconsts::*;
use dwmpi::Reducer;
use fermilevel::*;
use itertools::multizip;
use smearing::Smearing;

/// Fermi level and occupation numbers of precomputed band energies.
#[derive(Parser, Debug)]
#[command(name = "occ", version)]
struct Cli {
    /// Control file with the smearing, temperature and electron count
    #[arg(long, default_value = "in.ctrl")]
    ctrl: String,

    /// Band energies (eV) as `iband ik energy` lines [default: in.eig]
    #[arg(long, conflicts_with_all = ["eig_up", "eig_dn"])]
    eig: Option<String>,

    /// Spin-up band energies of a spin-polarised run [default: in.up.eig]
    #[arg(long)]
    eig_up: Option<String>,

    /// Spin-down band energies of a spin-polarised run [default: in.dn.eig]
    #[arg(long)]
    eig_dn: Option<String>,

    /// k-point weights, one per line; uniform when absent
    #[arg(long)]
    kweights: Option<String>,

    /// Number of in-process workers sharing the k-points
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Write the occupations as `iband ik occupation` lines
    #[arg(long)]
    out: Option<String>,
}

/// Solve of one worker with the occupations of every k-point attached.
struct Solution {
    result: OccupationResult,
    occupation: VKOccupation,
}

fn main() -> Result<()> {
    // first statement

    let stopwatch_main = std::time::Instant::now();

    let cli = Cli::parse();

    if cli.workers == 0 {
        bail!("--workers must be at least 1");
    }

    // read in control parameters

    let mut control = Control::new();
    control
        .read_file(&cli.ctrl)
        .with_context(|| format!("Failed to read control parameters from {}", cli.ctrl))?;

    init_logger(control.get_verbosity())?;

    let smearing = smearing::new(control.get_smearing_scheme())?;

    let algorithm = match control.get_fermi_scheme() {
        "auto" => None,
        scheme => Some(scheme.parse::<FermiLevelAlgorithm>()?),
    };

    // read in band energies

    let vkevals = load_eigenvalues(&cli, &control)?;

    let (solution, is_root) = solve(&cli, &vkevals, &control, smearing.as_ref(), algorithm)?;

    if is_root {
        control.display();

        display_solution(&vkevals, &solution);

        if let Some(out) = &cli.out {
            for (ispin, occ) in solution.occupation.channels().into_iter().enumerate() {
                let path = match (vkevals.get_n_spin(), ispin) {
                    (1, _) => out.clone(),
                    (_, 0) => format!("{}.up", out),
                    _ => format!("{}.dn", out),
                };

                eig::write_band_file(&path, occ, 1.0)
                    .with_context(|| format!("Failed to write occupations to {}", path))?;
            }
        }
    }

    if control.get_require_full_occ() {
        validate_fully_filled(&solution.occupation, vkevals.get_filled_occ())?;
    }

    if is_root {
        println!();
        println!("   {:-^88}", " statistics ");
        println!();
        let elapsed_main_seconds = stopwatch_main.elapsed().as_secs_f64();
        println!(
            "   {:16}{:5}{:16.2} seconds {:16.2} hours",
            "Total",
            ":",
            elapsed_main_seconds,
            elapsed_main_seconds / 3600.0
        );
    }

    #[cfg(feature = "mpi")]
    dwmpi::finalize();

    // last statement

    Ok(())
}

fn init_logger(verbosity: &str) -> Result<()> {
    let level = match verbosity {
        "low" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };

    // RUST_LOG takes precedence over the verbosity in in.ctrl
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))
}

fn load_eigenvalues(cli: &Cli, control: &Control) -> Result<VKEigenValue> {
    let read = |path: &str| -> Result<Vec<Vec<f64>>> {
        let evals = eig::read_eig_file(path)?;
        log::info!("read {} k-points from {}", evals.len(), path);
        Ok(evals)
    };

    if control.is_spin() {
        if cli.eig.is_some() {
            bail!("spin_scheme = spin reads --eig-up and --eig-dn, not --eig");
        }

        let up = read(cli.eig_up.as_deref().unwrap_or("in.up.eig"))?;
        let dn = read(cli.eig_dn.as_deref().unwrap_or("in.dn.eig"))?;

        if up.len() != dn.len() {
            bail!(
                "spin channels have {} and {} k-points",
                up.len(),
                dn.len()
            );
        }

        let weights = load_kweights(cli, up.len())?;

        Ok(VKEigenValue::Spin(
            attach_kweights(up, &weights),
            attach_kweights(dn, &weights),
        ))
    } else {
        if cli.eig_up.is_some() || cli.eig_dn.is_some() {
            bail!("--eig-up and --eig-dn need spin_scheme = spin");
        }

        let evals = read(cli.eig.as_deref().unwrap_or("in.eig"))?;

        let weights = load_kweights(cli, evals.len())?;

        Ok(VKEigenValue::NonSpin(attach_kweights(evals, &weights)))
    }
}

fn load_kweights(cli: &Cli, nkpt: usize) -> Result<Vec<f64>> {
    match &cli.kweights {
        Some(path) => Ok(eig::read_kweights(path, nkpt)?),
        None => Ok(eig::uniform_kweights(nkpt)),
    }
}

fn attach_kweights(vkevals: Vec<Vec<f64>>, weights: &[f64]) -> Vec<KEigenValue> {
    vkevals
        .into_iter()
        .zip(weights.iter())
        .map(|(evals, &w)| KEigenValue::new(w, evals))
        .collect()
}

#[cfg(not(feature = "mpi"))]
fn solve(
    cli: &Cli,
    vkevals: &VKEigenValue,
    control: &Control,
    smearing: &(dyn Smearing + Send + Sync),
    algorithm: Option<FermiLevelAlgorithm>,
) -> Result<(Solution, bool)> {
    if cli.workers == 1 {
        let solution = run_worker(&dwmpi::SerialReducer, vkevals, control, smearing, algorithm)?;
        return Ok((solution, true));
    }

    let solutions = dwmpi::ThreadGroup::run(cli.workers, |reducer| {
        run_worker(&reducer, vkevals, control, smearing, algorithm)
    })
    .map_err(|_| anyhow!("a worker thread panicked"))?;

    // every worker holds the same result after the gather
    let solution = solutions
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no worker returned a result"))??;

    Ok((solution, true))
}

#[cfg(feature = "mpi")]
fn solve(
    _cli: &Cli,
    vkevals: &VKEigenValue,
    control: &Control,
    smearing: &(dyn Smearing + Send + Sync),
    algorithm: Option<FermiLevelAlgorithm>,
) -> Result<(Solution, bool)> {
    let reducer = dwmpi::MpiReducer::new();

    let solution = run_worker(&reducer, vkevals, control, smearing, algorithm)?;

    Ok((solution, reducer.is_root()))
}

/// Solves on the k-points of this worker and gathers the occupations of all
/// k-points. Collective.
fn run_worker(
    reducer: &dyn Reducer,
    vkevals: &VKEigenValue,
    control: &Control,
    smearing: &dyn Smearing,
    algorithm: Option<FermiLevelAlgorithm>,
) -> Result<Solution, FermiLevelError> {
    let range = kpts_distribution::get_k_range(
        vkevals.get_n_kpoints(),
        reducer.get_size(),
        reducer.get_rank(),
    );

    let ik_first = range.start;

    let local = vkevals.select_kpoints(range);

    let temperature = control.get_temperature() * BOLTZMANN_CONSTANT;

    let mut model = FermiModel::new(control.get_nelec(), temperature, smearing);

    if let Some(fermi_level) = control.get_fermi_level() {
        model = model.with_fixed_fermi_level(fermi_level);
    }

    let observer = LogObserver;

    let result = FermiSolver::new(reducer)
        .with_observer(&observer)
        .with_cheap_exit(control.get_fermi_cheap_exit())
        .solve(&local, &model, control.get_tol_nelec(), algorithm)?;

    let occupation = gather_occupations(reducer, vkevals, result.get_occupation(), ik_first);

    Ok(Solution { result, occupation })
}

/// Assembles the occupations of every k-point on every worker with one sum
/// reduction per state. Collective.
fn gather_occupations(
    reducer: &dyn Reducer,
    vkevals: &VKEigenValue,
    local: &VKOccupation,
    ik_first: usize,
) -> VKOccupation {
    let gather_channel = |evals: &[KEigenValue], local: &[Vec<f64>]| -> Vec<Vec<f64>> {
        evals
            .iter()
            .enumerate()
            .map(|(ik, k)| {
                let mine = ik
                    .checked_sub(ik_first)
                    .and_then(|ik_local| local.get(ik_local));

                (0..k.get_n_band())
                    .map(|ib| reducer.sum(mine.map_or(0.0, |occ| occ[ib])))
                    .collect()
            })
            .collect()
    };

    match (vkevals, local) {
        (VKEigenValue::Spin(up, dn), VKOccupation::Spin(occ_up, occ_dn)) => VKOccupation::Spin(
            gather_channel(up, occ_up),
            gather_channel(dn, occ_dn),
        ),
        (VKEigenValue::NonSpin(vk), VKOccupation::NonSpin(occ)) => {
            VKOccupation::NonSpin(gather_channel(vk, occ))
        }
        // occupations always come out in the layout of the eigenvalues
        (VKEigenValue::Spin(up, dn), _) => {
            VKOccupation::Spin(gather_channel(up, &[]), gather_channel(dn, &[]))
        }
        (VKEigenValue::NonSpin(vk), _) => VKOccupation::NonSpin(gather_channel(vk, &[])),
    }
}

fn display_solution(vkevals: &VKEigenValue, solution: &Solution) {
    let result = &solution.result;

    println!("   {:-^88}", " fermi level ");
    println!();

    let scheme = match result.get_algorithm() {
        Some(algorithm) => algorithm.to_string(),
        None => "fixed".to_string(),
    };

    println!("   {:<28} = {:>18}", "fermi_scheme", scheme);
    println!(
        "   {:<28} = {:>18.10} eV",
        "fermi_level",
        result.get_fermi_level() * HA_TO_EV
    );

    let mut nelec = 0.0;

    for (k, occ) in multizip((vkevals.iter(), solution.occupation.iter())) {
        nelec += k.get_k_weight() * occ.iter().sum::<f64>();
    }

    println!("   {:<28} = {:>18.10}", "nelec", nelec);

    for w in result.get_warnings() {
        println!("   warning: {}", w);
    }

    println!();
    println!("   {:-^88}", " occupations ");

    let channels = vkevals.channels();
    let occ_channels = solution.occupation.channels();

    for (ispin, (evals, occ)) in multizip((channels, occ_channels)).enumerate() {
        if vkevals.get_n_spin() == 2 {
            println!();
            println!("   spin {}", if ispin == 0 { "up" } else { "dn" });
        }

        for (ik, (k, occ_k)) in multizip((evals.iter(), occ.iter())).enumerate() {
            println!();
            println!("   ik = {:<6} weight = {:.10}", ik + 1, k.get_k_weight());

            for (ib, (e, o)) in multizip((k.get_evals().iter(), occ_k.iter())).enumerate() {
                println!("   {:6} {:20.10} eV {:16.10}", ib + 1, e * HA_TO_EV, o);
            }
        }
    }
}
