use dwconsts::*;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EigFileError {
    #[error("cannot access '{path}'")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{path}:{line}: cannot parse '{content}'")]
    Parse {
        path: String,
        line: usize,
        content: String,
    },

    #[error("{path}: {reason}")]
    Inconsistent { path: String, reason: String },
}

fn io_error(path: &str) -> impl FnOnce(io::Error) -> EigFileError + '_ {
    move |source| EigFileError::Io {
        path: path.to_string(),
        source,
    }
}

/// Band energies per k-point from a file of `iband ik energy` lines, energies
/// in eV. Returned in Hartree, k-points in file order of their index and
/// bands sorted ascending.
pub fn read_eig_file(path: &str) -> Result<Vec<Vec<f64>>, EigFileError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;

    parse_eig(path, &content)
}

pub fn parse_eig(path: &str, content: &str) -> Result<Vec<Vec<f64>>, EigFileError> {
    let mut kpoints: BTreeMap<usize, Vec<(usize, f64)>> = BTreeMap::new();

    for (iline, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_error = || EigFileError::Parse {
            path: path.to_string(),
            line: iline + 1,
            content: line.to_string(),
        };

        let cols: Vec<&str> = line.split_whitespace().collect();

        if cols.len() != 3 {
            return Err(parse_error());
        }

        let iband: usize = cols[0].parse().map_err(|_| parse_error())?;
        let ik: usize = cols[1].parse().map_err(|_| parse_error())?;
        let energy: f64 = cols[2].parse().map_err(|_| parse_error())?;

        if iband == 0 || ik == 0 || !energy.is_finite() {
            return Err(parse_error());
        }

        kpoints.entry(ik).or_default().push((iband, energy * EV_TO_HA));
    }

    let inconsistent = |reason: String| EigFileError::Inconsistent {
        path: path.to_string(),
        reason,
    };

    if kpoints.is_empty() {
        return Err(inconsistent("no eigenvalues".to_string()));
    }

    let mut vkevals = Vec::with_capacity(kpoints.len());

    for (expected, (ik, mut bands)) in kpoints.into_iter().enumerate() {
        if ik != expected + 1 {
            return Err(inconsistent(format!("k-point {} is missing", expected + 1)));
        }

        bands.sort_by_key(|&(iband, _)| iband);

        for (expected_band, &(iband, _)) in bands.iter().enumerate() {
            if iband != expected_band + 1 {
                return Err(inconsistent(format!(
                    "band {} of k-point {} is missing or repeated",
                    expected_band + 1,
                    ik
                )));
            }
        }

        let mut evals: Vec<f64> = bands.into_iter().map(|(_, e)| e).collect();
        evals.sort_by(|a, b| a.total_cmp(b));

        vkevals.push(evals);
    }

    Ok(vkevals)
}

/// One weight per line. The weights are normalised to sum to one.
pub fn read_kweights(path: &str, nkpt: usize) -> Result<Vec<f64>, EigFileError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;

    let mut weights = Vec::with_capacity(nkpt);

    for (iline, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let w: f64 = line
            .parse()
            .ok()
            .filter(|w: &f64| w.is_finite() && *w >= 0.0)
            .ok_or_else(|| EigFileError::Parse {
                path: path.to_string(),
                line: iline + 1,
                content: line.to_string(),
            })?;

        weights.push(w);
    }

    let total: f64 = weights.iter().sum();

    if weights.len() != nkpt || total <= 0.0 {
        return Err(EigFileError::Inconsistent {
            path: path.to_string(),
            reason: format!("expected {} positive k-point weights, found {}", nkpt, weights.len()),
        });
    }

    Ok(weights.into_iter().map(|w| w / total).collect())
}

pub fn uniform_kweights(nkpt: usize) -> Vec<f64> {
    vec![1.0 / nkpt as f64; nkpt]
}

/// Writes `iband ik value` lines, one per state.
pub fn write_band_file(path: &str, values: &[Vec<f64>], scale: f64) -> Result<(), EigFileError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);

    for (ik, values_at_k) in values.iter().enumerate() {
        for (iband, v) in values_at_k.iter().enumerate() {
            writeln!(writer, "{:6} {:6} {:22.14E}", iband + 1, ik + 1, v * scale)
                .map_err(io_error(path))?;
        }
    }

    writer.flush().map_err(io_error(path))
}
