use dwconsts::*;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    ops::Not,
    str::FromStr,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("cannot read control file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown parameter : {0}")]
    UnknownParameter(String),

    #[error("invalid value '{value}' for parameter '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("parameter '{0}' is required")]
    MissingParameter(String),
}

#[derive(Debug, Clone)]
pub struct Control {
    verbosity: String, // low, high, debug

    spin_scheme: String, // nonspin, spin

    smearing_scheme: String, // fd, gs, mp1, mp2, mpN, mv, none
    temperature: f64,        // K

    nelec: f64,

    fermi_scheme: String,     // auto, bisection, twostage, zerotemp
    fermi_level: Option<f64>, // Ha, eV in in.ctrl
    fermi_cheap_exit: f64,
    tol_nelec: f64,

    require_full_occ: bool,
}

impl Default for Control {
    fn default() -> Self {
        Control {
            verbosity: "high".to_string(),
            spin_scheme: "nonspin".to_string(),
            smearing_scheme: "fd".to_string(),
            temperature: 0.0,
            nelec: 0.0,
            fermi_scheme: "auto".to_string(),
            fermi_level: None,
            fermi_cheap_exit: DEFAULT_FERMI_CHEAP_EXIT,
            tol_nelec: DEFAULT_TOL_NELEC,
            require_full_occ: false,
        }
    }
}

impl Control {
    pub fn new() -> Control {
        Control::default()
    }

    pub fn get_verbosity(&self) -> &str {
        &self.verbosity
    }

    pub fn get_spin_scheme(&self) -> &str {
        &self.spin_scheme
    }

    pub fn is_spin(&self) -> bool {
        "spin" == self.get_spin_scheme()
    }

    pub fn get_smearing_scheme(&self) -> &str {
        &self.smearing_scheme
    }

    /// Kelvin.
    pub fn get_temperature(&self) -> f64 {
        self.temperature
    }

    pub fn get_nelec(&self) -> f64 {
        self.nelec
    }

    pub fn get_fermi_scheme(&self) -> &str {
        &self.fermi_scheme
    }

    /// Fixed Fermi level in Hartree, if any.
    pub fn get_fermi_level(&self) -> Option<f64> {
        self.fermi_level
    }

    pub fn get_fermi_cheap_exit(&self) -> f64 {
        self.fermi_cheap_exit
    }

    pub fn get_tol_nelec(&self) -> f64 {
        self.tol_nelec
    }

    pub fn get_require_full_occ(&self) -> bool {
        self.require_full_occ
    }

    pub fn read_file(&mut self, inpfile: &str) -> Result<(), ControlError> {
        let lines = self.read_file_data_to_vec(inpfile)?;

        self.parse_lines(&lines)
    }

    pub fn parse_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<(), ControlError> {
        *self = Control::default();

        let mut b_nelec_set = false;

        for line in lines.iter() {
            // everything after '#' is a comment
            let line = line.as_ref().split('#').next().unwrap_or("").trim();

            if line.is_empty() {
                continue;
            }

            let s: Vec<&str> = line.splitn(2, '=').map(|x| x.trim()).collect();

            if s.len() != 2 {
                return Err(ControlError::UnknownParameter(line.to_string()));
            }

            let (key, value) = (s[0], s[1]);

            match key {
                "verbosity" => {
                    self.verbosity = parse_choice(key, value, &["low", "high", "debug"])?;
                }

                "spin_scheme" => {
                    self.spin_scheme = parse_choice(key, value, &["nonspin", "spin"])?;
                }

                "smearing_scheme" => {
                    self.smearing_scheme = value.to_lowercase();
                }

                "temperature" => {
                    self.temperature = parse_value(key, value)?;
                }

                "nelec" => {
                    self.nelec = parse_value(key, value)?;
                    b_nelec_set = true;
                }

                "fermi_scheme" => {
                    self.fermi_scheme = parse_choice(
                        key,
                        value,
                        &["auto", "bisection", "twostage", "zerotemp"],
                    )?;
                }

                "fermi_level" => {
                    self.fermi_level = Some(parse_value::<f64>(key, value)? * EV_TO_HA);
                }

                "fermi_cheap_exit" => {
                    self.fermi_cheap_exit = parse_value(key, value)?;
                }

                "tol_nelec" => {
                    self.tol_nelec = parse_value(key, value)?;
                }

                "require_full_occ" => {
                    self.require_full_occ = parse_value(key, value)?;
                }

                _ => {
                    return Err(ControlError::UnknownParameter(line.to_string()));
                }
            }
        }

        if b_nelec_set.not() {
            return Err(ControlError::MissingParameter("nelec".to_string()));
        }

        Ok(())
    }

    pub fn read_file_data_to_vec(&self, inpfile: &str) -> Result<Vec<String>, ControlError> {
        let file = File::open(inpfile).map_err(|source| ControlError::Io {
            path: inpfile.to_string(),
            source,
        })?;

        BufReader::new(file)
            .lines()
            .collect::<Result<Vec<String>, _>>()
            .map_err(|source| ControlError::Io {
                path: inpfile.to_string(),
                source,
            })
    }

    pub fn display(&self) {
        const OUT_WIDTH1: usize = 28;
        const OUT_WIDTH2: usize = 18;

        println!("   {:-^80}", " control parameters ");
        println!();

        println!(
            "   {:<width1$} = {:>width2$}",
            "spin_scheme",
            self.get_spin_scheme(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "smearing_scheme",
            self.get_smearing_scheme(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );
        println!(
            "   {:<width1$} = {:>width2$} K",
            "temperature",
            self.get_temperature(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "nelec",
            self.get_nelec(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "fermi_scheme",
            self.get_fermi_scheme(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        if let Some(ef) = self.get_fermi_level() {
            println!(
                "   {:<width1$} = {:>width2$.6} eV",
                "fermi_level",
                ef * HA_TO_EV,
                width1 = OUT_WIDTH1,
                width2 = OUT_WIDTH2
            );
        }

        println!(
            "   {:<width1$} = {:>width2$.3E}",
            "tol_nelec",
            self.get_tol_nelec(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );
        println!(
            "   {:<width1$} = {:>width2$}",
            "fermi_cheap_exit",
            self.get_fermi_cheap_exit(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "require_full_occ",
            self.get_require_full_occ(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "verbosity",
            self.get_verbosity(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!();
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ControlError> {
    value.parse().map_err(|_| ControlError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_choice(key: &str, value: &str, choices: &[&str]) -> Result<String, ControlError> {
    let v = value.to_lowercase();

    if choices.contains(&v.as_str()) {
        Ok(v)
    } else {
        Err(ControlError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
