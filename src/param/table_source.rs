use crate::constants::N_TABULATED;
use crate::error::{Result, SlakoError};
use crate::param::elements::SpeciesParameters;
use hashbrown::HashMap;
use ron::de::from_str;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tabulated two-center integrals of one ordered species pair (A, B) as they are stored
/// in the parameter files. Every row of `hamiltonian` and `overlap` holds the ten integrals
/// dds, ddp, ddd, pds, pdp, pps, ppp, sds, sps, sss at the corresponding grid point (in bohr),
/// with the orbital of A as bra.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TabulatedIntegrals {
    pub grid: Vec<f64>,
    pub hamiltonian: Vec<[f64; N_TABULATED]>,
    pub overlap: Vec<[f64; N_TABULATED]>,
}

/// Provider of the raw parametrization. The Slater-Koster tables and the species data are
/// read once through this trait, how they are stored is up to the implementation.
pub trait TableSource {
    /// Integrals of the ordered pair (`kind1`, `kind2`).
    fn integrals(&self, kind1: &str, kind2: &str) -> Result<TabulatedIntegrals>;

    /// Valence shells and onsite energies of a species.
    fn species(&self, symbol: &str) -> Result<SpeciesParameters>;
}

/// Parameter files in RON format inside a single directory:
/// `<A>_<B>.ron` for the integrals of every ordered pair and `<A>.elm.ron` for the species.
#[derive(Clone, Debug)]
pub struct ParameterDirectory {
    path: PathBuf,
}

impl ParameterDirectory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ParameterDirectory {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table_file(&self, kind1: &str, kind2: &str) -> PathBuf {
        self.path.join(format!("{}_{}.ron", kind1, kind2))
    }

    pub fn species_file(&self, symbol: &str) -> PathBuf {
        self.path.join(format!("{}.elm.ron", symbol))
    }
}

fn read_ron<T: for<'de> Deserialize<'de>>(filename: &Path) -> Result<T> {
    let data: String = fs::read_to_string(filename).map_err(|err| {
        SlakoError::config(format!("unable to read file {}: {}", filename.display(), err))
    })?;
    from_str(&data).map_err(|err| {
        SlakoError::config(format!(
            "RON file {} was not well-formatted: {}",
            filename.display(),
            err
        ))
    })
}

impl TableSource for ParameterDirectory {
    fn integrals(&self, kind1: &str, kind2: &str) -> Result<TabulatedIntegrals> {
        read_ron(&self.table_file(kind1, kind2))
    }

    fn species(&self, symbol: &str) -> Result<SpeciesParameters> {
        let params: SpeciesParameters = read_ron(&self.species_file(symbol))?;
        if params.symbol != symbol {
            return Err(SlakoError::config(format!(
                "file {} describes {} instead of {}",
                self.species_file(symbol).display(),
                params.symbol,
                symbol
            )));
        }
        Ok(params)
    }
}

/// Parametrization that is kept in memory, e.g. generated by another program.
#[derive(Clone, Debug, Default)]
pub struct InMemoryParameters {
    tables: HashMap<(String, String), TabulatedIntegrals>,
    species: HashMap<String, SpeciesParameters>,
}

impl InMemoryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_species(&mut self, params: SpeciesParameters) {
        self.species.insert(params.symbol.clone(), params);
    }

    pub fn add_table(&mut self, kind1: &str, kind2: &str, table: TabulatedIntegrals) {
        self.tables
            .insert((kind1.to_owned(), kind2.to_owned()), table);
    }
}

impl TableSource for InMemoryParameters {
    fn integrals(&self, kind1: &str, kind2: &str) -> Result<TabulatedIntegrals> {
        self.tables
            .get(&(kind1.to_owned(), kind2.to_owned()))
            .cloned()
            .ok_or_else(|| {
                SlakoError::config(format!("no Slater-Koster table for {}-{}", kind1, kind2))
            })
    }

    fn species(&self, symbol: &str) -> Result<SpeciesParameters> {
        self.species
            .get(symbol)
            .cloned()
            .ok_or_else(|| SlakoError::config(format!("no parameters for species {}", symbol)))
    }
}
