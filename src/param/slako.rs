use crate::constants::{N_INTEGRALS, N_TABULATED};
use crate::error::{Result, SlakoError};
use crate::param::elements::Species;
use crate::param::integrals::{integral_sources, Direction, IntegralSource};
use crate::param::spline::{validate_grid, Spline};
use crate::param::table_source::{TableSource, TabulatedIntegrals};
use hashbrown::HashMap;
use itertools::iproduct;
use log::{debug, info};
use ndarray::prelude::*;
use std::convert::TryFrom;

/// Spline representation of the 14 canonical two-center integrals (either H0 or overlap)
/// of one ordered species pair, one spline per integral slot.
#[derive(Clone, Debug)]
pub struct IntegralTable {
    splines: Vec<Spline>,
    range: (f64, f64),
}

impl IntegralTable {
    /// Combines the tabulated columns of the pair (A, B) and of the swapped pair (B, A).
    /// `forward` and `reverse` are the rows of the two tables on the common `grid`.
    fn new(
        grid: &[f64],
        forward: &[[f64; N_TABULATED]],
        reverse: &[[f64; N_TABULATED]],
        sources: &[IntegralSource; N_INTEGRALS],
    ) -> Result<Self> {
        validate_grid(grid)?;
        let n: usize = grid.len();
        if forward.len() != n || reverse.len() != n {
            return Err(SlakoError::config(format!(
                "grid has {} points but the tables have {} and {} rows",
                n,
                forward.len(),
                reverse.len()
            )));
        }
        let splines: Vec<Spline> = sources
            .iter()
            .map(|source| {
                let rows: &[[f64; N_TABULATED]] = match source.direction {
                    Direction::Forward => forward,
                    Direction::Reverse => reverse,
                };
                let column: Vec<f64> = rows
                    .iter()
                    .map(|row| source.parity * row[source.column])
                    .collect();
                Spline::new(grid, &column)
            })
            .collect::<Result<Vec<Spline>>>()?;
        Ok(IntegralTable {
            splines,
            range: (grid[0], grid[n - 1]),
        })
    }

    /// Values and radial derivatives of the 14 integrals at the distance `r`. Both are
    /// zero outside of the tabulated range.
    pub fn evaluate(&self, r: f64) -> (Array1<f64>, Array1<f64>) {
        let values: Array1<f64> = self.splines.iter().map(|spline| spline.eval(r)).collect();
        let derivs: Array1<f64> = self.splines.iter().map(|spline| spline.deriv(r)).collect();
        (values, derivs)
    }

    pub fn get_range(&self) -> (f64, f64) {
        self.range
    }
}

/// H0 and overlap integrals of one ordered species pair. The first species carries the bra
/// orbitals.
#[derive(Clone, Debug)]
pub struct SlaterKosterTable {
    pub h: IntegralTable,
    pub s: IntegralTable,
}

impl SlaterKosterTable {
    /// Builds the table of (A, B) from the tabulated integrals of (A, B) and (B, A). Both
    /// must be given on the same grid, since the integrals with the bra having the higher
    /// angular momentum are taken from the (B, A) data.
    pub fn new(forward: &TabulatedIntegrals, reverse: &TabulatedIntegrals) -> Result<Self> {
        let same_grid: bool = forward.grid.len() == reverse.grid.len()
            && forward
                .grid
                .iter()
                .zip(reverse.grid.iter())
                .all(|(a, b)| (a - b).abs() <= 1e-12 * a.abs().max(1.0));
        if !same_grid {
            return Err(SlakoError::config(
                "the distance grids of a species pair and of the swapped pair differ",
            ));
        }
        let sources = integral_sources();
        Ok(SlaterKosterTable {
            h: IntegralTable::new(&forward.grid, &forward.hamiltonian, &reverse.hamiltonian, &sources)?,
            s: IntegralTable::new(&forward.grid, &forward.overlap, &reverse.overlap, &sources)?,
        })
    }

    pub fn get_range(&self) -> (f64, f64) {
        self.h.get_range()
    }
}

/// Type that holds the species data and the mapping between ordered species pairs and
/// their [SlaterKosterTable].
#[derive(Clone, Debug, Default)]
pub struct SlaterKoster {
    map: HashMap<(String, String), SlaterKosterTable>,
    species: HashMap<String, Species>,
}

impl SlaterKoster {
    /// Reads the species data and the tables for every ordered pair of the given species.
    /// Any missing or inconsistent file is a configuration error.
    pub fn load<T: TableSource + ?Sized>(source: &T, symbols: &[&str]) -> Result<Self> {
        let mut unique: Vec<&str> = symbols.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let mut slako = SlaterKoster::default();
        for symbol in unique.iter() {
            let species: Species = Species::try_from(source.species(symbol)?)?;
            debug!("{} with {} orbitals", symbol, species.n_orbs());
            slako.species.insert(symbol.to_string(), species);
        }

        for (kind1, kind2) in iproduct!(unique.iter(), unique.iter()) {
            let forward: TabulatedIntegrals = source.integrals(kind1, kind2)?;
            let table: SlaterKosterTable = if kind1 == kind2 {
                SlaterKosterTable::new(&forward, &forward)
            } else {
                SlaterKosterTable::new(&forward, &source.integrals(kind2, kind1)?)
            }
            .map_err(|err| match err {
                SlakoError::Configuration(msg) => {
                    SlakoError::config(format!("table {}-{}: {}", kind1, kind2, msg))
                }
                other => other,
            })?;
            slako
                .map
                .insert((kind1.to_string(), kind2.to_string()), table);
        }
        slako.greetings();
        Ok(slako)
    }

    /// Table of the ordered pair (`kind1`, `kind2`).
    pub fn get(&self, kind1: &str, kind2: &str) -> Result<&SlaterKosterTable> {
        self.map
            .get(&(kind1.to_owned(), kind2.to_owned()))
            .ok_or_else(|| {
                SlakoError::config(format!("no Slater-Koster table for {}-{}", kind1, kind2))
            })
    }

    pub fn species(&self, symbol: &str) -> Result<&Species> {
        self.species
            .get(symbol)
            .ok_or_else(|| SlakoError::config(format!("no parameters for species {}", symbol)))
    }

    /// Maximal interaction range over all species pairs.
    pub fn get_cutoff(&self) -> f64 {
        self.map
            .values()
            .map(|table| table.get_range().1)
            .fold(0.0, f64::max)
    }

    /// Interaction range of every ordered species pair.
    pub fn cutoffs(&self) -> HashMap<(String, String), f64> {
        self.map
            .iter()
            .map(|(key, table)| (key.clone(), table.get_range().1))
            .collect()
    }

    fn greetings(&self) {
        info!("{:-^80}", " Slater-Koster tables ");
        let mut keys: Vec<&(String, String)> = self.map.keys().collect();
        keys.sort();
        for key in keys {
            let (r_min, r_max) = self.map[key].get_range();
            info!(
                "{: <4}-{: >4}  range: {:>8.4} - {:>8.4} bohr",
                key.0, key.1, r_min, r_max
            );
        }
        info!("{: <25} {:>10.4} bohr", "maximal cutoff:", self.get_cutoff());
        info!("{:-^80}", "");
    }
}
