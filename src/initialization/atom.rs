use crate::error::Result;
use crate::initialization::geometry::Structure;
use crate::param::elements::{OrbitalKind, Species};
use crate::param::slako::SlaterKoster;

/// A valence orbital of an atom: its type, the position in the global basis and the onsite
/// energy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orbital {
    pub kind: OrbitalKind,
    pub index: usize,
    pub energy: f64,
}

/// `Atom` type that holds the species and the valence orbitals. The orbitals of one atom
/// occupy a contiguous range of the global basis that starts at `offset`.
#[derive(Clone, Debug)]
pub struct Atom {
    /// Chemical symbol, the key of the species data and the Slater-Koster tables
    pub symbol: String,
    /// Valence orbitals in the order s, px, py, pz, dxy, dyz, dzx, dx2-y2, d3z2-r2
    pub orbitals: Vec<Orbital>,
    /// Index of the first orbital in the global basis
    pub offset: usize,
}

impl Atom {
    pub fn new(species: &Species, offset: usize) -> Self {
        let orbitals: Vec<Orbital> = species
            .orbitals()
            .into_iter()
            .enumerate()
            .map(|(i, (kind, energy))| Orbital {
                kind,
                index: offset + i,
                energy,
            })
            .collect();
        Atom {
            symbol: species.symbol.clone(),
            orbitals,
            offset,
        }
    }

    /// Number of valence orbitals. This is the length of `orbitals`.
    pub fn n_orbs(&self) -> usize {
        self.orbitals.len()
    }

    /// Global basis indices of the orbitals.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..(self.offset + self.n_orbs())
    }
}

/// Creates the atoms of a structure with consecutive global basis offsets in atom order.
pub fn build_atoms(structure: &Structure, slako: &SlaterKoster) -> Result<Vec<Atom>> {
    let mut offset: usize = 0;
    let mut atoms: Vec<Atom> = Vec::with_capacity(structure.atoms.len());
    for (symbol, _) in structure.atoms.iter() {
        let atom = Atom::new(slako.species(symbol)?, offset);
        offset += atom.n_orbs();
        atoms.push(atom);
    }
    Ok(atoms)
}

/// Total number of orbitals.
pub fn n_orbitals(atoms: &[Atom]) -> usize {
    atoms.iter().map(|atom| atom.n_orbs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::symmetry::Container;
    use crate::utils::tests::test_parameters;

    #[test]
    fn offsets_are_consecutive() {
        let slako = SlaterKoster::load(&test_parameters(), &["H", "C", "Au"]).unwrap();
        let structure = Structure {
            container: Container::Cluster,
            atoms: vec![
                (String::from("C"), [0.0, 0.0, 0.0]),
                (String::from("H"), [2.0, 0.0, 0.0]),
                (String::from("Au"), [0.0, 3.0, 0.0]),
            ],
        };
        let atoms: Vec<Atom> = build_atoms(&structure, &slako).unwrap();
        assert_eq!(atoms.iter().map(|a| a.offset).collect::<Vec<usize>>(), vec![0, 4, 5]);
        assert_eq!(n_orbitals(&atoms), 14);
        assert_eq!(atoms[2].range(), 5..14);
        assert_eq!(atoms[2].orbitals[4].kind, OrbitalKind::Dxy);
        assert_eq!(atoms[2].orbitals[4].index, 9);
        assert_eq!(atoms[0].orbitals[1].energy, -0.194);
    }

    #[test]
    fn unknown_species_is_a_configuration_error() {
        let slako = SlaterKoster::load(&test_parameters(), &["H"]).unwrap();
        let structure = Structure {
            container: Container::Cluster,
            atoms: vec![(String::from("C"), [0.0, 0.0, 0.0])],
        };
        assert!(build_atoms(&structure, &slako).is_err());
    }
}
