use crate::initialization::Structure;
use crate::io::Configuration;
use anyhow::{bail, Context, Result};
use ndarray::prelude::*;
use std::fs;
use std::path::Path;

/// Reads the structure file and the configuration. The structure is the only mandatory
/// input, the configuration file is created with the default settings if it is missing.
pub fn read_input(geom_file: &str) -> Result<(Structure, Configuration)> {
    let structure: Structure = read_structure(Path::new(geom_file))?;
    let config: Configuration = Configuration::new()?;
    Ok((structure, config))
}

/// Structure in RON format, e.g.
/// `(container: Bravais(cell: [...], pbc: [true, true, false]), atoms: [("C", (0.0, 0.0, 0.0))])`
pub fn read_structure(path: &Path) -> Result<Structure> {
    let text: String = fs::read_to_string(path)
        .with_context(|| format!("unable to read structure file {}", path.display()))?;
    let structure: Structure = ron::de::from_str(&text)
        .with_context(|| format!("invalid structure file {}", path.display()))?;
    if structure.atoms.is_empty() {
        bail!("the structure file {} contains no atoms", path.display());
    }
    Ok(structure)
}

/// List of k-points in RON format: `[(kx, ky, kz), ...]`.
pub fn read_kpoints(path: &Path) -> Result<Array2<f64>> {
    let text: String = fs::read_to_string(path)
        .with_context(|| format!("unable to read k-point file {}", path.display()))?;
    let kpoints: Vec<[f64; 3]> = ron::de::from_str(&text)
        .with_context(|| format!("invalid k-point file {}", path.display()))?;
    kpoints_to_array(&kpoints)
}

pub fn kpoints_to_array(kpoints: &[[f64; 3]]) -> Result<Array2<f64>> {
    if kpoints.is_empty() {
        bail!("at least one k-point is needed");
    }
    let flat: Vec<f64> = kpoints.iter().flat_map(|k| k.iter().copied()).collect();
    Ok(Array2::from_shape_vec((kpoints.len(), 3), flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::Container;

    #[test]
    fn structure_from_ron() {
        let text: &str = "(container: Wedge(copies: 6, axis: (0.0, 0.0, 1.0)), \
                          atoms: [(\"C\", (2.0, 0.0, 0.0)), (\"H\", (3.0, 0.5, 0.0))])";
        let structure: Structure = ron::de::from_str(text).unwrap();
        assert_eq!(structure.n_atoms(), 2);
        assert_eq!(structure.symbols(), vec!["C", "H"]);
        assert_eq!(
            structure.container,
            Container::Wedge {
                copies: 6,
                axis: [0.0, 0.0, 1.0]
            }
        );
        // without a container the structure is a cluster
        let cluster: Structure = ron::de::from_str("(atoms: [(\"H\", (0.0, 0.0, 0.0))])").unwrap();
        assert_eq!(cluster.container, Container::Cluster);
    }

    #[test]
    fn kpoints_are_rows() {
        let kpts: Array2<f64> = kpoints_to_array(&[[0.0, 0.0, 0.0], [0.5, 0.25, 0.0]]).unwrap();
        assert_eq!(kpts, array![[0.0, 0.0, 0.0], [0.5, 0.25, 0.0]]);
        assert!(kpoints_to_array(&[]).is_err());
    }
}
