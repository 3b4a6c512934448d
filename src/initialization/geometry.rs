use crate::error::{Result, SlakoError};
use crate::initialization::symmetry::Container;
use crate::orbital_rotation::OrbitalRotation;
use log::debug;
use nalgebra::{Matrix3, Vector3};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Atomic structure as it is given in the input: the symmetry container and the chemical
/// symbols and positions (in bohr) of the atoms in the unit cell.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Structure {
    #[serde(default)]
    pub container: Container,
    pub atoms: Vec<(String, [f64; 3])>,
}

impl Structure {
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.atoms.iter().map(|(symbol, _)| symbol.as_str()).collect()
    }

    pub fn positions(&self) -> Vec<Vector3<f64>> {
        self.atoms.iter().map(|(_, xyz)| Vector3::from(*xyz)).collect()
    }

    /// Moves the atoms to new positions. The neighbor images have to be rebuilt afterwards.
    pub fn set_positions(&mut self, positions: &[Vector3<f64>]) -> Result<()> {
        if positions.len() != self.atoms.len() {
            return Err(SlakoError::config(format!(
                "got {} positions for {} atoms",
                positions.len(),
                self.atoms.len()
            )));
        }
        for ((_, xyz), new) in self.atoms.iter_mut().zip(positions.iter()) {
            *xyz = [new[0], new[1], new[2]];
        }
        Ok(())
    }
}

/// One symmetry operation n together with its resolved orbital transformation.
#[derive(Clone, Debug)]
pub struct Image {
    pub n: [i32; 3],
    /// Rotational part of the operation
    pub rot: Matrix3<f64>,
    pub rotation: OrbitalRotation,
    /// 9x9 transformation of the s + p + d orbitals under the operation
    pub matrix: Array2<f64>,
}

impl Image {
    pub fn new(container: &Container, n: [i32; 3]) -> Self {
        let rot: Matrix3<f64> = container.rotation(n);
        let rotation: OrbitalRotation = OrbitalRotation::classify(&rot, container.rotation_angles(n));
        Image {
            n,
            rot,
            rotation,
            matrix: rotation.matrix(),
        }
    }
}

/// The periodic images of a structure and the bond vectors R_ijn = T_n(r_j) - r_i from
/// every atom i to the image n of every atom j.
#[derive(Clone, Debug)]
pub struct NeighborImages {
    images: Vec<Image>,
    n_atoms: usize,
    /// bond vectors, index [image * n_atoms^2 + i * n_atoms + j]
    bonds: Vec<Vector3<f64>>,
}

impl NeighborImages {
    /// Builds all images of `structure` that bring at least one atom pair within `cutoff`.
    /// The operation n = (0, 0, 0) is always kept.
    pub fn build(structure: &Structure, cutoff: f64) -> Result<Self> {
        structure.container.validate()?;
        let positions: Vec<Vector3<f64>> = structure.positions();
        let n_atoms: usize = positions.len();
        let mut images: Vec<Image> = Vec::new();
        let mut bonds: Vec<Vector3<f64>> = Vec::new();

        for n in structure.container.ntuples(cutoff, &positions) {
            let transformed: Vec<Vector3<f64>> = positions
                .iter()
                .map(|r| structure.container.transform(r, n))
                .collect();
            let vectors: Vec<Vector3<f64>> = positions
                .iter()
                .flat_map(|ri| transformed.iter().map(move |rj| rj - ri))
                .collect();
            let in_range: bool = vectors.iter().any(|v| v.norm() <= cutoff);
            if n == [0, 0, 0] || in_range {
                images.push(Image::new(&structure.container, n));
                bonds.extend(vectors);
            }
        }
        debug!("{} images within {:.4} bohr", images.len(), cutoff);
        Ok(NeighborImages {
            images,
            n_atoms,
            bonds,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Vector from atom i to the image `image` of atom j.
    pub fn bond(&self, image: usize, i: usize, j: usize) -> Vector3<f64> {
        self.bonds[(image * self.n_atoms + i) * self.n_atoms + j]
    }
}
