pub use atom::{build_atoms, n_orbitals, Atom, Orbital};
pub use geometry::{Image, NeighborImages, Structure};
pub use symmetry::Container;

mod atom;
mod geometry;
mod symmetry;
