use crate::h0_and_s::Matrices;
use crate::initialization::{n_orbitals, Atom, NeighborImages};
use clap::crate_version;
use log::info;

pub fn write_header() {
    info!("{: ^80}", "-----------------");
    info!("{: ^80}", "SLAKO");
    info!("{: ^80}", "-----------------");
    let mut version_string: String = "version: ".to_owned();
    version_string.push_str(crate_version!());
    info!("{: ^80}", version_string);
    info!("{: ^80}", "");
    info!("{: ^80}", "::::::::::::::::::::::::::::::::::::::::::");
    info!("{: ^80}", "::  Slater-Koster tight-binding matrices  ::");
    info!("{: ^80}", "::::::::::::::::::::::::::::::::::::::::::");
    info!("{: ^80}", "");
}

pub fn write_summary(atoms: &[Atom], images: &NeighborImages, matrices: &Matrices) {
    info!("{:-^80}", " Summary ");
    info!("{: <30} {:>10}", "number of atoms:", atoms.len());
    info!("{: <30} {:>10}", "number of orbitals:", n_orbitals(atoms));
    info!("{: <30} {:>10}", "number of images:", images.len());
    info!("{: <30} {:>10}", "number of k-points:", matrices.n_kpoints());
    info!("{: <30} {:>10.3e}", "hermiticity error:", matrices.hermiticity_error());
    info!("{: <30} {:>10.2} %", "filled elements of S:", 100.0 * matrices.fill_fraction());
    info!("{:-^80}", "");
}
