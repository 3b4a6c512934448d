use anyhow::{Context, Result};
use chrono::Local;
use clap::{crate_version, App, Arg};
use env_logger::Builder;
use log::info;
use ndarray::prelude::*;
use slako::initialization::{build_atoms, Atom, NeighborImages, Structure};
use slako::io::{
    kpoints_to_array, read_input, read_kpoints, write_header, write_matrices, write_summary,
    Configuration,
};
use slako::param::{ParameterDirectory, SlaterKoster};
use slako::{Matrices, MatrixAssembler, MatrixAssemblerBuilder};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> Result<()> {
    let matches = App::new("slako")
        .version(crate_version!())
        .about("Slater-Koster tight-binding Hamiltonian and overlap matrices")
        .arg(
            Arg::new("structure")
                .help("Sets the structure file (RON) to use")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("kpoints")
                .long("kpoints")
                .short('k')
                .takes_value(true)
                .help("Reads the k-points from a RON file instead of the configuration"),
        )
        .get_matches();

    let geometry_file: &str = matches.value_of("structure").unwrap_or_default();
    let (structure, config): (Structure, Configuration) = read_input(geometry_file)?;

    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, config.log_level())
        .init();

    write_header();
    info!("{: <25} {}", "started at:", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let timer: Instant = Instant::now();

    let kpoints: Array2<f64> = match matches.value_of("kpoints") {
        Some(path) => read_kpoints(Path::new(path))?,
        None => kpoints_to_array(&config.kpoints)?,
    };

    let directory: ParameterDirectory = ParameterDirectory::new(config.parameter_directory());
    let slako: SlaterKoster = SlaterKoster::load(&directory, &structure.symbols())
        .with_context(|| format!("parameters in {}", directory.path().display()))?;

    let mut assembler: MatrixAssembler = MatrixAssemblerBuilder::default()
        .slako(Arc::new(slako))
        .kpoints(kpoints)
        .sepsilon(config.slater_koster.sepsilon)
        .min_distance(config.slater_koster.min_distance)
        .parallel(config.slater_koster.parallel)
        .build()
        .map_err(|err| anyhow::anyhow!("{}", err))?;

    let atoms: Vec<Atom> = build_atoms(&structure, assembler.slako())?;
    let images: NeighborImages = NeighborImages::build(&structure, assembler.get_cutoff())?;
    let matrices: &Matrices = assembler.assemble_default(&atoms, &images)?;

    write_summary(&atoms, &images, matrices);
    if config.output.write_matrices {
        write_matrices(Path::new(&config.output.directory), matrices)?;
    }
    info!("{: <25} {:>8.3} s", "elapsed time:", timer.elapsed().as_secs_f64());
    Ok(())
}
