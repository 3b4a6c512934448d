pub mod constants;
pub mod defaults;
pub mod error;
pub mod h0_and_s;
pub mod initialization;
pub mod io;
pub mod orbital_rotation;
pub mod param;
pub mod slako_transformations;
#[cfg(test)]
mod utils;

pub use error::{Result, SlakoError};
pub use h0_and_s::{Matrices, MatrixAssembler, MatrixAssemblerBuilder};
