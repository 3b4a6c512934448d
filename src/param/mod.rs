pub mod elements;
pub mod integrals;
pub mod slako;
pub mod spline;
pub mod table_source;

pub use elements::{OrbitalKind, Shell, Species, SpeciesParameters};
pub use slako::{IntegralTable, SlaterKoster, SlaterKosterTable};
pub use table_source::{InMemoryParameters, ParameterDirectory, TableSource, TabulatedIntegrals};
