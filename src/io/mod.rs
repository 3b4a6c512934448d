mod imprint;
mod input;
mod output;
pub(crate) mod settings;

pub use imprint::{write_header, write_summary};
pub use input::{kpoints_to_array, read_input, read_kpoints, read_structure};
pub use output::write_matrices;
pub use settings::{Configuration, OutputConfig, SlaterKosterConfig};
