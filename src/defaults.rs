// config file
pub const CONFIG_FILE_NAME: &str = "slako.toml";
// environment variable that overrides the parameter directory
pub const PARAMETER_DIR_VARIABLE: &str = "SLAKO_PARAMETERS";
pub const PARAMETER_DIRECTORY: &str = "parameters";

pub const VERBOSE: i8 = 0;

// SLATER-KOSTER MATRICES
// added to the diagonal of S to keep the generalized eigenproblem well conditioned
pub const SEPSILON: f64 = 0.0;
// atoms closer than this distance (in bohr) are treated as an unphysical geometry
pub const MIN_DISTANCE: f64 = 0.1;
// the loop over atom pairs is distributed with rayon
pub const PARALLEL_PAIR_LOOP: bool = true;

// OUTPUT
pub const WRITE_MATRICES: bool = false;
pub const OUTPUT_DIRECTORY: &str = "matrices";
