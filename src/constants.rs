pub const SQRT3: f64 = 1.7320508075688772;

// Number of canonical two-center integrals (sigma, pi and delta combinations for s, p and d)
pub const N_INTEGRALS: usize = 14;
// Number of integral columns that are tabulated per ordered species pair
pub const N_TABULATED: usize = 10;
// Size of the s + p + d orbital basis of a single atom
pub const MAX_ORBITALS: usize = 9;

// Tolerance used to classify symmetry operations
pub const ROTATION_TOLERANCE: f64 = 1.0e-12;
// Overlap matrix elements above this magnitude count as occupied in the fill diagnostic
pub const FILL_THRESHOLD: f64 = 1.0e-15;
