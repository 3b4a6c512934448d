use thiserror::Error;

/// Errors that can occur while loading the parametrization or assembling the matrices.
/// Atom pairs whose distance lies outside of the tabulated range are not an error, they
/// simply do not contribute.
#[derive(Debug, Error)]
pub enum SlakoError {
    /// Missing, unreadable or inconsistent parameters for a species or a species pair.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Two atoms (or an atom and a periodic image) are closer than the numeric floor.
    #[error("distance between atoms {i} and {j} (image {n:?}) is only {distance:.4} bohr")]
    Geometry {
        i: usize,
        j: usize,
        n: [i32; 3],
        distance: f64,
    },
}

pub type Result<T> = std::result::Result<T, SlakoError>;

impl SlakoError {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        SlakoError::Configuration(msg.into())
    }
}
