use crate::error::{Result, SlakoError};
use rusty_fitpack::{splder_uniform, splev_uniform, splrep};

/// Degree of the splines that `splrep` fits by default
const SPLINE_DEGREE: usize = 3;

/// Checks that a distance grid can be interpolated: enough points for a cubic spline,
/// finite and strictly increasing.
pub fn validate_grid(x: &[f64]) -> Result<()> {
    if x.len() <= SPLINE_DEGREE {
        return Err(SlakoError::config(format!(
            "a cubic spline needs at least {} grid points, got {}",
            SPLINE_DEGREE + 1,
            x.len()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(SlakoError::config("grid contains non-finite values"));
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SlakoError::config("grid is not strictly increasing"));
    }
    Ok(())
}

/// Interpolating cubic B-spline of one tabulated function. Outside of the tabulated range
/// the function and its derivative are zero.
#[derive(Clone, Debug)]
pub struct Spline {
    t: Vec<f64>,
    c: Vec<f64>,
    k: usize,
    x_min: f64,
    x_max: f64,
}

impl Spline {
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        validate_grid(x)?;
        if y.len() != x.len() {
            return Err(SlakoError::config(format!(
                "grid has {} points but the table has {} values",
                x.len(),
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(SlakoError::config("table contains non-finite values"));
        }
        // cubic interpolating spline (default degree, no smoothing)
        let (t, c, k) = splrep(
            x.to_vec(),
            y.to_vec(),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        );
        Ok(Self {
            t,
            c,
            k,
            x_min: x[0],
            x_max: x[x.len() - 1],
        })
    }

    /// First and last grid point.
    pub fn range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    fn contains(&self, x: f64) -> bool {
        self.x_min <= x && x <= self.x_max
    }

    pub fn eval(&self, x: f64) -> f64 {
        if self.contains(x) {
            splev_uniform(&self.t, &self.c, self.k, x)
        } else {
            0.0
        }
    }

    pub fn deriv(&self, x: f64) -> f64 {
        if self.contains(x) {
            splder_uniform(&self.t, &self.c, self.k, x, 1)
        } else {
            0.0
        }
    }
}
