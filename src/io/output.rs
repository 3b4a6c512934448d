use crate::h0_and_s::Matrices;
use anyhow::{Context, Result};
use log::info;
use ndarray::{Array, ArrayBase, Data, Dimension};
use ndarray_npy::write_npy;
use num_complex::Complex64;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the real and imaginary parts of a complex array to `<name>_re.npy` and
/// `<name>_im.npy`.
fn write_complex<S, D>(directory: &Path, name: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    let re: Array<f64, D> = array.mapv(|v| v.re);
    let im: Array<f64, D> = array.mapv(|v| v.im);
    for (part, values) in [("re", re), ("im", im)].iter() {
        let path: PathBuf = directory.join(format!("{}_{}.npy", name, part));
        write_npy(&path, values).with_context(|| format!("unable to write {}", path.display()))?;
    }
    Ok(())
}

/// Stores H, S and their derivatives in `directory` as numpy arrays.
pub fn write_matrices(directory: &Path, matrices: &Matrices) -> Result<()> {
    fs::create_dir_all(directory)
        .with_context(|| format!("unable to create directory {}", directory.display()))?;
    write_complex(directory, "h", &matrices.h)?;
    write_complex(directory, "s", &matrices.s)?;
    write_complex(directory, "dh", &matrices.dh)?;
    write_complex(directory, "ds", &matrices.ds)?;
    info!("matrices written to {}", directory.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::prelude::*;
    use ndarray_npy::read_npy;

    #[test]
    fn real_and_imaginary_parts_are_separate_files() {
        let dir = std::env::temp_dir().join(format!("slako-output-{}", std::process::id()));
        let h: Array3<Complex64> = array![[[Complex64::new(1.0, 0.0), Complex64::new(0.5, -0.25)],
            [Complex64::new(0.5, 0.25), Complex64::new(2.0, 0.0)]]];
        fs::create_dir_all(&dir).unwrap();
        write_complex(&dir, "h", &h).unwrap();
        let im: Array3<f64> = read_npy(dir.join("h_im.npy")).unwrap();
        let re: Array3<f64> = read_npy(dir.join("h_re.npy")).unwrap();
        assert_eq!(im, array![[[0.0, -0.25], [0.25, 0.0]]]);
        assert_eq!(re[[0, 1, 1]], 2.0);
        fs::remove_dir_all(&dir).unwrap();
    }
}
