use crate::error::{Result, SlakoError};
use crate::orbital_rotation::rotation_from_angles;
use itertools::iproduct;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The symmetry operations that generate the periodic images of the atoms. An image is
/// labeled by an integer triple n, the operation for n = (0, 0, 0) is always the identity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Container {
    /// Finite system without images.
    Cluster,
    /// Translations by the lattice vectors (rows of `cell`, in bohr) along the periodic axes.
    Bravais { cell: [[f64; 3]; 3], pbc: [bool; 3] },
    /// Rotations by 2 pi n / `copies` about `axis` (through the origin).
    Wedge { copies: u32, axis: [f64; 3] },
    /// Screw operation: translation by n * `height` along z together with a rotation by
    /// n * `twist` about z.
    Chiral { height: f64, twist: f64 },
}

impl Default for Container {
    fn default() -> Self {
        Container::Cluster
    }
}

/// Largest distance between two of the given positions.
fn extent(positions: &[Vector3<f64>]) -> f64 {
    iproduct!(positions.iter(), positions.iter())
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max)
}

impl Container {
    pub fn validate(&self) -> Result<()> {
        match self {
            Container::Cluster => Ok(()),
            Container::Bravais { cell, pbc } => {
                let lattice: Matrix3<f64> = Matrix3::from_fn(|a, b| cell[a][b]);
                if pbc.iter().any(|p| *p) && lattice.determinant().abs() < 1e-10 {
                    Err(SlakoError::config("the cell vectors are linearly dependent"))
                } else {
                    Ok(())
                }
            }
            Container::Wedge { copies, axis } => {
                if *copies == 0 {
                    Err(SlakoError::config("a wedge needs at least one copy"))
                } else if Vector3::from(*axis).norm() < 1e-10 {
                    Err(SlakoError::config("the rotation axis of the wedge is zero"))
                } else {
                    Ok(())
                }
            }
            Container::Chiral { height, .. } => {
                if *height <= 0.0 || !height.is_finite() {
                    Err(SlakoError::config("the height of a chiral cell has to be positive"))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Image triples that are needed to find all neighbors within `cutoff`. The set is
    /// symmetric under n -> -n (for wedges modulo the number of copies).
    pub fn ntuples(&self, cutoff: f64, positions: &[Vector3<f64>]) -> Vec<[i32; 3]> {
        match self {
            Container::Cluster => vec![[0, 0, 0]],
            Container::Bravais { cell, pbc } => {
                let lattice: Matrix3<f64> = Matrix3::from_fn(|a, b| cell[a][b]);
                let volume: f64 = lattice.determinant().abs();
                let reach: f64 = cutoff + extent(positions);
                let mut n_max: [i32; 3] = [0; 3];
                for a in 0..3 {
                    if !pbc[a] {
                        continue;
                    }
                    let b: Vector3<f64> = lattice.row((a + 1) % 3).transpose();
                    let c: Vector3<f64> = lattice.row((a + 2) % 3).transpose();
                    // distance between neighboring lattice planes
                    let spacing: f64 = volume / b.cross(&c).norm();
                    n_max[a] = (reach / spacing).ceil() as i32;
                }
                iproduct!(
                    -n_max[0]..=n_max[0],
                    -n_max[1]..=n_max[1],
                    -n_max[2]..=n_max[2]
                )
                .map(|(n1, n2, n3)| [n1, n2, n3])
                .collect()
            }
            Container::Wedge { copies, .. } => {
                let m: i32 = *copies as i32;
                (-((m - 1) / 2)..=(m / 2)).map(|n| [n, 0, 0]).collect()
            }
            Container::Chiral { height, .. } => {
                let z_extent: f64 = iproduct!(positions.iter(), positions.iter())
                    .map(|(a, b)| (a[2] - b[2]).abs())
                    .fold(0.0, f64::max);
                let n_max: i32 = ((cutoff + z_extent) / height).ceil() as i32;
                (-n_max..=n_max).map(|n| [n, 0, 0]).collect()
            }
        }
    }

    /// Rotational part of the operation n.
    pub fn rotation(&self, n: [i32; 3]) -> Matrix3<f64> {
        match self.rotation_angles(n) {
            Some((theta, phi, angle)) => rotation_from_angles(theta, phi, angle),
            None => Matrix3::identity(),
        }
    }

    /// Polar and azimuthal angle of the rotation axis and the rotation angle of the
    /// operation n, if the operation contains a rotation.
    pub fn rotation_angles(&self, n: [i32; 3]) -> Option<(f64, f64, f64)> {
        match self {
            Container::Cluster | Container::Bravais { .. } => None,
            Container::Wedge { copies, axis } => {
                let axis: Vector3<f64> = Vector3::from(*axis).normalize();
                let theta: f64 = axis[2].max(-1.0).min(1.0).acos();
                let phi: f64 = axis[1].atan2(axis[0]);
                Some((theta, phi, 2.0 * PI * n[0] as f64 / *copies as f64))
            }
            Container::Chiral { twist, .. } => Some((0.0, 0.0, n[0] as f64 * twist)),
        }
    }

    /// Position of the image n of a point at `r`.
    pub fn transform(&self, r: &Vector3<f64>, n: [i32; 3]) -> Vector3<f64> {
        match self {
            Container::Cluster => *r,
            Container::Bravais { cell, .. } => {
                let mut image: Vector3<f64> = *r;
                for a in 0..3 {
                    image += Vector3::from(cell[a]) * n[a] as f64;
                }
                image
            }
            Container::Wedge { .. } => self.rotation(n) * r,
            Container::Chiral { height, .. } => {
                self.rotation(n) * r + Vector3::new(0.0, 0.0, n[0] as f64 * height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn wedge_tuples_are_centered() {
        let wedge = Container::Wedge {
            copies: 6,
            axis: [0.0, 0.0, 1.0],
        };
        let n: Vec<i32> = wedge.ntuples(10.0, &[]).iter().map(|t| t[0]).collect();
        assert_eq!(n, vec![-2, -1, 0, 1, 2, 3]);
        let wedge = Container::Wedge {
            copies: 5,
            axis: [1.0, 1.0, 0.0],
        };
        let n: Vec<i32> = wedge.ntuples(10.0, &[]).iter().map(|t| t[0]).collect();
        assert_eq!(n, vec![-2, -1, 0, 1, 2]);
    }

    #[test]
    fn wedge_rotates_about_its_axis() {
        let wedge = Container::Wedge {
            copies: 4,
            axis: [0.0, 0.0, 2.0],
        };
        let image: Vector3<f64> = wedge.transform(&Vector3::new(1.0, 0.0, 0.5), [1, 0, 0]);
        assert_abs_diff_eq!(image[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(image[1], 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(image[2], 0.5, epsilon = 1e-14);
        // points on the axis are invariant
        let tilted = Container::Wedge {
            copies: 3,
            axis: [1.0, -1.0, 0.5],
        };
        let on_axis: Vector3<f64> = Vector3::new(2.0, -2.0, 1.0);
        let image: Vector3<f64> = tilted.transform(&on_axis, [1, 0, 0]);
        assert!((image - on_axis).norm() < 1e-12);
    }

    #[test]
    fn bravais_images_cover_the_cutoff() {
        let container = Container::Bravais {
            cell: [[4.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 10.0]],
            pbc: [true, true, false],
        };
        let positions: Vec<Vector3<f64>> = vec![Vector3::zeros(), Vector3::new(1.0, 1.0, 0.0)];
        let tuples: Vec<[i32; 3]> = container.ntuples(6.0, &positions);
        // reach = 6 + sqrt(2), ceil(reach / 4) = 2 and ceil(reach / 5) = 2
        assert_eq!(tuples.len(), 5 * 5);
        assert!(tuples.iter().all(|n| n[2] == 0));
        assert!(tuples.contains(&[-2, 2, 0]));
        let image: Vector3<f64> = container.transform(&positions[1], [1, -1, 0]);
        assert_abs_diff_eq!(image[0], 5.0, epsilon = 1e-14);
        assert_abs_diff_eq!(image[1], -4.0, epsilon = 1e-14);
    }

    #[test]
    fn chiral_operation_is_a_screw() {
        let chiral = Container::Chiral {
            height: 3.0,
            twist: 0.5 * PI,
        };
        let image: Vector3<f64> = chiral.transform(&Vector3::new(2.0, 0.0, 1.0), [-1, 0, 0]);
        assert_abs_diff_eq!(image[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(image[1], -2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(image[2], -2.0, epsilon = 1e-14);
        assert_eq!(chiral.ntuples(5.0, &[Vector3::zeros()]).len(), 5);
    }

    #[test]
    fn invalid_containers() {
        assert!(Container::Wedge {
            copies: 0,
            axis: [0.0, 0.0, 1.0]
        }
        .validate()
        .is_err());
        assert!(Container::Chiral {
            height: 0.0,
            twist: 0.1
        }
        .validate()
        .is_err());
        assert!(Container::Bravais {
            cell: [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            pbc: [true, false, false]
        }
        .validate()
        .is_err());
    }
}
