//! Transformation of the s, p and d orbitals under a symmetry operation. A rotated orbital
//! b is expanded in the unrotated basis, `D[k, b]` is the coefficient of basis function k.
//! Matrix elements with the orbitals of a rotated image are then obtained as `H' = H · D`.
use crate::constants::{MAX_ORBITALS, ROTATION_TOLERANCE, SQRT3};
use itertools::iproduct;
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use ndarray::prelude::*;

/// The kind of a symmetry operation, resolved once per neighbor image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OrbitalRotation {
    /// No rotation, pure translation.
    Identity,
    /// Rotation about the z-axis by the angle with the given cosine and sine.
    AboutZ { cos: f64, sin: f64 },
    /// Reflection through the xy-plane, z -> -z.
    MirrorXY,
    /// Rotation by `angle` about the axis with polar angle `theta` and azimuth `phi`. An
    /// improper operation is the rotation followed by the inversion.
    General {
        theta: f64,
        phi: f64,
        angle: f64,
        improper: bool,
    },
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < ROTATION_TOLERANCE
}

impl OrbitalRotation {
    /// Determines the kind of the operation `rot`. If the symmetry container knows the
    /// axis and angle of the operation (`angles` = (theta, phi, angle)), they are used for
    /// the general case, otherwise they are extracted from the matrix.
    pub fn classify(rot: &Matrix3<f64>, angles: Option<(f64, f64, f64)>) -> Self {
        let diagonal: Vector3<f64> = rot.diagonal();
        let off_diagonal_zero: bool = (0..3)
            .flat_map(|a| (0..3).map(move |b| (a, b)))
            .filter(|(a, b)| a != b)
            .all(|(a, b)| close(rot[(a, b)], 0.0));
        let det: f64 = rot.determinant();

        if diagonal.iter().all(|d| close(*d, 1.0)) {
            OrbitalRotation::Identity
        } else if close(rot[(2, 2)], 1.0) && det > 0.0 {
            OrbitalRotation::AboutZ {
                cos: rot[(0, 0)],
                sin: rot[(1, 0)],
            }
        } else if close(diagonal[0], 1.0)
            && close(diagonal[1], 1.0)
            && close(diagonal[2], -1.0)
            && off_diagonal_zero
        {
            OrbitalRotation::MirrorXY
        } else {
            let improper: bool = det < 0.0;
            let (theta, phi, angle) = angles.unwrap_or_else(|| {
                let proper: Matrix3<f64> = if improper { -*rot } else { *rot };
                axis_angle(&proper)
            });
            OrbitalRotation::General {
                theta,
                phi,
                angle,
                improper,
            }
        }
    }

    /// The 9x9 transformation matrix of the s + p + d basis.
    pub fn matrix(&self) -> Array2<f64> {
        match *self {
            OrbitalRotation::Identity => Array2::eye(MAX_ORBITALS),
            OrbitalRotation::AboutZ { cos, sin } => about_z(cos, sin),
            OrbitalRotation::MirrorXY => {
                let mut mat: Array2<f64> = Array2::eye(MAX_ORBITALS);
                // pz, dyz and dzx change sign under z -> -z
                for k in [3, 5, 6].iter() {
                    mat[[*k, *k]] = -1.0;
                }
                mat
            }
            OrbitalRotation::General {
                theta,
                phi,
                angle,
                improper,
            } => {
                let rot: Matrix3<f64> = rotation_from_angles(theta, phi, angle);
                representation(&if improper { -rot } else { rot })
            }
        }
    }
}

/// Polar and azimuthal angle of the rotation axis and the rotation angle of a proper
/// rotation matrix.
pub fn axis_angle(rot: &Matrix3<f64>) -> (f64, f64, f64) {
    match Rotation3::from_matrix_unchecked(*rot).axis_angle() {
        Some((axis, angle)) => (axis[2].max(-1.0).min(1.0).acos(), axis[1].atan2(axis[0]), angle),
        None => (0.0, 0.0, 0.0),
    }
}

/// Rotation matrix for a rotation by `angle` about the axis (sin θ cos φ, sin θ sin φ, cos θ).
pub fn rotation_from_angles(theta: f64, phi: f64, angle: f64) -> Matrix3<f64> {
    let axis: Vector3<f64> = Vector3::new(
        theta.sin() * phi.cos(),
        theta.sin() * phi.sin(),
        theta.cos(),
    );
    Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle).into_inner()
}

fn about_z(ca: f64, sa: f64) -> Array2<f64> {
    let c2a: f64 = ca.powi(2) - sa.powi(2);
    let s2a: f64 = 2.0 * sa * ca;
    let mut mat: Array2<f64> = Array2::zeros((MAX_ORBITALS, MAX_ORBITALS));
    mat[[0, 0]] = 1.0;
    // px, py
    mat[[1, 1]] = ca;
    mat[[1, 2]] = -sa;
    mat[[2, 1]] = sa;
    mat[[2, 2]] = ca;
    mat[[3, 3]] = 1.0;
    // dxy, dx2-y2 rotate with the double angle
    mat[[4, 4]] = c2a;
    mat[[7, 4]] = -s2a;
    mat[[4, 7]] = s2a;
    mat[[7, 7]] = c2a;
    // dyz, dzx
    mat[[5, 5]] = ca;
    mat[[6, 5]] = -sa;
    mat[[5, 6]] = sa;
    mat[[6, 6]] = ca;
    mat[[8, 8]] = 1.0;
    mat
}

/// The d orbitals as symmetric traceless quadratic forms r^T Q r, in basis order
/// dxy, dyz, dzx, dx2-y2, d3z2-r2. All forms have the same Frobenius norm of 3/2.
fn d_quadratic_forms() -> [Matrix3<f64>; 5] {
    let h: f64 = 0.5 * SQRT3;
    [
        Matrix3::new(0.0, h, 0.0, h, 0.0, 0.0, 0.0, 0.0, 0.0),
        Matrix3::new(0.0, 0.0, 0.0, 0.0, 0.0, h, 0.0, h, 0.0),
        Matrix3::new(0.0, 0.0, h, 0.0, 0.0, 0.0, h, 0.0, 0.0),
        Matrix3::new(h, 0.0, 0.0, 0.0, -h, 0.0, 0.0, 0.0, 0.0),
        Matrix3::new(-0.5, 0.0, 0.0, 0.0, -0.5, 0.0, 0.0, 0.0, 1.0),
    ]
}

/// Transformation matrix of the s + p + d basis for an arbitrary orthogonal matrix. The
/// p orbitals transform like the coordinates, a rotated d orbital is the quadratic form
/// R Q R^T, which is projected onto the basis forms.
fn representation(rot: &Matrix3<f64>) -> Array2<f64> {
    let mut mat: Array2<f64> = Array2::zeros((MAX_ORBITALS, MAX_ORBITALS));
    mat[[0, 0]] = 1.0;
    for (k, b) in iproduct!(0..3, 0..3) {
        mat[[1 + k, 1 + b]] = rot[(k, b)];
    }
    let forms: [Matrix3<f64>; 5] = d_quadratic_forms();
    for (b, q_b) in forms.iter().enumerate() {
        let rotated: Matrix3<f64> = rot * q_b * rot.transpose();
        for (k, q_k) in forms.iter().enumerate() {
            mat[[4 + k, 4 + b]] = q_k.component_mul(&rotated).sum() / 1.5;
        }
    }
    mat
}
