//! Slater-Koster transformation rules. The matrix element between an orbital of atom i and
//! an orbital of atom j is a linear combination of the radial two-center integrals with
//! coefficients that depend on the direction cosines of the bond i -> j.
use crate::constants::{MAX_ORBITALS, SQRT3};
use crate::param::integrals::*;
use itertools::iproduct;
use nalgebra::Vector3;
use ndarray::prelude::*;
use std::ops::{Add, Mul, Neg, Sub};

/// A polynomial in the direction cosines together with its gradient with respect to the
/// position of atom j. Products and sums follow the usual rules of differentiation, so that
/// every transformation rule yields its derivative along with the value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coefficient {
    pub value: f64,
    pub grad: Vector3<f64>,
}

impl Coefficient {
    pub fn constant(value: f64) -> Self {
        Coefficient {
            value,
            grad: Vector3::zeros(),
        }
    }
}

impl Add for Coefficient {
    type Output = Coefficient;
    fn add(self, other: Coefficient) -> Coefficient {
        Coefficient {
            value: self.value + other.value,
            grad: self.grad + other.grad,
        }
    }
}

impl Sub for Coefficient {
    type Output = Coefficient;
    fn sub(self, other: Coefficient) -> Coefficient {
        Coefficient {
            value: self.value - other.value,
            grad: self.grad - other.grad,
        }
    }
}

impl Mul for Coefficient {
    type Output = Coefficient;
    fn mul(self, other: Coefficient) -> Coefficient {
        Coefficient {
            value: self.value * other.value,
            grad: self.grad * other.value + other.grad * self.value,
        }
    }
}

impl Mul<f64> for Coefficient {
    type Output = Coefficient;
    fn mul(self, factor: f64) -> Coefficient {
        Coefficient {
            value: self.value * factor,
            grad: self.grad * factor,
        }
    }
}

impl Mul<Coefficient> for f64 {
    type Output = Coefficient;
    fn mul(self, coefficient: Coefficient) -> Coefficient {
        coefficient * self
    }
}

impl Add<Coefficient> for f64 {
    type Output = Coefficient;
    fn add(self, coefficient: Coefficient) -> Coefficient {
        Coefficient::constant(self) + coefficient
    }
}

impl Sub<Coefficient> for f64 {
    type Output = Coefficient;
    fn sub(self, coefficient: Coefficient) -> Coefficient {
        Coefficient::constant(self) - coefficient
    }
}

impl Neg for Coefficient {
    type Output = Coefficient;
    fn neg(self) -> Coefficient {
        self * -1.0
    }
}

/// Direction cosines l, m, n of a bond. The gradients are taken with respect to the
/// position of atom j: d l / d r_j = (e_x - l * rhat) / r.
#[derive(Copy, Clone, Debug)]
pub struct Cosines {
    pub l: Coefficient,
    pub m: Coefficient,
    pub n: Coefficient,
}

impl Cosines {
    pub fn new(rhat: &Vector3<f64>, dist: f64) -> Self {
        let cosine = |axis: usize| -> Coefficient {
            let mut unit: Vector3<f64> = Vector3::zeros();
            unit[axis] = 1.0;
            Coefficient {
                value: rhat[axis],
                grad: (unit - rhat * rhat[axis]) / dist,
            }
        };
        Cosines {
            l: cosine(0),
            m: cosine(1),
            n: cosine(2),
        }
    }
}

/// The (at most three) terms integral slot * coefficient of one matrix element.
#[derive(Copy, Clone, Debug)]
pub struct Rule {
    terms: [(usize, Coefficient); 3],
    len: usize,
}

impl Rule {
    fn new(terms: &[(usize, Coefficient)]) -> Self {
        let mut rule = Rule {
            terms: [(SSS, Coefficient::constant(0.0)); 3],
            len: terms.len(),
        };
        rule.terms[..terms.len()].copy_from_slice(terms);
        rule
    }

    pub fn terms(&self) -> &[(usize, Coefficient)] {
        &self.terms[..self.len]
    }

    /// The same coefficients for the exchanged orbital order, with the integral slots that
    /// belong to a ket with lower angular momentum.
    fn ket_lower(mut self) -> Self {
        for (slot, _) in self.terms[..self.len].iter_mut() {
            *slot = KET_LOWER_SLOT[*slot];
        }
        self
    }
}

/// Transformation rule of the orbital pair (a, b) in the s + p + d basis order.
pub fn rule(a: usize, b: usize, c: &Cosines) -> Rule {
    if a <= b {
        upper_rule(a, b, c)
    } else {
        upper_rule(b, a, c).ket_lower()
    }
}

/// Rules of the orbital pairs with a <= b.
fn upper_rule(a: usize, b: usize, c: &Cosines) -> Rule {
    let (l, m, n) = (c.l, c.m, c.n);
    let (ll, mm, nn) = (l * l, m * m, n * n);
    // frequently used combinations of the d orbitals x2-y2 and 3z2-r2
    let q: Coefficient = ll - mm;
    let w: Coefficient = nn - 0.5 * (ll + mm);
    let s3: f64 = SQRT3;

    match (a, b) {
        // s-s
        (0, 0) => Rule::new(&[(SSS, Coefficient::constant(1.0))]),
        // s-p
        (0, 1) => Rule::new(&[(SPS, l)]),
        (0, 2) => Rule::new(&[(SPS, m)]),
        (0, 3) => Rule::new(&[(SPS, n)]),
        // s-d
        (0, 4) => Rule::new(&[(SDS, s3 * l * m)]),
        (0, 5) => Rule::new(&[(SDS, s3 * m * n)]),
        (0, 6) => Rule::new(&[(SDS, s3 * n * l)]),
        (0, 7) => Rule::new(&[(SDS, 0.5 * s3 * q)]),
        (0, 8) => Rule::new(&[(SDS, w)]),
        // p-p
        (1, 1) => Rule::new(&[(PPS, ll), (PPP, 1.0 - ll)]),
        (1, 2) => Rule::new(&[(PPS, l * m), (PPP, -(l * m))]),
        (1, 3) => Rule::new(&[(PPS, l * n), (PPP, -(l * n))]),
        (2, 2) => Rule::new(&[(PPS, mm), (PPP, 1.0 - mm)]),
        (2, 3) => Rule::new(&[(PPS, m * n), (PPP, -(m * n))]),
        (3, 3) => Rule::new(&[(PPS, nn), (PPP, 1.0 - nn)]),
        // px-d
        (1, 4) => Rule::new(&[(PDS, s3 * ll * m), (PDP, m * (1.0 - 2.0 * ll))]),
        (1, 5) => Rule::new(&[(PDS, s3 * l * m * n), (PDP, -2.0 * l * m * n)]),
        (1, 6) => Rule::new(&[(PDS, s3 * ll * n), (PDP, n * (1.0 - 2.0 * ll))]),
        (1, 7) => Rule::new(&[(PDS, 0.5 * s3 * l * q), (PDP, l * (1.0 - q))]),
        (1, 8) => Rule::new(&[(PDS, l * w), (PDP, -s3 * l * nn)]),
        // py-d
        (2, 4) => Rule::new(&[(PDS, s3 * mm * l), (PDP, l * (1.0 - 2.0 * mm))]),
        (2, 5) => Rule::new(&[(PDS, s3 * mm * n), (PDP, n * (1.0 - 2.0 * mm))]),
        (2, 6) => Rule::new(&[(PDS, s3 * m * n * l), (PDP, -2.0 * m * n * l)]),
        (2, 7) => Rule::new(&[(PDS, 0.5 * s3 * m * q), (PDP, -(m * (1.0 + q)))]),
        (2, 8) => Rule::new(&[(PDS, m * w), (PDP, -s3 * m * nn)]),
        // pz-d
        (3, 4) => Rule::new(&[(PDS, s3 * l * m * n), (PDP, -2.0 * m * n * l)]),
        (3, 5) => Rule::new(&[(PDS, s3 * nn * m), (PDP, m * (1.0 - 2.0 * nn))]),
        (3, 6) => Rule::new(&[(PDS, s3 * nn * l), (PDP, l * (1.0 - 2.0 * nn))]),
        (3, 7) => Rule::new(&[(PDS, 0.5 * s3 * n * q), (PDP, -(n * q))]),
        (3, 8) => Rule::new(&[(PDS, n * w), (PDP, s3 * n * (ll + mm))]),
        // d-d
        (4, 4) => Rule::new(&[
            (DDS, 3.0 * ll * mm),
            (DDP, ll + mm - 4.0 * ll * mm),
            (DDD, nn + ll * mm),
        ]),
        (4, 5) => Rule::new(&[
            (DDS, 3.0 * l * mm * n),
            (DDP, l * n * (1.0 - 4.0 * mm)),
            (DDD, l * n * (mm - Coefficient::constant(1.0))),
        ]),
        (4, 6) => Rule::new(&[
            (DDS, 3.0 * ll * m * n),
            (DDP, m * n * (1.0 - 4.0 * ll)),
            (DDD, m * n * (ll - Coefficient::constant(1.0))),
        ]),
        (4, 7) => Rule::new(&[
            (DDS, 1.5 * l * m * q),
            (DDP, -2.0 * l * m * q),
            (DDD, 0.5 * l * m * q),
        ]),
        (4, 8) => Rule::new(&[
            (DDS, s3 * l * m * w),
            (DDP, -2.0 * s3 * l * m * nn),
            (DDD, 0.5 * s3 * l * m * (1.0 + nn)),
        ]),
        (5, 5) => Rule::new(&[
            (DDS, 3.0 * mm * nn),
            (DDP, mm + nn - 4.0 * mm * nn),
            (DDD, ll + mm * nn),
        ]),
        (5, 6) => Rule::new(&[
            (DDS, 3.0 * m * nn * l),
            (DDP, m * l * (1.0 - 4.0 * nn)),
            (DDD, m * l * (nn - Coefficient::constant(1.0))),
        ]),
        (5, 7) => Rule::new(&[
            (DDS, 1.5 * m * n * q),
            (DDP, -(m * n * (1.0 + 2.0 * q))),
            (DDD, m * n * (1.0 + 0.5 * q)),
        ]),
        (5, 8) => Rule::new(&[
            (DDS, s3 * m * n * w),
            (DDP, s3 * m * n * (ll + mm - nn)),
            (DDD, -0.5 * s3 * m * n * (ll + mm)),
        ]),
        (6, 6) => Rule::new(&[
            (DDS, 3.0 * nn * ll),
            (DDP, nn + ll - 4.0 * nn * ll),
            (DDD, mm + nn * ll),
        ]),
        (6, 7) => Rule::new(&[
            (DDS, 1.5 * n * l * q),
            (DDP, n * l * (1.0 - 2.0 * q)),
            (DDD, -(n * l * (1.0 - 0.5 * q))),
        ]),
        (6, 8) => Rule::new(&[
            (DDS, s3 * l * n * w),
            (DDP, s3 * l * n * (ll + mm - nn)),
            (DDD, -0.5 * s3 * l * n * (ll + mm)),
        ]),
        (7, 7) => Rule::new(&[
            (DDS, 0.75 * q * q),
            (DDP, ll + mm - q * q),
            (DDD, nn + 0.25 * q * q),
        ]),
        (7, 8) => Rule::new(&[
            (DDS, 0.5 * s3 * q * w),
            (DDP, s3 * nn * (mm - ll)),
            (DDD, 0.25 * s3 * (1.0 + nn) * q),
        ]),
        (8, 8) => Rule::new(&[
            (DDS, w * w),
            (DDP, 3.0 * nn * (ll + mm)),
            (DDD, 0.75 * (ll + mm) * (ll + mm)),
        ]),
        _ => unreachable!("orbital index out of the s + p + d basis: ({}, {})", a, b),
    }
}

/// Matrix blocks of one bond between an atom with `noi` and an atom with `noj` orbitals.
/// The derivatives (last axis) are taken with respect to the position of atom j.
#[derive(Clone, Debug)]
pub struct TwoCenterBlocks {
    pub h: Array2<f64>,
    pub s: Array2<f64>,
    pub dh: Array3<f64>,
    pub ds: Array3<f64>,
}

/// Applies the Slater-Koster transformation rules to the orbitals of atom i (`noi`) and
/// atom j (`noj`). `rhat` is the unit vector i -> j, `h` and `s` are the 14 radial integrals
/// at the distance `dist` and `dh`, `ds` their radial derivatives.
pub fn slako_transformations(
    rhat: &Vector3<f64>,
    dist: f64,
    noi: usize,
    noj: usize,
    h: ArrayView1<f64>,
    s: ArrayView1<f64>,
    dh: ArrayView1<f64>,
    ds: ArrayView1<f64>,
) -> TwoCenterBlocks {
    assert!(noi <= MAX_ORBITALS && noj <= MAX_ORBITALS);
    let cosines: Cosines = Cosines::new(rhat, dist);
    let mut blocks = TwoCenterBlocks {
        h: Array2::zeros((noi, noj)),
        s: Array2::zeros((noi, noj)),
        dh: Array3::zeros((noi, noj, 3)),
        ds: Array3::zeros((noi, noj, 3)),
    };
    for (a, b) in iproduct!(0..noi, 0..noj) {
        for (slot, coef) in rule(a, b, &cosines).terms() {
            blocks.h[[a, b]] += coef.value * h[*slot];
            blocks.s[[a, b]] += coef.value * s[*slot];
            for x in 0..3 {
                blocks.dh[[a, b, x]] += coef.value * dh[*slot] * rhat[x] + coef.grad[x] * h[*slot];
                blocks.ds[[a, b, x]] += coef.value * ds[*slot] * rhat[x] + coef.grad[x] * s[*slot];
            }
        }
    }
    blocks
}

impl TwoCenterBlocks {
    /// Expresses the blocks in the orbitals of a rotated image of atom j, `rot` is the 9x9
    /// orbital transformation of the image.
    pub fn rotate(&mut self, rot: ArrayView2<f64>) {
        let noj: usize = self.h.ncols();
        let rot: ArrayView2<f64> = rot.slice(s![..noj, ..noj]);
        self.h = self.h.dot(&rot);
        self.s = self.s.dot(&rot);
        for x in 0..3 {
            let dh_x: ArrayView2<f64> = self.dh.slice(s![.., .., x]);
            let dh: Array2<f64> = dh_x.dot(&rot);
            self.dh.slice_mut(s![.., .., x]).assign(&dh);
            let ds_x: ArrayView2<f64> = self.ds.slice(s![.., .., x]);
            let ds: Array2<f64> = ds_x.dot(&rot);
            self.ds.slice_mut(s![.., .., x]).assign(&ds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital_rotation::{rotation_from_angles, OrbitalRotation};
    use crate::utils::numerical::assert_deriv;
    use approx::assert_abs_diff_eq;
    use nalgebra::Matrix3;

    /// Arbitrary but distinct integral values and radial derivatives.
    fn radial() -> (Array1<f64>, Array1<f64>, Array1<f64>, Array1<f64>) {
        let h: Array1<f64> = Array1::linspace(-0.7, 0.6, 14);
        let s: Array1<f64> = Array1::linspace(0.5, -0.4, 14).mapv(|v| v + 0.01);
        let dh: Array1<f64> = Array1::linspace(0.2, -0.3, 14);
        let ds: Array1<f64> = Array1::linspace(-0.1, 0.25, 14);
        (h, s, dh, ds)
    }

    #[test]
    fn bond_along_z_gives_the_unmixed_integrals() {
        let (h, s, dh, ds) = radial();
        let rhat: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);
        let blocks = slako_transformations(&rhat, 2.0, 9, 9, h.view(), s.view(), dh.view(), ds.view());
        let ht = &blocks.h;
        assert_abs_diff_eq!(ht[[0, 0]], h[SSS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[0, 3]], h[SPS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[3, 0]], h[PSS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[0, 1]], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[1, 1]], h[PPP], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[2, 2]], h[PPP], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[3, 3]], h[PPS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[0, 8]], h[SDS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[8, 0]], h[DSS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[3, 8]], h[PDS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[8, 3]], h[DPS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[1, 6]], h[PDP], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[6, 1]], h[DPP], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[8, 8]], h[DDS], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[5, 5]], h[DDP], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[6, 6]], h[DDP], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[4, 4]], h[DDD], epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[7, 7]], h[DDD], epsilon = 1e-14);
        // no mixing between different m
        assert_abs_diff_eq!(ht[[4, 7]], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(ht[[1, 2]], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(blocks.s[[0, 0]], s[SSS], epsilon = 1e-14);
    }

    #[test]
    fn blocks_are_consistent_with_rotated_bonds() {
        // Rotating the bond by R is the same as rotating the orbitals of both atoms:
        // T(R rhat) = D T(rhat) D^T
        let (h, s, dh, ds) = radial();
        let rhat: Vector3<f64> = Vector3::new(0.3, -0.5, 0.7).normalize();
        let rot: Matrix3<f64> = rotation_from_angles(1.1, 0.4, -2.3);
        let d: Array2<f64> = OrbitalRotation::classify(&rot, None).matrix();
        let original = slako_transformations(&rhat, 2.5, 9, 9, h.view(), s.view(), dh.view(), ds.view());
        let rotated = slako_transformations(&(rot * rhat), 2.5, 9, 9, h.view(), s.view(), dh.view(), ds.view());
        let expected: Array2<f64> = d.dot(&original.h).dot(&d.t());
        assert!(rotated.h.abs_diff_eq(&expected, 1e-12));
        let expected: Array2<f64> = d.dot(&original.s).dot(&d.t());
        assert!(rotated.s.abs_diff_eq(&expected, 1e-12));
    }

    #[test]
    fn derivatives_of_the_angular_part() {
        // radial functions h(r) = a + b r, so that the radial derivatives are exact
        let (h0, s0, slope_h, slope_s) = radial();
        for (a, b) in iproduct!(0..9, 0..9) {
            let element = |pos: Array1<f64>, hamiltonian: bool| -> (f64, Array1<f64>) {
                let r: Vector3<f64> = Vector3::new(pos[0], pos[1], pos[2]);
                let dist: f64 = r.norm();
                let h: Array1<f64> = &h0 + &(&slope_h * dist);
                let s: Array1<f64> = &s0 + &(&slope_s * dist);
                let blocks = slako_transformations(&(r / dist), dist, 9, 9, h.view(), s.view(), slope_h.view(), slope_s.view());
                if hamiltonian {
                    (blocks.h[[a, b]], blocks.dh.slice(s![a, b, ..]).to_owned())
                } else {
                    (blocks.s[[a, b]], blocks.ds.slice(s![a, b, ..]).to_owned())
                }
            };
            let origin: Array1<f64> = array![0.9, -1.3, 1.7];
            assert_deriv(|p| element(p, true).0, |p| element(p, true).1, origin.clone(), 0.01, 1e-7);
            assert_deriv(|p| element(p, false).0, |p| element(p, false).1, origin, 0.01, 1e-7);
        }
    }

    #[test]
    fn rotation_acts_on_the_ket_orbitals() {
        let (h, s, dh, ds) = radial();
        let rhat: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);
        let mut blocks = slako_transformations(&rhat, 2.0, 1, 4, h.view(), s.view(), dh.view(), ds.view());
        let before: Array2<f64> = blocks.h.clone();
        // rotation by 90 degree about z, the rotated px is py
        let d: Array2<f64> = OrbitalRotation::AboutZ { cos: 0.0, sin: 1.0 }.matrix();
        blocks.rotate(d.view());
        assert_abs_diff_eq!(blocks.h[[0, 1]], before[[0, 2]], epsilon = 1e-14);
        assert_abs_diff_eq!(blocks.h[[0, 2]], -before[[0, 1]], epsilon = 1e-14);
        assert_eq!(blocks.dh.shape(), &[1, 4, 3]);
    }
}
