use crate::constants::FILL_THRESHOLD;
use crate::defaults;
use crate::error::{Result, SlakoError};
use crate::initialization::{n_orbitals, Atom, NeighborImages};
use crate::param::slako::{SlaterKoster, SlaterKosterTable};
use crate::slako_transformations::{slako_transformations, TwoCenterBlocks};
use derive_builder::*;
use itertools::iproduct;
use log::{debug, info, trace};
use nalgebra::Vector3;
use ndarray::prelude::*;
use num_complex::Complex64;
use rayon::prelude::*;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Hamiltonian and overlap matrices for a set of k-points and their derivatives with respect
/// to the atomic positions.
/// `h`, `s`: [n_k, n_orb, n_orb]
/// `dh`, `ds`: [n_k, n_orb, n_orb, 3], the derivative of the element (a, b) is taken with
/// respect to the position of the atom that carries orbital a.
#[derive(Clone, Debug)]
pub struct Matrices {
    pub h: Array3<Complex64>,
    pub s: Array3<Complex64>,
    pub dh: Array4<Complex64>,
    pub ds: Array4<Complex64>,
}

impl Matrices {
    fn zeros(n_k: usize, n_orbs: usize) -> Self {
        Matrices {
            h: Array3::zeros((n_k, n_orbs, n_orbs)),
            s: Array3::zeros((n_k, n_orbs, n_orbs)),
            dh: Array4::zeros((n_k, n_orbs, n_orbs, 3)),
            ds: Array4::zeros((n_k, n_orbs, n_orbs, 3)),
        }
    }

    pub fn n_kpoints(&self) -> usize {
        self.h.dim().0
    }

    pub fn n_orbs(&self) -> usize {
        self.h.dim().1
    }

    /// Largest deviation max |M(k) - M(k)^†| of H and S from hermiticity.
    pub fn hermiticity_error(&self) -> f64 {
        let deviation = |m: &Array3<Complex64>| -> f64 {
            let mut max: f64 = 0.0;
            for mk in m.outer_iter() {
                for (a, b) in iproduct!(0..mk.nrows(), 0..mk.ncols()) {
                    max = max.max((mk[[a, b]] - mk[[b, a]].conj()).norm());
                }
            }
            max
        };
        deviation(&self.h).max(deviation(&self.s))
    }

    /// Fraction of the overlap matrix elements at the first k-point that are not zero.
    pub fn fill_fraction(&self) -> f64 {
        if self.n_orbs() == 0 || self.n_kpoints() == 0 {
            return 0.0;
        }
        let s0: ArrayView2<Complex64> = self.s.index_axis(Axis(0), 0);
        let filled: usize = s0.iter().filter(|v| v.norm() > FILL_THRESHOLD).count();
        filled as f64 / s0.len() as f64
    }
}

/// Stages of one assembly, they are only used for logging.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    OnsiteFill,
    PairLoop,
    Symmetrize,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name: &str = match self {
            Stage::OnsiteFill => "onsite energies",
            Stage::PairLoop => "atom pairs and images",
            Stage::Symmetrize => "hermitian completion",
            Stage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Contributions of all images of one atom pair (i, j) with i <= j.
struct PairBlock {
    i: usize,
    j: usize,
    /// at least one image lies within the tabulated range
    interacts: bool,
    h: Array3<Complex64>,
    s: Array3<Complex64>,
    dh: Array4<Complex64>,
    ds: Array4<Complex64>,
    /// derivatives of the mirrored block (j, i) with respect to atom j
    dh_mirror: Array4<Complex64>,
    ds_mirror: Array4<Complex64>,
}

/// Builds the Hamiltonian and overlap matrices from the Slater-Koster tables.
///
/// An instance is created with the generated builder:
/// ```ignore
/// let assembler = MatrixAssemblerBuilder::default()
///       .slako(Arc::new(slako))
///       .kpoints(array![[0.0, 0.0, 0.0]]) // optional, Gamma point by default
///       .sepsilon(0.0)                    // optional
///       .build()
///       .unwrap();
/// ```
#[derive(Builder)]
pub struct MatrixAssembler {
    /// Slater-Koster tables of all species pairs
    slako: Arc<SlaterKoster>,
    /// k-points of the matrices that are cached by [MatrixAssembler::assemble_default], each
    /// row is one k-point in units of the phase per lattice translation
    #[builder(default = "Array2::zeros((1, 3))")]
    kpoints: Array2<f64>,
    /// added to the diagonal of the overlap matrix
    #[builder(default = "defaults::SEPSILON")]
    sepsilon: f64,
    /// smallest allowed distance between two atoms
    #[builder(default = "defaults::MIN_DISTANCE")]
    min_distance: f64,
    /// distribute the atom pairs over the rayon thread pool
    #[builder(default = "defaults::PARALLEL_PAIR_LOOP")]
    parallel: bool,
    #[builder(setter(skip))]
    cached: Option<Matrices>,
    #[builder(setter(skip))]
    reported: Arc<AtomicBool>,
}

impl MatrixAssembler {
    /// Maximal interaction range over all species pairs.
    pub fn get_cutoff(&self) -> f64 {
        self.slako.get_cutoff()
    }

    pub fn slako(&self) -> &SlaterKoster {
        &self.slako
    }

    pub fn kpoints(&self) -> ArrayView2<f64> {
        self.kpoints.view()
    }

    /// The matrices of the last call of [MatrixAssembler::assemble_default].
    pub fn cached(&self) -> Option<&Matrices> {
        self.cached.as_ref()
    }

    /// Assembles the matrices for the k-points of the assembler and keeps them. A failed
    /// assembly leaves the previously cached matrices untouched.
    pub fn assemble_default(
        &mut self,
        atoms: &[Atom],
        images: &NeighborImages,
    ) -> Result<&Matrices> {
        let matrices: Matrices = self.assemble(atoms, images, self.kpoints.view())?;
        Ok(self.cached.insert(matrices))
    }

    /// Bloch phases exp(i k n) for every image (rows) and k-point (columns).
    pub fn phases(images: &NeighborImages, kpts: ArrayView2<f64>) -> Array2<Complex64> {
        let mut phases: Array2<Complex64> = Array2::zeros((images.len(), kpts.nrows()));
        for (m, image) in images.images().iter().enumerate() {
            let n: Array1<f64> = image.n.iter().map(|x| *x as f64).collect();
            for (ik, k) in kpts.outer_iter().enumerate() {
                phases[[m, ik]] = Complex64::from_polar(1.0, k.dot(&n));
            }
        }
        phases
    }

    /// Computes H(k), S(k) and their derivatives for the k-points `kpts` ([n_k, 3]). The
    /// result does not depend on any earlier call. Either all matrices are returned or an
    /// error, if two atoms are too close to each other or a table is missing.
    pub fn assemble(
        &self,
        atoms: &[Atom],
        images: &NeighborImages,
        kpts: ArrayView2<f64>,
    ) -> Result<Matrices> {
        if images.n_atoms() != atoms.len() {
            return Err(SlakoError::config(format!(
                "the neighbor images were built for {} atoms, but there are {}",
                images.n_atoms(),
                atoms.len()
            )));
        }
        let n_k: usize = kpts.nrows();
        let n_orbs: usize = n_orbitals(atoms);
        let phases: Array2<Complex64> = Self::phases(images, kpts);

        let pairs: Vec<(usize, usize)> = iproduct!(0..atoms.len(), 0..atoms.len())
            .filter(|(i, j)| i <= j)
            .collect();
        // all tables are looked up before any work is done
        let tables: Vec<&SlaterKosterTable> = pairs
            .iter()
            .map(|(i, j)| self.slako.get(&atoms[*i].symbol, &atoms[*j].symbol))
            .collect::<Result<Vec<&SlaterKosterTable>>>()?;

        let mut matrices: Matrices = Matrices::zeros(n_k, n_orbs);
        log_stage(Stage::OnsiteFill);
        for orbital in atoms.iter().flat_map(|atom| atom.orbitals.iter()) {
            for ik in 0..n_k {
                matrices.h[[ik, orbital.index, orbital.index]] = Complex64::from(orbital.energy);
                matrices.s[[ik, orbital.index, orbital.index]] =
                    Complex64::from(1.0 + self.sepsilon);
            }
        }

        log_stage(Stage::PairLoop);
        let compute = |(pair, table): (&(usize, usize), &&SlaterKosterTable)| {
            self.pair_block(pair.0, pair.1, table, atoms, images, phases.view())
        };
        let blocks: Vec<PairBlock> = if self.parallel {
            pairs
                .par_iter()
                .zip(tables.par_iter())
                .map(compute)
                .collect::<Result<Vec<PairBlock>>>()?
        } else {
            pairs
                .iter()
                .zip(tables.iter())
                .map(compute)
                .collect::<Result<Vec<PairBlock>>>()?
        };

        for block in blocks.iter() {
            let ri: Range<usize> = atoms[block.i].range();
            let rj: Range<usize> = atoms[block.j].range();
            let mut view = matrices.h.slice_mut(s![.., ri.clone(), rj.clone()]);
            view += &block.h;
            let mut view = matrices.s.slice_mut(s![.., ri.clone(), rj.clone()]);
            view += &block.s;
            let mut view = matrices.dh.slice_mut(s![.., ri.clone(), rj.clone(), ..]);
            view += &block.dh;
            let mut view = matrices.ds.slice_mut(s![.., ri.clone(), rj.clone(), ..]);
            view += &block.ds;
            if block.i != block.j {
                let mut view = matrices.dh.slice_mut(s![.., rj.clone(), ri.clone(), ..]);
                view += &block.dh_mirror;
                let mut view = matrices.ds.slice_mut(s![.., rj, ri, ..]);
                view += &block.ds_mirror;
            }
        }

        log_stage(Stage::Symmetrize);
        for block in blocks.iter().filter(|b| b.i != b.j && b.interacts) {
            let ri: Range<usize> = atoms[block.i].range();
            let rj: Range<usize> = atoms[block.j].range();
            for m in [&mut matrices.h, &mut matrices.s].iter_mut() {
                let adjoint: Array3<Complex64> = m
                    .slice(s![.., ri.clone(), rj.clone()])
                    .mapv(|v| v.conj())
                    .permuted_axes([0, 2, 1]);
                m.slice_mut(s![.., rj.clone(), ri.clone()]).assign(&adjoint);
            }
        }

        log_stage(Stage::Done);
        if !self.reported.swap(true, Ordering::Relaxed) {
            info!(
                "Hamiltonian ~{:.2} % filled",
                100.0 * matrices.fill_fraction()
            );
        }
        Ok(matrices)
    }

    /// Sums the contributions of all images of atom j to the block (i, j).
    fn pair_block(
        &self,
        i: usize,
        j: usize,
        table: &SlaterKosterTable,
        atoms: &[Atom],
        images: &NeighborImages,
        phases: ArrayView2<Complex64>,
    ) -> Result<PairBlock> {
        let n_k: usize = phases.ncols();
        let (noi, noj) = (atoms[i].n_orbs(), atoms[j].n_orbs());
        let (r1, r2) = table.get_range();
        let mut block = PairBlock {
            i,
            j,
            interacts: false,
            h: Array3::zeros((n_k, noi, noj)),
            s: Array3::zeros((n_k, noi, noj)),
            dh: Array4::zeros((n_k, noi, noj, 3)),
            ds: Array4::zeros((n_k, noi, noj, 3)),
            dh_mirror: Array4::zeros((n_k, noj, noi, 3)),
            ds_mirror: Array4::zeros((n_k, noj, noi, 3)),
        };

        for (m, image) in images.images().iter().enumerate() {
            if i == j && image.n == [0, 0, 0] {
                continue;
            }
            let bond: Vector3<f64> = images.bond(m, i, j);
            let dist: f64 = bond.norm();
            if dist < self.min_distance {
                return Err(SlakoError::Geometry {
                    i,
                    j,
                    n: image.n,
                    distance: dist,
                });
            }
            if dist < r1 || dist > r2 {
                continue;
            }
            block.interacts = true;
            let (h, dh) = table.h.evaluate(dist);
            let (s, ds) = table.s.evaluate(dist);
            let mut two_center: TwoCenterBlocks = slako_transformations(
                &(bond / dist),
                dist,
                noi,
                noj,
                h.view(),
                s.view(),
                dh.view(),
                ds.view(),
            );
            two_center.rotate(image.matrix.view());
            trace!("pair ({}, {}) image {:?} at {:.4} bohr", i, j, image.n, dist);

            // derivatives with respect to atom j: the image position is R r_j + t
            let (dh_j, ds_j) = if i != j {
                let rot_t = image.rot.transpose();
                let chain = |d: &Array3<f64>| -> Array3<f64> {
                    let mut out: Array3<f64> = Array3::zeros(d.raw_dim());
                    for (a, b) in iproduct!(0..noi, 0..noj) {
                        let g: Vector3<f64> = rot_t * Vector3::new(d[[a, b, 0]], d[[a, b, 1]], d[[a, b, 2]]);
                        for x in 0..3 {
                            out[[a, b, x]] = g[x];
                        }
                    }
                    out
                };
                (chain(&two_center.dh), chain(&two_center.ds))
            } else {
                (Array3::zeros((0, 0, 0)), Array3::zeros((0, 0, 0)))
            };

            for ik in 0..n_k {
                let phase: Complex64 = phases[[m, ik]];
                block
                    .h
                    .index_axis_mut(Axis(0), ik)
                    .zip_mut_with(&two_center.h, |acc, v| *acc += phase * *v);
                block
                    .s
                    .index_axis_mut(Axis(0), ik)
                    .zip_mut_with(&two_center.s, |acc, v| *acc += phase * *v);
                // the bond vector points away from atom i
                block
                    .dh
                    .index_axis_mut(Axis(0), ik)
                    .zip_mut_with(&two_center.dh, |acc, v| *acc -= phase * *v);
                block
                    .ds
                    .index_axis_mut(Axis(0), ik)
                    .zip_mut_with(&two_center.ds, |acc, v| *acc -= phase * *v);
                if i != j {
                    let conj: Complex64 = phase.conj();
                    block
                        .dh_mirror
                        .index_axis_mut(Axis(0), ik)
                        .zip_mut_with(&dh_j.view().permuted_axes([1, 0, 2]), |acc, v| {
                            *acc += conj * *v
                        });
                    block
                        .ds_mirror
                        .index_axis_mut(Axis(0), ik)
                        .zip_mut_with(&ds_j.view().permuted_axes([1, 0, 2]), |acc, v| {
                            *acc += conj * *v
                        });
                }
            }
        }
        Ok(block)
    }
}

fn log_stage(stage: Stage) {
    debug!("{: <25} {}", "assembly stage:", stage);
}
