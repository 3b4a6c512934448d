//! The canonical two-center integrals. A Slater-Koster table of an ordered species pair
//! (A, B) provides 14 radial functions. The first ten are tabulated with the orbital on B
//! having the larger or equal angular momentum; the last four (ket with lower angular
//! momentum) are taken from the table of the pair (B, A) with a parity factor.
use crate::constants::{N_INTEGRALS, N_TABULATED};
use std::fmt;

pub const DDS: usize = 0;
pub const DDP: usize = 1;
pub const DDD: usize = 2;
pub const PDS: usize = 3;
pub const PDP: usize = 4;
pub const PPS: usize = 5;
pub const PPP: usize = 6;
pub const SDS: usize = 7;
pub const SPS: usize = 8;
pub const SSS: usize = 9;
pub const DPS: usize = 10;
pub const DPP: usize = 11;
pub const DSS: usize = 12;
pub const PSS: usize = 13;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bond {
    Sigma,
    Pi,
    Delta,
}

/// Angular momenta of bra and ket and the bond type of one integral slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegralKind {
    pub l1: u8,
    pub l2: u8,
    pub bond: Bond,
}

const fn kind(l1: u8, l2: u8, bond: Bond) -> IntegralKind {
    IntegralKind { l1, l2, bond }
}

/// Slot index => integral type
pub const INTEGRAL_KINDS: [IntegralKind; N_INTEGRALS] = [
    kind(2, 2, Bond::Sigma),
    kind(2, 2, Bond::Pi),
    kind(2, 2, Bond::Delta),
    kind(1, 2, Bond::Sigma),
    kind(1, 2, Bond::Pi),
    kind(1, 1, Bond::Sigma),
    kind(1, 1, Bond::Pi),
    kind(0, 2, Bond::Sigma),
    kind(0, 1, Bond::Sigma),
    kind(0, 0, Bond::Sigma),
    kind(2, 1, Bond::Sigma),
    kind(2, 1, Bond::Pi),
    kind(2, 0, Bond::Sigma),
    kind(1, 0, Bond::Sigma),
];

/// Slot that is used for an orbital pair whose ket has the lower angular momentum, given the
/// slot of the same pair in the canonical (ket-higher) order. Slots of pairs with equal
/// angular momenta map onto themselves.
pub const KET_LOWER_SLOT: [usize; N_INTEGRALS] = [
    DDS, DDP, DDD, DPS, DPP, PPS, PPP, DSS, PSS, SSS, DPS, DPP, DSS, PSS,
];

impl fmt::Display for IntegralKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = |l: u8| ['s', 'p', 'd'][l as usize];
        let bond: char = match self.bond {
            Bond::Sigma => 's',
            Bond::Pi => 'p',
            Bond::Delta => 'd',
        };
        write!(f, "{}{}{}", label(self.l1), label(self.l2), bond)
    }
}

/// Which tabulated pair provides a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// the table of the pair itself, (A, B)
    Forward,
    /// the table of the swapped pair, (B, A)
    Reverse,
}

/// Origin of one of the 14 integrals: the tabulated column and the parity factor that
/// is applied to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralSource {
    pub direction: Direction,
    pub column: usize,
    pub parity: f64,
}

/// Builds the lookup table slot => (tabulated column, parity). Integrals with the bra having
/// the larger angular momentum are not tabulated for (A, B); they equal the integral with
/// exchanged orbitals from the (B, A) table times (-1)^(l1 + l2).
pub fn integral_sources() -> [IntegralSource; N_INTEGRALS] {
    let mut sources = [IntegralSource {
        direction: Direction::Forward,
        column: 0,
        parity: 1.0,
    }; N_INTEGRALS];
    for (slot, integral) in INTEGRAL_KINDS.iter().enumerate() {
        sources[slot] = if integral.l1 > integral.l2 {
            let swapped: IntegralKind = kind(integral.l2, integral.l1, integral.bond);
            let column: usize = INTEGRAL_KINDS[..N_TABULATED]
                .iter()
                .position(|k| *k == swapped)
                .unwrap_or(slot);
            IntegralSource {
                direction: Direction::Reverse,
                column,
                parity: (-1.0_f64).powi((integral.l1 + integral.l2) as i32),
            }
        } else {
            IntegralSource {
                direction: Direction::Forward,
                column: slot,
                parity: 1.0,
            }
        };
    }
    sources
}
