use crate::error::{Result, SlakoError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Angular momentum shell of a valence orbital.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shell {
    S,
    P,
    D,
}

impl Shell {
    pub fn l(&self) -> u8 {
        match self {
            Shell::S => 0,
            Shell::P => 1,
            Shell::D => 2,
        }
    }

    /// The real orbitals that belong to this shell, in basis order.
    pub fn orbitals(&self) -> &'static [OrbitalKind] {
        match self {
            Shell::S => &[OrbitalKind::S],
            Shell::P => &[OrbitalKind::Px, OrbitalKind::Py, OrbitalKind::Pz],
            Shell::D => &[
                OrbitalKind::Dxy,
                OrbitalKind::Dyz,
                OrbitalKind::Dzx,
                OrbitalKind::Dx2y2,
                OrbitalKind::D3z2r2,
            ],
        }
    }
}

/// Real orbital types. The discriminant is the position of the orbital in the 9-dimensional
/// s + p + d basis that is used by the rotation and the Slater-Koster transformations:
/// 0 => s  |
/// 1 => px | 2 => py  | 3 => pz  |
/// 4 => dxy | 5 => dyz | 6 => dzx | 7 => dx2-y2 | 8 => d3z2-r2
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrbitalKind {
    S = 0,
    Px = 1,
    Py = 2,
    Pz = 3,
    Dxy = 4,
    Dyz = 5,
    Dzx = 6,
    Dx2y2 = 7,
    D3z2r2 = 8,
}

impl OrbitalKind {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn l(&self) -> u8 {
        match self.index() {
            0 => 0,
            1..=3 => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for OrbitalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label: &str = match self {
            OrbitalKind::S => "s",
            OrbitalKind::Px => "px",
            OrbitalKind::Py => "py",
            OrbitalKind::Pz => "pz",
            OrbitalKind::Dxy => "dxy",
            OrbitalKind::Dyz => "dyz",
            OrbitalKind::Dzx => "dzx",
            OrbitalKind::Dx2y2 => "dx2-y2",
            OrbitalKind::D3z2r2 => "d3z2-r2",
        };
        write!(f, "{}", label)
    }
}

/// Element data as it is stored in the parameter files: the valence shells together with
/// their onsite energies (in Hartree).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SpeciesParameters {
    pub symbol: String,
    pub orbitals: Vec<(Shell, f64)>,
}

/// Validated element data. The valence shells always form the prefix s, sp or spd of the
/// full basis, so that the orbitals of an atom are the first 1, 4 or 9 functions of
/// the s + p + d basis.
#[derive(Clone, Debug)]
pub struct Species {
    pub symbol: String,
    shells: Vec<(Shell, f64)>,
}

impl Species {
    pub fn shells(&self) -> &[(Shell, f64)] {
        &self.shells
    }

    /// Number of basis functions of an atom of this species.
    pub fn n_orbs(&self) -> usize {
        self.shells
            .iter()
            .map(|(shell, _)| shell.orbitals().len())
            .sum()
    }

    /// Orbitals in basis order together with their onsite energies.
    pub fn orbitals(&self) -> Vec<(OrbitalKind, f64)> {
        self.shells
            .iter()
            .flat_map(|(shell, energy)| shell.orbitals().iter().map(move |kind| (*kind, *energy)))
            .collect()
    }
}

impl std::convert::TryFrom<SpeciesParameters> for Species {
    type Error = SlakoError;

    fn try_from(params: SpeciesParameters) -> Result<Self> {
        const ORDER: [Shell; 3] = [Shell::S, Shell::P, Shell::D];
        if params.orbitals.is_empty() {
            return Err(SlakoError::config(format!(
                "species {} has no valence orbitals",
                params.symbol
            )));
        }
        for (pos, (shell, energy)) in params.orbitals.iter().enumerate() {
            if pos >= ORDER.len() || *shell != ORDER[pos] {
                return Err(SlakoError::config(format!(
                    "valence shells of {} must be s, sp or spd in this order, found {:?}",
                    params.symbol,
                    params
                        .orbitals
                        .iter()
                        .map(|(s, _)| *s)
                        .collect::<Vec<Shell>>()
                )));
            }
            if !energy.is_finite() {
                return Err(SlakoError::config(format!(
                    "onsite energy of the {:?} shell of {} is not finite",
                    shell, params.symbol
                )));
            }
        }
        Ok(Species {
            symbol: params.symbol,
            shells: params.orbitals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn orbital_counts_follow_the_shells() {
        let gold = Species::try_from(SpeciesParameters {
            symbol: String::from("Au"),
            orbitals: vec![(Shell::S, -0.2), (Shell::P, 0.1), (Shell::D, -0.4)],
        })
        .unwrap();
        assert_eq!(gold.n_orbs(), 9);
        let orbitals = gold.orbitals();
        assert_eq!(orbitals[0], (OrbitalKind::S, -0.2));
        assert_eq!(orbitals[3], (OrbitalKind::Pz, 0.1));
        assert_eq!(orbitals[8], (OrbitalKind::D3z2r2, -0.4));
        for (pos, (kind, _)) in orbitals.iter().enumerate() {
            assert_eq!(kind.index(), pos);
        }
    }

    #[test]
    fn shells_must_form_a_prefix() {
        let broken = Species::try_from(SpeciesParameters {
            symbol: String::from("X"),
            orbitals: vec![(Shell::S, -0.2), (Shell::D, -0.4)],
        });
        assert!(matches!(broken, Err(SlakoError::Configuration(_))));
        let empty = Species::try_from(SpeciesParameters {
            symbol: String::from("X"),
            orbitals: vec![],
        });
        assert!(empty.is_err());
    }

    #[test]
    fn angular_momenta() {
        assert_eq!(OrbitalKind::S.l(), 0);
        assert_eq!(OrbitalKind::Py.l(), 1);
        assert_eq!(OrbitalKind::Dzx.l(), 2);
        assert_eq!(Shell::D.l(), 2);
    }
}
