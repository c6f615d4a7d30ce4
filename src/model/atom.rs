//! Atom record held by a heterogen's registry.
//!
//! An `Atom` carries everything the HETATM record needs besides its name: a positional
//! index, coordinates, occupancy, temperature factor, and element symbol. The name lives
//! alongside the atom as its registry key, so the same record can be renamed or copied
//! between registries without touching bond bookkeeping.

use super::types::Point;
use smol_str::SmolStr;
use std::fmt;

/// Coordinate record with a mutable positional index.
///
/// The index mirrors the addressing scheme of whatever produced the atom (typically the
/// serial number from an input file) and is overwritten whenever the owning heterogen is
/// written. It is never used as identity inside the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Positional index (input serial before writing, output serial after).
    pub index: usize,
    /// Cartesian coordinates measured in ångströms.
    pub pos: Point,
    /// Crystallographic occupancy.
    pub occupancy: f64,
    /// Isotropic temperature (B) factor.
    pub temperature_factor: f64,
    /// Element symbol as written to the output record (e.g., `"FE"`).
    pub element: SmolStr,
}

impl Atom {
    /// Creates an atom with full occupancy and a zero temperature factor.
    ///
    /// # Arguments
    ///
    /// * `index` - Positional index used by [`Heterogen::connect`](crate::Heterogen::connect).
    /// * `element` - Element symbol such as `"C"` or `"FE"`.
    /// * `pos` - Cartesian position in ångströms.
    pub fn new(index: usize, element: &str, pos: Point) -> Self {
        Self {
            index,
            pos,
            occupancy: 1.0,
            temperature_factor: 0.0,
            element: SmolStr::new(element),
        }
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_temperature_factor(mut self, temperature_factor: f64) -> Self {
        self.temperature_factor = temperature_factor;
        self
    }

    /// Euclidean distance to another atom in ångströms.
    pub fn distance(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.pos, &other.pos)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Atom {{ index: {}, element: {}, pos: [{:.3}, {:.3}, {:.3}] }}",
            self.index, self.element, self.pos.x, self.pos.y, self.pos.z
        )
    }
}
