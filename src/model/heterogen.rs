//! Heterogen model: an ordered atom registry plus a deduplicated bond set.
//!
//! Heterogens (ligands, cofactors, modified residues) are small graphs. Atoms are stored in
//! insertion order under a textual key, and bonds reference atoms by that key rather than by
//! position. Positional indices on [`Atom`] are transient: they carry the caller's numbering
//! when bonds are registered through [`Heterogen::connect`] and are restamped with output
//! serials by [`Heterogen::write`]. Because bonds never hold positions, cloning, copying, or
//! renumbering a heterogen can never leave a bond pointing into another registry.

use super::atom::Atom;
use super::error::Error;
use super::template::Template;
use super::types::{AtomKey, Point};
use crate::io;
use log::debug;
use smol_str::SmolStr;
use std::fmt;
use std::io::Write;

/// Registry capacity reserved up front; heterogens rarely exceed a few dozen atoms.
const DEFAULT_ATOM_CAPACITY: usize = 20;

/// Registry entry pairing an immutable key with its atom record.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomEntry {
    key: AtomKey,
    /// Atom record; freely mutable, unlike the key.
    pub atom: Atom,
}

impl AtomEntry {
    pub fn key(&self) -> &AtomKey {
        &self.key
    }

    pub fn atom(&self) -> &Atom {
        &self.atom
    }
}

/// Reference to one registry entry of a heterogen, held by key.
///
/// Endpoints are only handed out by [`Heterogen::endpoint`] and [`Heterogen::endpoint_at`],
/// so they always name an atom that was live when the endpoint was created. They are resolved
/// lazily against whichever heterogen the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondEndpoint {
    key: AtomKey,
}

impl BondEndpoint {
    fn new(key: AtomKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &AtomKey {
        &self.key
    }

    /// Looks up the live atom this endpoint names in `heterogen`.
    pub fn resolve<'a>(&self, heterogen: &'a Heterogen) -> Option<&'a Atom> {
        heterogen.atom(&self.key)
    }
}

/// Undirected bond between two atoms of the same heterogen.
///
/// Endpoints are stored in key order so that equality and hashing are independent of the
/// order in which the connection was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    first: BondEndpoint,
    second: BondEndpoint,
}

impl Bond {
    /// Creates a bond while canonicalizing endpoint order by key.
    pub fn new(a: BondEndpoint, b: BondEndpoint) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// Endpoint with the lexicographically smaller key.
    pub fn first(&self) -> &BondEndpoint {
        &self.first
    }

    pub fn second(&self) -> &BondEndpoint {
        &self.second
    }

    pub fn contains(&self, key: &str) -> bool {
        self.first.key == key || self.second.key == key
    }

    /// Returns the key at the opposite end of the bond from `key`, if `key` is an endpoint.
    pub fn partner(&self, key: &str) -> Option<&AtomKey> {
        if self.first.key == key {
            Some(&self.second.key)
        } else if self.second.key == key {
            Some(&self.first.key)
        } else {
            None
        }
    }
}

/// Non-standard chemical group attached to a chain, modeled as keyed atoms and bonds.
#[derive(Debug, Clone, PartialEq)]
pub struct Heterogen {
    type_name: SmolStr,
    chain: char,
    atoms: Vec<AtomEntry>,
    bonds: Vec<Bond>,
}

impl Heterogen {
    /// Creates an empty heterogen of the given type (e.g., `"HEM"`).
    ///
    /// The registry is pre-reserved for a typical heterogen; it grows past that on demand.
    /// The chain identifier starts blank.
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: SmolStr::new(type_name),
            chain: ' ',
            atoms: Vec::with_capacity(DEFAULT_ATOM_CAPACITY),
            bonds: Vec::new(),
        }
    }

    /// Residue/ligand name identifying this heterogen.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn chain(&self) -> char {
        self.chain
    }

    pub fn set_chain(&mut self, chain: char) {
        self.chain = chain;
    }

    /// Appends an atom under `key`, preserving insertion order.
    ///
    /// Keys are assumed unique within the heterogen; duplicates are only caught by a debug
    /// assertion.
    pub fn add_atom(&mut self, key: &str, atom: Atom) {
        debug_assert!(
            self.find(key).is_none(),
            "Attempted to add a duplicate atom key '{}' to heterogen '{}'",
            key,
            self.type_name
        );
        self.atoms.push(AtomEntry {
            key: AtomKey::new(key),
            atom,
        });
    }

    /// Removes the atom stored under `key` along with every bond that references it.
    pub fn remove_atom(&mut self, key: &str) -> Option<Atom> {
        let position = self.find(key)?;
        let entry = self.atoms.remove(position);
        self.bonds.retain(|bond| !bond.contains(key));
        Some(entry.atom)
    }

    /// Registry position of the atom stored under `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.atoms.iter().position(|entry| entry.key == key)
    }

    pub fn atom(&self, key: &str) -> Option<&Atom> {
        self.atoms
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.atom)
    }

    pub fn atom_mut(&mut self, key: &str) -> Option<&mut Atom> {
        self.atoms
            .iter_mut()
            .find(|entry| entry.key == key)
            .map(|entry| &mut entry.atom)
    }

    /// Registry entries in insertion order.
    pub fn entries(&self) -> &[AtomEntry] {
        &self.atoms
    }

    pub fn iter_atoms(&self) -> impl Iterator<Item = (&AtomKey, &Atom)> {
        self.atoms.iter().map(|entry| (&entry.key, &entry.atom))
    }

    pub fn iter_atoms_mut(&mut self) -> impl Iterator<Item = (&AtomKey, &mut Atom)> {
        self.atoms
            .iter_mut()
            .map(|entry| (&entry.key, &mut entry.atom))
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Creates an endpoint for the atom stored under `key`.
    pub fn endpoint(&self, key: &str) -> Option<BondEndpoint> {
        self.find(key).map(|position| self.endpoint_for(position))
    }

    /// Creates an endpoint for the registry entry at `position`.
    pub fn endpoint_at(&self, position: usize) -> Option<BondEndpoint> {
        (position < self.atoms.len()).then(|| self.endpoint_for(position))
    }

    fn endpoint_for(&self, position: usize) -> BondEndpoint {
        BondEndpoint::new(self.atoms[position].key.clone())
    }

    /// Bonds in insertion order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn has_bond(&self, a: &str, b: &str) -> bool {
        self.bonds
            .iter()
            .any(|bond| bond.partner(a).is_some_and(|partner| partner == b))
    }

    /// Keys of atoms bonded to `key`, in bond insertion order.
    pub fn neighbors_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a AtomKey> + 'a {
        self.bonds.iter().filter_map(move |bond| bond.partner(key))
    }

    /// Registers a bond between the atoms whose current positional indices are `a` and `b`.
    ///
    /// Returns `false` when either index does not belong to a current atom; the bond set is
    /// left untouched in that case. Registering an existing bond (in either order) or a bond
    /// from an atom to itself succeeds without changing anything. When several atoms share an
    /// index, the last one in registry order is used.
    pub fn connect(&mut self, a: usize, b: usize) -> bool {
        let (a, b) = if b < a { (b, a) } else { (a, b) };

        let mut found_a = None;
        let mut found_b = None;
        for (position, entry) in self.atoms.iter().enumerate() {
            if entry.atom.index == a {
                found_a = Some(position);
            }
            if entry.atom.index == b {
                found_b = Some(position);
            }
        }

        match (found_a, found_b) {
            (Some(pa), Some(pb)) => {
                self.insert_bond(pa, pb);
                true
            }
            _ => false,
        }
    }

    /// Key-addressed counterpart of [`Heterogen::connect`].
    pub fn connect_keys(&mut self, a: &str, b: &str) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(pa), Some(pb)) => {
                self.insert_bond(pa, pb);
                true
            }
            _ => false,
        }
    }

    /// Inserts a bond between two registry positions unless it already exists.
    ///
    /// Returns whether the bond set grew.
    fn insert_bond(&mut self, pa: usize, pb: usize) -> bool {
        let bond = Bond::new(self.endpoint_for(pa), self.endpoint_for(pb));

        if bond.first == bond.second {
            debug!(
                "Ignoring self-bond on atom '{}' of heterogen '{}'",
                bond.first.key, self.type_name
            );
            return false;
        }
        if self.bonds.contains(&bond) {
            return false;
        }

        self.bonds.push(bond);
        true
    }

    /// Replaces this heterogen with a deep copy of `other`.
    ///
    /// Atoms are copied by value and every bond is rebound by key against the copied
    /// registry. If any source bond names a key missing from the source registry the copy
    /// fails with [`Error::DanglingBond`] and `self` is left unchanged.
    pub fn copy_from(&mut self, other: &Heterogen) -> Result<(), Error> {
        let atoms = other.atoms.clone();

        let mut bonds = Vec::with_capacity(other.bonds.len());
        for bond in &other.bonds {
            let first = rebind(&atoms, &bond.first.key, &other.type_name)?;
            let second = rebind(&atoms, &bond.second.key, &other.type_name)?;
            bonds.push(Bond::new(first, second));
        }

        self.atoms = atoms;
        self.bonds = bonds;
        self.type_name = other.type_name.clone();
        self.chain = other.chain;
        Ok(())
    }

    /// Exchanges the complete state of two heterogens.
    pub fn swap_with(&mut self, other: &mut Heterogen) {
        std::mem::swap(self, other);
    }

    /// Adds every template bond whose two atoms are present in this heterogen.
    ///
    /// Template atoms absent from the registry (e.g., unresolved hydrogens) are skipped.
    ///
    /// # Returns
    ///
    /// Number of bonds that were not already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateMismatch`] when the template is for a different residue name.
    pub fn apply_template(&mut self, template: &Template) -> Result<usize, Error> {
        if template.name != self.type_name.as_str() {
            return Err(Error::template_mismatch(
                template.name.as_str(),
                self.type_name.as_str(),
            ));
        }

        let mut added = 0;
        for (a, b) in template.bonds() {
            match (self.find(a), self.find(b)) {
                (Some(pa), Some(pb)) => {
                    if self.insert_bond(pa, pb) {
                        added += 1;
                    }
                }
                _ => debug!(
                    "Template bond {}-{} skipped: atom missing from heterogen '{}'",
                    a, b, self.type_name
                ),
            }
        }
        Ok(added)
    }

    /// Geometric centre of all atoms, or `None` for an empty heterogen.
    pub fn centroid(&self) -> Option<Point> {
        if self.atoms.is_empty() {
            return None;
        }
        let sum = self
            .atoms
            .iter()
            .fold(nalgebra::Vector3::<f64>::zeros(), |acc, entry| {
                acc + entry.atom.pos.coords
            });
        Some(Point::from(sum / self.atoms.len() as f64))
    }

    /// Writes HETATM and CONECT records, restamping atom indices with output serials.
    ///
    /// Atoms are numbered consecutively from `start_serial` in registry order; CONECT records
    /// use the new serials.
    ///
    /// # Returns
    ///
    /// `start_serial + atom_count()`, the first serial available to the next heterogen.
    ///
    /// # Errors
    ///
    /// Fails before any output or renumbering if a field does not fit its column, and
    /// propagates sink failures.
    pub fn write<W: Write>(
        &mut self,
        residue_name: &str,
        residue_number: i32,
        start_serial: usize,
        writer: &mut W,
    ) -> Result<usize, io::Error> {
        io::write_pdb_heterogen(writer, self, residue_name, residue_number, start_serial)
    }

    /// Diagnostic hook; writes nothing to `out` and only logs a summary.
    pub fn dump<W: Write>(&self, _out: &mut W) {
        debug!("{}", self);
    }
}

fn rebind(atoms: &[AtomEntry], key: &AtomKey, heterogen: &str) -> Result<BondEndpoint, Error> {
    atoms
        .iter()
        .find(|entry| entry.key == *key)
        .map(|entry| BondEndpoint::new(entry.key.clone()))
        .ok_or_else(|| Error::dangling_bond(heterogen, key.as_str()))
}

impl fmt::Display for Heterogen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heterogen {{ type: \"{}\", chain: '{}', atoms: {}, bonds: {} }}",
            self.type_name,
            self.chain,
            self.atom_count(),
            self.bond_count()
        )
    }
}
