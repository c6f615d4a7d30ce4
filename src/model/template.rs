use super::types::AtomKey;
use std::fmt;

/// Connectivity template for a named heterogen, with bonds addressed by atom key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub description: Option<String>,
    atom_names: Vec<AtomKey>,
    bonds: Vec<(AtomKey, AtomKey)>,
}

impl Template {
    pub fn new<S: Into<String>>(
        name: S,
        atom_names: Vec<AtomKey>,
        bonds: Vec<(AtomKey, AtomKey)>,
    ) -> Self {
        let name = name.into();
        debug_assert!(
            bonds
                .iter()
                .all(|(a1, a2)| atom_names.contains(a1) && atom_names.contains(a2)),
            "Bond in template '{}' refers to an atom name that does not exist in the atom list.",
            name
        );

        Self {
            name,
            description: None,
            atom_names,
            bonds,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn has_bond(&self, name1: &str, name2: &str) -> bool {
        self.bonds
            .iter()
            .any(|(a1, a2)| (a1 == name1 && a2 == name2) || (a1 == name2 && a2 == name1))
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom_names.iter().any(|a| a == name)
    }

    pub fn atom_names(&self) -> &[AtomKey] {
        &self.atom_names
    }

    pub fn bonds(&self) -> &[(AtomKey, AtomKey)] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atom_names.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Template {{ name: \"{}\", atoms: {}, bonds: {} }}",
            self.name,
            self.atom_count(),
            self.bond_count()
        )
    }
}
