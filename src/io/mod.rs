//! PDB front-end for heterogens.
//!
//! Readers group HETATM records into [`Heterogen`] values and replay CONECT records through
//! [`Heterogen::connect`]; writers emit fixed-column HETATM and CONECT records while chaining
//! serial numbers across heterogens written into the same file.

mod error;
mod pdb;

use crate::model::heterogen::Heterogen;

pub use pdb::reader::read as read_pdb_heterogens;
pub use pdb::writer::{
    write_heterogen as write_pdb_heterogen, write_heterogens as write_pdb_heterogens,
};

pub use error::Error;

/// A heterogen together with the residue number it occupies in its chain.
#[derive(Debug, Clone, PartialEq)]
pub struct HeterogenEntry {
    pub residue_id: i32,
    pub heterogen: Heterogen,
}

impl HeterogenEntry {
    pub fn new(residue_id: i32, heterogen: Heterogen) -> Self {
        Self {
            residue_id,
            heterogen,
        }
    }
}
