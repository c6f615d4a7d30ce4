//! # HetForge
//!
//! **HetForge** models heterogens (ligands, cofactors, and modified residues attached to a
//! biomolecular chain) as small graphs of keyed atoms and bonds, and exports them as
//! fixed-column PDB `HETATM`/`CONECT` records. Bonds reference atoms by a stable key, so a
//! heterogen can be copied, swapped, and renumbered for output without any bond drifting to
//! the wrong atom, and several heterogens can be written into one continuous serial space.
//!
//! ## Features
//!
//! - **Keyed atom registry** – Insertion-ordered atoms addressed by name; positional indices are
//!   a transient output concern stamped at write time.
//! - **Deduplicated bonds** – [`Heterogen::connect`] registers bonds from external atom indices;
//!   repeated or reversed requests collapse onto one canonical bond.
//! - **Byte-exact PDB export** – [`Heterogen::write`] emits 78-column HETATM lines and CONECT
//!   lists, returning the next free serial for the following heterogen.
//! - **Templates** – An embedded TOML library of common additives plus user template files fill
//!   in connectivity by atom key.
//!
//! ## Quick Start
//!
//! ```
//! use het_forge::{Atom, Heterogen, Point};
//!
//! let mut heme = Heterogen::new("HEM");
//! heme.add_atom("FE", Atom::new(10, "FE", Point::new(1.0, -2.5, 0.0)));
//! heme.add_atom("N1", Atom::new(11, "N", Point::new(3.0, -2.5, 0.0)));
//!
//! assert!(heme.connect(10, 11));
//! assert!(heme.connect(11, 10));
//! assert_eq!(heme.bond_count(), 1);
//!
//! let mut out = Vec::new();
//! let next = heme.write("HEM", 1, 501, &mut out)?;
//! assert_eq!(next, 503);
//! assert_eq!(heme.atom("FE").map(|a| a.index), Some(501));
//!
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.starts_with("HETATM  501   FE HEM     1       1.000  -2.500   0.000"));
//! assert!(text.ends_with("CONECT 501 502\nCONECT 502 501\n"));
//! # Ok::<(), het_forge::io::Error>(())
//! ```

mod db;
mod model;

pub mod io;
pub mod templates;

pub use model::atom::Atom;
pub use model::heterogen::{AtomEntry, Bond, BondEndpoint, Heterogen};
pub use model::template::Template;
pub use model::types::{AtomKey, Point};

pub use model::error::Error as HeterogenError;
