//! Core data structures describing heterogens.
//!
//! - [`atom`] – Atom record with a mutable positional index.
//! - [`heterogen`] – Keyed atom registry, bond endpoints, bonds, and the `Heterogen` aggregate.
//! - [`template`] – Key-addressed connectivity templates.
//! - [`types`] – Coordinate and key aliases.
//! - [`error`] – Errors raised by model operations.

pub mod atom;
pub mod error;
pub mod heterogen;
pub mod template;
pub mod types;
