//! Access to heterogen connectivity templates.
//!
//! The embedded library covers common crystallization additives, buffer ions, and peptide
//! caps. Additional templates can be parsed from TOML text or files with the same schema:
//!
//! ```toml
//! [info]
//! name = "EDO"
//!
//! [topology]
//! atoms = ["C1", "O1", "C2", "O2"]
//! bonds = [["C1", "O1"], ["C1", "C2"], ["C2", "O2"]]
//! ```

use crate::db;
use crate::io::Error;
use crate::model::template::Template;
use std::fs;
use std::path::Path;

/// Looks up an embedded template by residue name (for example `"GOL"` or `"SO4"`).
pub fn get(name: &str) -> Option<&'static Template> {
    db::get_template(name)
}

/// Sorted names of the embedded templates.
pub fn names() -> Vec<&'static str> {
    db::template_names()
}

/// Parses a template from TOML text.
pub fn parse(text: &str) -> Result<Template, Error> {
    db::parse_template(text)
}

/// Reads and parses a template file.
pub fn load(path: &Path) -> Result<Template, Error> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_embedded_templates() {
        let water = get("HOH").expect("water template");

        assert_eq!(water.atom_count(), 3);
        assert!(water.has_bond("H1", "O"));
        assert!(get("XYZ").is_none());
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(
            names(),
            vec!["ACE", "EDO", "GOL", "HOH", "NME", "PO4", "SO4"]
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/het-forge/template.toml")).unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
    }
}
