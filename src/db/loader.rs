use super::schema::HeterogenTemplateFile;
use super::store::DataStore;
use crate::io::Error;
use crate::model::template::Template;
use crate::model::types::AtomKey;
use std::collections::HashMap;

const FORMAT: &str = "TOML";

pub fn load_all_templates() -> DataStore {
    let mut templates_by_name = HashMap::new();

    macro_rules! load_template {
        ($path:literal) => {
            let content = include_str!(concat!("../../templates/", $path));
            let template = parse_template(content)
                .unwrap_or_else(|e| panic!("Failed to parse template file '{}': {}", $path, e));

            let template_name = template.name.clone();
            if templates_by_name
                .insert(template_name.clone(), template)
                .is_some()
            {
                panic!("Duplicate template name found: {}", template_name);
            }
        };
    }

    load_template!("hetero/ACE.toml");
    load_template!("hetero/EDO.toml");
    load_template!("hetero/GOL.toml");
    load_template!("hetero/HOH.toml");
    load_template!("hetero/NME.toml");
    load_template!("hetero/PO4.toml");
    load_template!("hetero/SO4.toml");

    DataStore { templates_by_name }
}

/// Parses and validates a single heterogen template document.
pub fn parse_template(content: &str) -> Result<Template, Error> {
    let schema: HeterogenTemplateFile = toml::from_str(content).map_err(|e| {
        let line = e
            .span()
            .map(|span| content[..span.start].matches('\n').count() + 1)
            .unwrap_or(0);
        Error::parse(FORMAT, line, e.message())
    })?;

    let name = schema.info.name;
    let atoms = schema.topology.atoms;

    for [a1, a2] in &schema.topology.bonds {
        for atom in [a1, a2] {
            if !atoms.contains(atom) {
                return Err(Error::inconsistent_data(
                    FORMAT,
                    format!(
                        "template '{}' bonds atom '{}' which is not listed in its atoms",
                        name, atom
                    ),
                ));
            }
        }
    }

    let bonds = schema
        .topology
        .bonds
        .into_iter()
        .map(|[a1, a2]| (AtomKey::from(a1), AtomKey::from(a2)))
        .collect();
    let atom_names = atoms.into_iter().map(AtomKey::from).collect();

    Ok(Template::new(name, atom_names, bonds).with_description(schema.info.description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_load() {
        let store = load_all_templates();

        assert_eq!(store.templates_by_name.len(), 7);
        let gol = &store.templates_by_name["GOL"];
        assert_eq!(gol.atom_count(), 6);
        assert_eq!(gol.bond_count(), 5);
        assert_eq!(gol.description.as_deref(), Some("Glycerol"));
        assert!(gol.has_bond("C2", "O2"));
    }

    #[test]
    fn parse_template_reads_info_and_topology() {
        let text = r#"
[info]
name = "EDO"

[topology]
atoms = ["C1", "O1", "C2", "O2"]
bonds = [["C1", "O1"], ["C1", "C2"], ["C2", "O2"]]
"#;
        let template = parse_template(text).unwrap();

        assert_eq!(template.name, "EDO");
        assert_eq!(template.atom_count(), 4);
        assert!(template.has_bond("O1", "C1"));
    }

    #[test]
    fn parse_template_rejects_bond_to_unlisted_atom() {
        let text = r#"
[info]
name = "BAD"

[topology]
atoms = ["C1"]
bonds = [["C1", "C2"]]
"#;
        let err = parse_template(text).unwrap_err();

        assert!(matches!(err, Error::InconsistentData { format: "TOML", .. }));
    }

    #[test]
    fn parse_template_reports_syntax_error_line() {
        let text = "[info]\nname = \"X\"\ndescription = @\n";

        let err = parse_template(text).unwrap_err();

        match err {
            Error::Parse { format, line_number, .. } => {
                assert_eq!(format, "TOML");
                assert_eq!(line_number, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
