use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use het_forge::Template;
use het_forge::io::HeterogenEntry;
use het_forge::templates;

use crate::commands::{build_name_set, run_with_spinner};

/// Filters heterogens, completes their connectivity from templates, and renumbers them.
#[derive(Debug, Args)]
pub struct RenumberArgs {
    /// Serial number assigned to the first written atom.
    #[arg(long = "start-serial", value_name = "N", default_value_t = 1)]
    pub start_serial: usize,
    /// Drop water residues (HOH, WAT).
    #[arg(long)]
    pub skip_water: bool,
    /// Residue names to drop before writing.
    #[arg(long = "exclude", value_name = "RES_NAME")]
    pub exclude: Vec<String>,
    /// Add bonds from the embedded template library.
    #[arg(long)]
    pub templates: bool,
    /// Additional TOML template files; these override embedded templates of the same name.
    #[arg(long = "template", value_name = "FILE")]
    pub template_files: Vec<PathBuf>,
}

/// Applies filters and templates in place; numbering happens when the entries are written.
pub fn run(entries: &mut Vec<HeterogenEntry>, args: &RenumberArgs) -> Result<()> {
    run_with_spinner("Preparing heterogens", || {
        let mut excluded = build_name_set(&args.exclude);
        if args.skip_water {
            excluded.extend(["HOH", "WAT"].map(String::from));
        }
        entries.retain(|entry| !excluded.contains(entry.heterogen.type_name()));

        let library = collect_templates(args)?;

        let mut added = 0;
        for entry in entries.iter_mut() {
            if let Some(template) = library.get(entry.heterogen.type_name()) {
                added += entry.heterogen.apply_template(template).with_context(|| {
                    format!(
                        "Failed to apply template to {} {}",
                        entry.heterogen.type_name(),
                        entry.residue_id
                    )
                })?;
            }
        }

        info!(
            "Added {} template bonds across {} heterogens",
            added,
            entries.len()
        );
        Ok(())
    })
}

fn collect_templates(args: &RenumberArgs) -> Result<HashMap<String, Template>> {
    let mut library = HashMap::new();

    if args.templates {
        for name in templates::names() {
            if let Some(template) = templates::get(name) {
                library.insert(name.to_string(), template.clone());
            }
        }
    }

    for path in &args.template_files {
        let template = templates::load(path)
            .with_context(|| format!("Failed to load template file {}", path.display()))?;
        library.insert(template.name.clone(), template);
    }

    Ok(library)
}
