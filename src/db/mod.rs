//! Embedded heterogen template library.
//!
//! Templates ship as TOML documents compiled into the binary and are parsed once on first
//! access. The same parser validates user-supplied template files.

mod loader;
mod schema;
mod store;

use crate::model::template::Template;

pub use loader::parse_template;

/// Retrieves an embedded template by residue name.
pub fn get_template(name: &str) -> Option<&'static Template> {
    store::get_store().templates_by_name.get(name)
}

/// Names of all embedded templates, sorted.
pub fn template_names() -> Vec<&'static str> {
    let mut names: Vec<_> = store::get_store()
        .templates_by_name
        .keys()
        .map(String::as_str)
        .collect();
    names.sort_unstable();
    names
}
