//! Artifact export.
//!
//! Global static definitions can publish custom media queries
//! (`"@custom-media --name (...)": true`) and custom properties (a `:root`
//! entry). The exporter collects both from every global definition into one
//! stylesheet so other tooling can consume them:
//!
//! ```text
//! @custom-media --small (max-width: 30em);
//!
//! :root{
//! 	--brand: red;
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use horizon_splice_core::logging::targets;

use crate::docs::join_typedefs;
use crate::registry::ScopeTable;
use crate::value::StyleValue;
use crate::{Error, Result};

const CUSTOM_MEDIA: &str = "@custom-media";
const ROOT_SELECTOR: &str = ":root";

/// Compose the variables artifact from the global partition.
pub fn compose_variables(table: &ScopeTable) -> String {
    let mut custom_media = vec![];
    let mut custom_properties = vec![];

    for definition in table.global().values() {
        let Some(tree) = definition.value.as_static() else {
            continue;
        };
        for (key, value) in tree {
            if key.starts_with(CUSTOM_MEDIA) {
                custom_media.push(format!("{key};"));
            }
            if key == ROOT_SELECTOR {
                if let StyleValue::Tree(properties) = value {
                    for (name, value) in properties {
                        let values = match value {
                            StyleValue::List(items) => items.as_slice(),
                            single => std::slice::from_ref(single),
                        };
                        custom_properties.extend(
                            values
                                .iter()
                                .filter_map(StyleValue::to_css_text)
                                .map(|text| format!("\t{name}: {text};")),
                        );
                    }
                }
            }
        }
    }

    format!(
        "{}\n\n:root{{\n{}\n}}",
        custom_media.join("\n"),
        custom_properties.join("\n")
    )
}

/// Write the variables artifact to `path`, creating parent directories.
pub fn export_variables(table: &ScopeTable, path: &Path) -> Result<()> {
    let content = compose_variables(table);
    write_file(path, &content)?;
    tracing::info!(
        target: targets::EXPORT,
        "Exported variables of {} global definitions to {}",
        table.global().len(),
        path.display()
    );
    Ok(())
}

/// Write the typedefs of every global definition loaded so far to
/// `<search_dir>/types/typedefs.js`. Returns the written path.
pub fn write_typedefs(search_dir: &Path, table: &ScopeTable) -> Result<PathBuf> {
    let target = search_dir.join("types").join("typedefs.js");
    let content = join_typedefs(table.global().values().map(|d| d.doc.as_deref().unwrap_or_default()));
    write_file(&target, &content)?;
    tracing::debug!(target: targets::EXPORT, "Wrote typedefs to {}", target.display());
    Ok(target)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))
}
