//! Module bundling.
//!
//! A CSS-syntax definition module may pull in other modules with top-level
//! `@import "<request>";` rules. Bundling inlines them recursively into a
//! single document and records every file it touched.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use horizon_splice_core::{parse_css_file, Document, NodeKind};

use crate::module_path::{normalize, resolve_module};
use crate::{Error, Result};

/// A bundled module.
#[derive(Debug)]
pub struct Bundle {
    /// Every module's top-level nodes, imports inlined in place
    pub document: Document,
    /// Files read while bundling, entry first
    pub inputs: Vec<PathBuf>,
}

/// Turns an entry file into a self-contained module.
pub trait Bundler: Send + Sync + fmt::Debug {
    /// Bundle `entry` and everything it imports.
    fn bundle(&self, entry: &Path) -> Result<Bundle>;
}

/// Bundler that inlines top-level `@import` rules.
///
/// Each module is inlined at most once, so import cycles are cut at the
/// first repeated file. Imports of `url(...)` are plain CSS and kept as-is.
#[derive(Debug, Clone)]
pub struct ImportBundler {
    extensions: &'static [&'static str],
}

impl ImportBundler {
    /// Create a bundler that tries `extensions` when resolving requests.
    pub fn new(extensions: &'static [&'static str]) -> Self {
        Self { extensions }
    }

    fn inline(&self, path: &Path, bundle: &mut Bundle, seen: &mut HashSet<PathBuf>) -> Result<()> {
        if !seen.insert(path.to_path_buf()) {
            return Ok(());
        }
        bundle.inputs.push(path.to_path_buf());

        let module = parse_css_file(path).map_err(|e| Error::load(path, e.to_string()))?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let target = bundle.document.root();

        for &child in module.children(module.root()) {
            if let Some(request) = import_request(&module, child) {
                let resolved = resolve_module(dir, request, self.extensions)
                    .ok_or_else(|| Error::load(path, format!("Cannot resolve import {request}")))?;
                self.inline(&resolved, bundle, seen)?;
                continue;
            }
            if let Some(copy) = bundle.document.import(&module, child) {
                bundle.document.append(target, copy);
            }
        }
        Ok(())
    }
}

impl Bundler for ImportBundler {
    fn bundle(&self, entry: &Path) -> Result<Bundle> {
        let entry = normalize(entry);
        let mut bundle = Bundle {
            document: Document::with_source_file(&entry),
            inputs: vec![],
        };
        self.inline(&entry, &mut bundle, &mut HashSet::new())?;
        Ok(bundle)
    }
}

fn import_request(module: &Document, id: horizon_splice_core::NodeId) -> Option<&str> {
    match &module[id].kind {
        NodeKind::AtRule {
            name,
            params,
            has_block: false,
        } if name == "import" && !params.starts_with("url(") => Some(params.as_str()),
        _ => None,
    }
}
