//! Definition module loading.
//!
//! The loader turns one definition file into a [`Definition`]: JSON files are
//! read directly, CSS-syntax files are bundled with a [`Bundler`] and their
//! designated export evaluated. Every file touched on the way is recorded as
//! a dependency of the definition.

mod bundle;
mod module;

pub use bundle::{Bundle, Bundler, ImportBundler};
pub use module::{evaluate_json, evaluate_module};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use horizon_splice_core::logging::targets;

use crate::definition::{Definition, DefinitionValue};
use crate::docs::compose_typedef;
use crate::generator::GeneratorTable;
use crate::kind::InvocationKind;
use crate::module_path::{definition_name, normalize};
use crate::value::strip_doc;
use crate::{Error, Result};

/// Which partition of the scope table a definition is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Addressed by name; documented.
    Global,
    /// Addressed by file path.
    Local,
}

/// Loads definition files of one invocation kind.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    /// Kind whose export is read
    kind: InvocationKind,
    /// Generators available to `generator(...)` exports
    generators: GeneratorTable,
    /// Where bundled modules are written, if anywhere
    cache_dir: Option<PathBuf>,
    bundler: Arc<dyn Bundler>,
}

impl ModuleLoader {
    /// Create a loader using the [`ImportBundler`].
    pub fn new(kind: InvocationKind) -> Self {
        Self {
            kind,
            generators: GeneratorTable::new(),
            cache_dir: None,
            bundler: Arc::new(ImportBundler::new(kind.extensions())),
        }
    }

    /// Use `generators` for `generator(...)` exports.
    pub fn with_generators(mut self, generators: GeneratorTable) -> Self {
        self.generators = generators;
        self
    }

    /// Write each bundled module under `dir`.
    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.cache_dir = dir;
        self
    }

    /// Replace the bundler.
    pub fn with_bundler(mut self, bundler: impl Bundler + 'static) -> Self {
        self.bundler = Arc::new(bundler);
        self
    }

    /// The invocation kind this loader reads exports for.
    pub fn kind(&self) -> InvocationKind {
        self.kind
    }

    /// Load one definition file.
    ///
    /// Global definitions get their typedef composed before documentation
    /// keys are stripped from the static tree.
    pub fn load(&self, path: &Path, scope: Scope) -> Result<Definition> {
        let path = normalize(path);
        let name = definition_name(&path);

        let (value, inputs) = if is_json(&path) {
            let text = fs::read_to_string(&path).map_err(|e| Error::load(&path, e.to_string()))?;
            (evaluate_json(&path, &text, self.kind)?, vec![path.clone()])
        } else {
            let bundle = self.bundler.bundle(&path)?;
            self.write_cache(&name, &bundle)?;
            let value = evaluate_module(&path, &bundle.document, self.kind, &self.generators)?;
            (value, bundle.inputs)
        };

        let mut dependencies = vec![path.clone()];
        for input in inputs {
            if !dependencies.contains(&input) {
                dependencies.push(input);
            }
        }

        let mut definition = Definition {
            name,
            value,
            dependencies,
            source_file: path,
            doc: None,
        };

        if scope == Scope::Global {
            definition.doc = Some(compose_typedef(&definition.name, definition.value.as_static()));
        }
        if let DefinitionValue::Static(tree) = &mut definition.value {
            strip_doc(tree);
        }

        tracing::debug!(
            target: targets::LOADER,
            "Loaded {} {} from {} ({}, {} dependencies)",
            self.kind.noun(),
            definition.name,
            definition.source_file.display(),
            definition.value.shape(),
            definition.dependencies.len()
        );

        Ok(definition)
    }

    fn write_cache(&self, name: &str, bundle: &Bundle) -> Result<()> {
        let Some(dir) = &self.cache_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let target = dir.join(format!("{name}.bundle.css"));
        fs::write(&target, bundle.document.to_css()).map_err(|e| Error::io(&target, e))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
