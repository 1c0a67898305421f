//! Definition registry.
//!
//! The registry discovers definition files and loads them into a
//! [`ScopeTable`] with two partitions:
//!
//! - **global**: files directly inside the configured search directories
//!   (plus explicit files), addressed by definition name
//! - **local**: every matching file under the working root, addressed by
//!   absolute path and resolved relative to the invoking document
//!
//! Files of one pass are loaded in parallel and merged in path order. Global
//! directories are processed first so that local resolution sees the fully
//! populated global partition.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobMatcher};
use indexmap::IndexMap;
use rayon::prelude::*;
use walkdir::WalkDir;

use horizon_splice_core::logging::targets;

use crate::definition::Definition;
use crate::export::write_typedefs;
use crate::loader::{ModuleLoader, Scope};
use crate::module_path::{absolutize, normalize, resolve_module};
use crate::{Error, Result};

/// Directories never descended into by the local scan.
const SKIP_DIRS: &[&str] = &["node_modules", "target"];

/// Loaded definitions, partitioned by scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    global: IndexMap<String, Arc<Definition>>,
    local: IndexMap<PathBuf, Arc<Definition>>,
    /// Source file to name for the global partition
    global_files: HashMap<PathBuf, String>,
}

impl ScopeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Global definitions by name, in discovery order.
    pub fn global(&self) -> &IndexMap<String, Arc<Definition>> {
        &self.global
    }

    /// Local definitions by absolute path, in discovery order.
    pub fn local(&self) -> &IndexMap<PathBuf, Arc<Definition>> {
        &self.local
    }

    /// Add a global definition. A definition with the same name is replaced.
    pub fn insert_global(&mut self, definition: Arc<Definition>) {
        let name = definition.name.clone();
        let file = definition.source_file.clone();
        if let Some(replaced) = self.global.insert(name.clone(), definition) {
            if replaced.source_file != file
                && self.global_files.get(&replaced.source_file) == Some(&name)
            {
                self.global_files.remove(&replaced.source_file);
            }
        }
        self.global_files.insert(file, name);
    }

    /// Add a local definition keyed by its source file.
    pub fn insert_local(&mut self, definition: Arc<Definition>) {
        self.local.insert(definition.source_file.clone(), definition);
    }

    /// Whether the table holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.local.is_empty()
    }

    /// Look up `name` as invoked from `from_file`.
    ///
    /// The global partition wins; otherwise `name` is resolved as a module
    /// request relative to the invoking file's directory and looked up in the
    /// local partition.
    pub fn lookup(
        &self,
        name: &str,
        from_file: Option<&Path>,
        extensions: &[&str],
    ) -> Option<&Arc<Definition>> {
        if let Some(definition) = self.global.get(name) {
            return Some(definition);
        }
        let dir = from_file.and_then(Path::parent)?;
        let path = resolve_module(dir, name, extensions)?;
        self.local.get(&path)
    }

    /// A definition already loaded from `path` in either partition.
    pub fn loaded(&self, path: &Path) -> Option<&Arc<Definition>> {
        self.local.get(path).or_else(|| {
            let name = self.global_files.get(path)?;
            self.global.get(name).filter(|d| d.source_file == path)
        })
    }

    /// Definitions in dependency recording order: local first, then global.
    pub fn recording_order(&self) -> impl Iterator<Item = &Arc<Definition>> {
        self.local.values().chain(self.global.values())
    }
}

static_assertions::assert_impl_all!(ScopeTable: Send, Sync);

/// Discovers and loads definition files.
#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    /// Loader for the configured kind
    loader: ModuleLoader,
    /// Working root scanned for local definitions
    root: PathBuf,
    /// Directories holding global definitions
    search_paths: Vec<PathBuf>,
    /// Individual global definition files
    explicit_files: Vec<PathBuf>,
    /// Whether typedefs are written after each search directory
    emit_typedefs: bool,
}

impl DefinitionRegistry {
    /// Create a registry scanning `root` for local definitions.
    pub fn new(loader: ModuleLoader, root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            root: root.into(),
            search_paths: vec![],
            explicit_files: vec![],
            emit_typedefs: true,
        }
    }

    /// Set the global search directories.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Set additional global definition files.
    pub fn with_explicit_files(mut self, files: Vec<PathBuf>) -> Self {
        self.explicit_files = files;
        self
    }

    /// Enable or disable typedef output.
    pub fn with_typedefs(mut self, emit: bool) -> Self {
        self.emit_typedefs = emit;
        self
    }

    /// Load every global and local definition into `table`.
    ///
    /// Files already present in `table` are reused, not reloaded. Any load
    /// failure aborts the whole load.
    pub fn load(&self, table: &mut ScopeTable) -> Result<()> {
        let matcher = self.matcher()?;

        for dir in &self.search_paths {
            let dir = absolutize(&self.root, dir);
            let files = scan(&dir, &matcher, Some(1));
            let count = self.load_files(&files, Scope::Global, table)?;
            tracing::debug!(
                target: targets::REGISTRY,
                "Loaded {count} global definitions from {}",
                dir.display()
            );
            if self.emit_typedefs {
                write_typedefs(&dir, table)?;
            }
        }

        let explicit: Vec<PathBuf> = self
            .explicit_files
            .iter()
            .map(|file| absolutize(&self.root, file))
            .collect();
        self.load_files(&explicit, Scope::Global, table)?;

        let local = scan(&self.root, &matcher, None);
        self.load_files(&local, Scope::Local, table)?;

        tracing::info!(
            target: targets::REGISTRY,
            "Loaded {} global and {} local {} definitions",
            table.global.len(),
            table.local.len(),
            self.loader.kind().noun()
        );
        Ok(())
    }

    fn matcher(&self) -> Result<GlobMatcher> {
        let pattern = self.loader.kind().file_pattern();
        Glob::new(pattern)
            .map(|glob| glob.compile_matcher())
            .map_err(|e| Error::config(pattern, e.to_string()))
    }

    fn load_files(&self, files: &[PathBuf], scope: Scope, table: &mut ScopeTable) -> Result<usize> {
        let pending: Vec<&PathBuf> = files.iter().filter(|f| table.loaded(f).is_none()).collect();

        let loaded: Vec<Definition> = pending
            .par_iter()
            .map(|path| self.loader.load(path, scope))
            .collect::<Result<_>>()?;
        let mut fresh: HashMap<&PathBuf, Arc<Definition>> =
            pending.into_iter().zip(loaded.into_iter().map(Arc::new)).collect();

        for file in files {
            let definition = match table.loaded(file) {
                Some(existing) => Arc::clone(existing),
                None => match fresh.remove(&file) {
                    Some(definition) => definition,
                    None => continue,
                },
            };
            match scope {
                Scope::Global => table.insert_global(definition),
                Scope::Local => table.insert_local(definition),
            }
        }
        Ok(files.len())
    }
}

/// Matching files under `dir`, sorted by path. Hidden directories and
/// [`SKIP_DIRS`] are not descended into.
fn scan(dir: &Path, matcher: &GlobMatcher, max_depth: Option<usize>) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if e.depth() > 0 && e.file_type().is_dir() {
                return !name.starts_with('.') && !SKIP_DIRS.contains(&name.as_ref());
            }
            true
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && matcher.is_match(entry.file_name()))
        .map(|entry| normalize(entry.path()))
        .collect();
    files.sort();
    files
}
