//! Engine configuration.
//!
//! Configuration is usually read from a `horizon-splice.toml` file:
//!
//! ```toml
//! kind = "mixin"
//! search_paths = ["styles/global", "vendor/mixins"]
//! explicit_files = ["mixins/extra.mixin.css"]
//! export_artifact_to = "dist/variables.css"
//! silent = false
//! parent_file = "src/app.css"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::kind::InvocationKind;
use crate::module_path::absolutize;
use crate::{Error, Result};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "horizon-splice.toml";

/// Options recognized by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpliceConfig {
    /// Invocation kind to expand.
    pub kind: InvocationKind,
    /// Directories scanned (non-recursively) for global definitions.
    #[serde(deserialize_with = "one_or_many")]
    pub search_paths: Vec<PathBuf>,
    /// Additional global definition files.
    pub explicit_files: Vec<PathBuf>,
    /// Output path for the variables artifact.
    pub export_artifact_to: Option<PathBuf>,
    /// Drop undefined invocations instead of failing.
    pub silent: bool,
    /// Parent recorded for the first dependency edge.
    pub parent_file: Option<PathBuf>,
    /// Working root. Relative paths resolve against it and local
    /// definitions are scanned under it.
    pub root: Option<PathBuf>,
    /// Where bundled modules are written, if anywhere.
    pub cache_dir: Option<PathBuf>,
    /// Write `types/typedefs.js` into each search directory.
    pub emit_typedefs: bool,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            kind: InvocationKind::default(),
            search_paths: vec![],
            explicit_files: vec![],
            export_artifact_to: None,
            silent: false,
            parent_file: None,
            root: None,
            cache_dir: None,
            emit_typedefs: true,
        }
    }
}

impl SpliceConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::config(path, e.to_string()))?;
        Self::from_toml(&text).map_err(|e| match e {
            Error::Config { message, .. } => Error::config(path, message),
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config("<inline>", e.to_string()))
    }

    /// Set the invocation kind.
    pub fn with_kind(mut self, kind: InvocationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a global search directory.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Add an explicit global definition file.
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_files.push(path.into());
        self
    }

    /// Export the variables artifact to `path`.
    pub fn with_export_artifact_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_artifact_to = Some(path.into());
        self
    }

    /// Set silent mode.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Set the root parent for dependency edges.
    pub fn with_parent_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.parent_file = Some(path.into());
        self
    }

    /// Set the working root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Write bundled modules under `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Enable or disable typedef output.
    pub fn with_typedefs(mut self, emit: bool) -> Self {
        self.emit_typedefs = emit;
        self
    }

    /// The absolute working root, falling back to the current directory.
    pub fn root_dir(&self) -> PathBuf {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match &self.root {
            Some(root) => absolutize(&cwd, root),
            None => cwd,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}
