//! Build-time style and mixin expansion for CSS documents.
//!
//! Horizon Splice replaces invocation at-rules in a stylesheet with nodes
//! produced by external definitions:
//!
//! - **Definitions**: Static style trees, host generators and parameterized
//!   templates, loaded from `*.style.*` / `*.mixin.*` files
//! - **Scopes**: Global definitions by name, local definitions by path
//!   relative to the invoking stylesheet
//! - **Content Slots**: An invocation's own children are substituted into
//!   `@styles-content` / `@mixin-content` markers
//! - **Dependencies**: Every file touched while loading is recorded for
//!   incremental rebuilds
//! - **Artifacts**: Custom media and custom properties of global
//!   definitions exported to one stylesheet, plus editor typedefs
//!
//! # Example
//!
//! ```no_run
//! use horizon_splice::prelude::*;
//!
//! let config = SpliceConfig::load("horizon-splice.toml")?;
//! let mut splicer = Splicer::new(config);
//!
//! let css = std::fs::read_to_string("src/app.css")?;
//! let out = splicer.process(&css, Some(std::path::Path::new("src/app.css")))?;
//! for message in out.messages() {
//!     println!("{} <- {}", message.file, message.parent);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod args;
pub mod config;
pub mod definition;
pub mod docs;
pub mod export;
pub mod generator;
pub mod graph;
pub mod kind;
pub mod loader;
pub mod module_path;
pub mod registry;
pub mod resolve;
pub mod slot;
pub mod splicer;
pub mod value;

mod error;

pub use config::SpliceConfig;
pub use definition::{Definition, DefinitionValue, Template, TemplateParam};
pub use error::{Error, Location, Result};
pub use generator::{Generator, GeneratorTable, InvocationContext};
pub use graph::{DependencyEdge, DependencyGraph, DependencyMessage};
pub use kind::InvocationKind;
pub use registry::{DefinitionRegistry, ScopeTable};
pub use resolve::Resolver;
pub use splicer::{Processed, Splicer};
pub use value::{StyleTree, StyleValue};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::config::SpliceConfig;
    pub use crate::definition::{Definition, DefinitionValue};
    pub use crate::generator::{Generator, GeneratorTable, InvocationContext};
    pub use crate::graph::{DependencyGraph, DependencyMessage};
    pub use crate::kind::InvocationKind;
    pub use crate::loader::{ModuleLoader, Scope};
    pub use crate::registry::{DefinitionRegistry, ScopeTable};
    pub use crate::resolve::Resolver;
    pub use crate::splicer::{Processed, Splicer};
    pub use crate::value::{StyleTree, StyleValue};
    pub use crate::{Error, Result};
}
