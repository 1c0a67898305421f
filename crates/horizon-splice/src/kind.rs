//! The two invocation kinds and the names they reserve.

use serde::Deserialize;

/// Which family of definitions an engine instance expands.
///
/// Each kind reserves exactly one invocation at-rule, one content-slot
/// at-rule, one export name and one file pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationKind {
    /// `@styles name args;` backed by `*.style.{css,json}` files.
    #[default]
    Styles,
    /// `@mixin name(args) { ... }` backed by `*.mixin.{css,json}` files.
    Mixin,
}

impl InvocationKind {
    /// The at-rule name that marks an invocation.
    pub fn at_rule(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Mixin => "mixin",
        }
    }

    /// The at-rule name of the content-slot marker.
    pub fn slot(self) -> &'static str {
        match self {
            Self::Styles => "styles-content",
            Self::Mixin => "mixin-content",
        }
    }

    /// The export a definition module must provide.
    pub fn export_name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Mixin => "default",
        }
    }

    /// Glob pattern matched against file names.
    pub fn file_pattern(self) -> &'static str {
        match self {
            Self::Styles => "*.{style.css,style.json}",
            Self::Mixin => "*.{mixin.css,mixin.json}",
        }
    }

    /// Suffixes tried when resolving an extensionless request.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Styles => &[".style.css", ".style.json", ".css", ".json"],
            Self::Mixin => &[".mixin.css", ".mixin.json", ".css", ".json"],
        }
    }

    /// Whether parameterized templates are a valid definition shape.
    pub fn allows_templates(self) -> bool {
        matches!(self, Self::Mixin)
    }

    /// Human-readable noun used in error messages.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Styles => "style",
            Self::Mixin => "mixin",
        }
    }
}

impl std::str::FromStr for InvocationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "styles" | "style" => Ok(Self::Styles),
            "mixin" | "mixins" => Ok(Self::Mixin),
            other => Err(format!("unknown invocation kind '{other}'")),
        }
    }
}
