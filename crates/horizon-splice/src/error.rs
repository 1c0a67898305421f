//! Error types for the splice engine.

use std::path::PathBuf;

use horizon_splice_core::SourceSpan;

/// Result type alias for splice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading definitions or expanding invocations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document or definition module could not be parsed.
    #[error(transparent)]
    Parse(#[from] horizon_splice_core::Error),

    /// Bundling or executing a definition file failed. Aborts the load phase.
    #[error("Failed to load definition '{path}': {message}")]
    Load { path: PathBuf, message: String },

    /// An invocation names a definition that neither scope provides.
    #[error("{location}: Undefined {kind} {name}")]
    UndefinedDefinition {
        kind: &'static str,
        name: String,
        location: Location,
    },

    /// A resolved definition has a shape the invocation kind cannot expand.
    #[error("{location}: Wrong {name} {kind} type {found}")]
    InvalidDefinitionType {
        kind: &'static str,
        name: String,
        found: &'static str,
        location: Location,
    },

    /// A template parameter received neither an argument nor a default.
    #[error("{location}: Missing argument '{param}' for {name}")]
    MissingArgument {
        name: String,
        param: String,
        location: Location,
    },

    /// Expansion kept producing invocations past the nesting limit.
    #[error("{location}: Expansion of {name} exceeded {limit} nested levels")]
    ExpansionDepthExceeded {
        name: String,
        limit: usize,
        location: Location,
    },

    /// Artifact, cache or typedef write failure.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be read or parsed.
    #[error("Invalid configuration '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl Error {
    /// Create a load error.
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the `silent` option may suppress this error.
    pub fn is_suppressible(&self) -> bool {
        matches!(self, Self::UndefinedDefinition { .. })
    }
}

/// Document location attached to resolution errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(pub Option<SourceSpan>);

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(span) => write!(f, "{span}"),
            None => write!(f, "<unknown>"),
        }
    }
}

impl From<Option<SourceSpan>> for Location {
    fn from(span: Option<SourceSpan>) -> Self {
        Self(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn undefined_definition_message_carries_location() {
        let span = SourceSpan::new(Some(Arc::new(PathBuf::from("/app.css"))), 4, 3);
        let err = Error::UndefinedDefinition {
            kind: "style",
            name: "box".into(),
            location: Some(span).into(),
        };

        assert_eq!(err.to_string(), "/app.css:4:3: Undefined style box");
        assert!(err.is_suppressible());
    }

    #[test]
    fn invalid_type_is_never_suppressible() {
        let err = Error::InvalidDefinitionType {
            kind: "style",
            name: "box".into(),
            found: "template",
            location: Location::default(),
        };

        assert_eq!(err.to_string(), "<unknown>: Wrong box style type template");
        assert!(!err.is_suppressible());
    }
}
