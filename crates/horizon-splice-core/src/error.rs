//! Error types for the document model.

use std::path::PathBuf;

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// CSS parsing error.
    #[error("CSS parse error at {location}{line}:{column}: {message}", location = display_file(.file))]
    Parse {
        message: String,
        file: Option<PathBuf>,
        line: u32,
        column: u32,
    },

    /// File I/O error.
    #[error("Failed to read document '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a parse error.
    pub fn parse(
        message: impl Into<String>,
        file: Option<PathBuf>,
        line: u32,
        column: u32,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            file,
            line,
            column,
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_file(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!("{}:", path.display()),
        None => String::new(),
    }
}
