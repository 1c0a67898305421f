//! Source locations attached to document nodes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a node came from.
///
/// Lines and columns are 1-indexed. The file is shared between every node
/// parsed from the same input, so cloning a span is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    /// The input file, if the document was parsed from one.
    pub file: Option<Arc<PathBuf>>,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl SourceSpan {
    /// Create a span.
    pub fn new(file: Option<Arc<PathBuf>>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// The input file as a path.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref().map(PathBuf::as_path)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file.display(), self.line, self.column),
            None => write!(f, "<input>:{}:{}", self.line, self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_file() {
        let span = SourceSpan::new(Some(Arc::new(PathBuf::from("/src/app.css"))), 3, 7);
        assert_eq!(span.to_string(), "/src/app.css:3:7");

        let span = SourceSpan::new(None, 1, 1);
        assert_eq!(span.to_string(), "<input>:1:1");
    }
}
