//! Document model for Horizon Splice.
//!
//! This crate provides the CSS-like document tree that the splice engine
//! rewrites in place:
//!
//! - **Document Tree**: Arena-backed nodes with stable [`NodeId`] handles
//! - **CSS Parsing**: Build a [`Document`] from stylesheet text via `cssparser`
//! - **Serialization**: Render a document back to normalized CSS text
//! - **Source Spans**: Per-node file/line/column for error reporting
//!
//! # Example
//!
//! ```
//! use horizon_splice_core::{parse_css, NodeKind};
//!
//! let doc = parse_css(".card { color: red; }", None)?;
//! let rule = doc.children(doc.root())[0];
//! assert!(matches!(&doc[rule].kind, NodeKind::Rule { selector } if selector == ".card"));
//! assert_eq!(doc.to_css(), ".card {\n  color: red;\n}\n");
//! # Ok::<(), horizon_splice_core::Error>(())
//! ```

pub mod logging;

mod error;
mod node;
mod parser;
mod serializer;
mod source;

pub use error::{Error, Result};
pub use node::{Document, Node, NodeId, NodeKind};
pub use parser::{parse_css, parse_css_file};
pub use serializer::serialize;
pub use source::SourceSpan;
