//! marktree - Schema-less XML tree parsing, traversal and serialization
//!
//! Documents parse into a plain [`Node`] tree with no schema or struct
//! mapping. Sole text children collapse onto their parent, so simple
//! documents read naturally; mixed content stays ordered as anonymous
//! children.
//!
//! # Quick Start
//!
//! ```
//! use marktree::{from_str, WalkFlow};
//! # fn main() -> Result<(), marktree::Error> {
//! let mut doc = from_str("<kml><Document><name>Region</name></Document></kml>")?;
//! assert_eq!(doc.name.local, "kml");
//!
//! // read-only lookup by path
//! let mut name = String::new();
//! doc.traverse(|path, node| {
//!     if path == "kml/Document/name" {
//!         name = node.text.clone();
//!     }
//!     true
//! });
//! assert_eq!(name, "Region");
//!
//! // in-place rewrite
//! doc.walk(|_, node| {
//!     node.text = node.text.to_uppercase();
//!     WalkFlow::Continue
//! });
//! assert_eq!(
//!     doc.to_xml(false)?,
//!     "<kml><Document><name>REGION</name></Document></kml>"
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::io;

use tracing::debug;

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod charset;
pub use charset::{CharsetStrategy, PermissiveCharset, StrictUtf8};

pub mod lexer;
pub use lexer::{Token, TokenKind, TokenSource, XmlLexer};

pub mod tree;
pub use tree::{Attribute, Node, QName};

pub mod parser;
pub use parser::Parser;

pub mod traverse;

pub mod walk;
pub use walk::{NodeInfo, WalkFlow};

pub mod encode;
pub use encode::XML_DECLARATION;

/// Parse a document from a string
pub fn from_str(s: &str) -> Result<Node> {
    from_bytes(s.as_bytes())
}

/// Parse a document from bytes
pub fn from_bytes(bytes: &[u8]) -> Result<Node> {
    debug!(len = bytes.len(), "parsing document");
    let mut parser = Parser::new(bytes);
    parser.parse()
}

/// Parse a document from bytes with a caller-chosen charset strategy
pub fn from_bytes_with_charset(bytes: &[u8], charset: Box<dyn CharsetStrategy>) -> Result<Node> {
    debug!(len = bytes.len(), "parsing document");
    let mut parser = Parser::with_charset(bytes, charset);
    parser.parse()
}

/// Parse a document from a reader
pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Node> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::with_message(ErrorKind::Io, Span::empty(), e.to_string()))?;
    from_bytes(&bytes)
}
