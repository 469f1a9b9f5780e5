//! Lexer module for tokenization

pub mod cursor;
pub mod token;
pub mod xml;

pub use cursor::Cursor;
pub use token::{Token, TokenKind, TokenSource};
pub use xml::XmlLexer;
