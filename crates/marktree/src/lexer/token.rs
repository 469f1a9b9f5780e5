//! Lexical events and the source trait driving the builder

use crate::error::{Result, Span};
use crate::tree::{Attribute, QName};

/// One lexical event from the document
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Opening tag with its attributes in source order
    StartTag {
        name: QName,
        attributes: Vec<Attribute>,
    },
    /// Closing tag
    EndTag { name: QName },
    /// Run of character data, entities already decoded
    Text(String),
    /// Comment body without the `<!--` `-->` markers
    Comment(String),
    /// Processing instruction, target and everything after it
    ProcessingInstruction { target: String, data: String },
    /// Directive body without the `<!` `>` markers
    Directive(String),
    /// End of input
    Eof,
}

/// Token with its source span
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Pull-based source of lexical events
///
/// The builder consumes any implementation of this trait, so trees can be
/// assembled from sources other than the built-in lexer.
pub trait TokenSource {
    /// Produce the next event; [`TokenKind::Eof`] signals exhaustion
    fn next_token(&mut self) -> Result<Token>;

    /// Switch charset conversion for the rest of the stream
    ///
    /// Called by the builder when the document declaration names an encoding.
    /// Sources that do not deal in raw bytes can ignore it.
    fn set_charset(&mut self, _charset: &str) -> Result<()> {
        Ok(())
    }
}
