//! Error types for marktree

use std::fmt;
use thiserror::Error;

/// Position in the source document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in the source document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidToken,
    UnexpectedEof,
    UnterminatedElement,
    MismatchedTag { expected: String, found: String },
    UnexpectedClosingTag,
    InvalidEntity,
    InvalidUtf8,
    UnsupportedCharset { name: String },
    MaxDepthExceeded { max: u16 },
    EmptyDocument,
    InvalidComment,
    InvalidDirective,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnterminatedElement => write!(f, "unterminated element"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::UnexpectedClosingTag => write!(f, "unexpected closing tag"),
            Self::InvalidEntity => write!(f, "invalid entity reference"),
            Self::InvalidUtf8 => write!(f, "invalid UTF-8"),
            Self::UnsupportedCharset { name } => {
                write!(f, "unsupported charset: {name}")
            }
            Self::MaxDepthExceeded { max } => {
                write!(f, "max depth exceeded: {max}")
            }
            Self::EmptyDocument => write!(f, "empty document"),
            Self::InvalidComment => write!(f, "invalid comment"),
            Self::InvalidDirective => write!(f, "invalid directive"),
            Self::Io => write!(f, "i/o error"),
        }
    }
}

/// Main error type for marktree
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Replace the span, keeping kind and message
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at {}: {}", self.span.start, self.message)
    }
}

/// Result type alias for marktree
pub type Result<T> = std::result::Result<T, Error>;
