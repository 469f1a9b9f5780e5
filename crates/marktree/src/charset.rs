//! Charset strategies for decoding document bytes
//!
//! The declared encoding of a document is only known once its declaration has
//! been read, so a strategy starts out decoding as UTF-8 and is switched via
//! [`CharsetStrategy::init`] when a declaration names an encoding. Each parser
//! owns its strategy; there is no process-wide registry.

use std::fmt;

use crate::error::{Error, ErrorKind, Result, Span};

/// Byte-to-text conversion for one document
pub trait CharsetStrategy: fmt::Debug {
    /// Switch to the named charset for the remainder of the document
    fn init(&mut self, charset: &str) -> Result<()>;

    /// Convert a raw byte run to text
    fn decode(&self, bytes: &[u8]) -> Result<String>;
}

/// Default strategy: UTF-8 only
///
/// Rejects any declared encoding other than exactly `UTF-8`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictUtf8;

impl CharsetStrategy for StrictUtf8 {
    fn init(&mut self, charset: &str) -> Result<()> {
        if charset == "UTF-8" {
            Ok(())
        } else {
            Err(Error::with_message(
                ErrorKind::UnsupportedCharset {
                    name: charset.to_string(),
                },
                Span::empty(),
                format!("unsupported charset '{charset}' (UTF-8 only)"),
            ))
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        decode_utf8(bytes)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Utf8,
    Latin1,
}

/// Strategy accepting the charsets that decode without tables
///
/// `UTF-8` and `US-ASCII` labels decode as UTF-8; `ISO-8859-1` maps each byte
/// to the Unicode code point of the same value. Labels are matched
/// case-insensitively with common aliases.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveCharset {
    mode: Mode,
}

impl CharsetStrategy for PermissiveCharset {
    fn init(&mut self, charset: &str) -> Result<()> {
        let label = charset.to_ascii_uppercase();
        self.mode = match label.as_str() {
            "UTF-8" | "UTF8" | "US-ASCII" | "ASCII" => Mode::Utf8,
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Mode::Latin1,
            _ => {
                return Err(Error::with_message(
                    ErrorKind::UnsupportedCharset {
                        name: charset.to_string(),
                    },
                    Span::empty(),
                    format!("unsupported charset '{charset}'"),
                ))
            }
        };
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self.mode {
            Mode::Utf8 => decode_utf8(bytes),
            // ISO-8859-1 code points coincide with byte values
            Mode::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::new(ErrorKind::InvalidUtf8, Span::empty()))
}
