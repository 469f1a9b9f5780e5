//! Serializer: node tree back to markup text
//!
//! Output is rendered to a string first and handed to the writer in one
//! piece, so a validity failure writes nothing.

use std::io;

use tracing::debug;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::tree::{Node, QName};

/// Document declaration emitted when requested
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

impl Node {
    /// Render the tree to markup text
    ///
    /// With `with_declaration` the output starts with [`XML_DECLARATION`].
    /// Fails without producing anything when a comment contains `-->` or a
    /// directive would not survive re-parsing.
    pub fn to_xml(&self, with_declaration: bool) -> Result<String> {
        let mut out = String::new();
        if with_declaration {
            out.push_str(XML_DECLARATION);
        }
        self.encode_node(&mut out)?;
        Ok(out)
    }

    /// Render the tree and write it out in a single call
    pub fn encode<W: io::Write>(&self, writer: &mut W, with_declaration: bool) -> Result<()> {
        let text = self.to_xml(with_declaration)?;
        debug!(bytes = text.len(), "writing document");
        writer
            .write_all(text.as_bytes())
            .map_err(|e| Error::with_message(ErrorKind::Io, Span::empty(), e.to_string()))
    }

    fn encode_node(&self, out: &mut String) -> Result<()> {
        // Anonymous nodes have no tag of their own; they contribute bare
        // content at their position
        if self.is_anonymous() {
            self.encode_content(out)?;
            for child in &self.children {
                child.encode_node(out)?;
            }
            return Ok(());
        }
        out.push('<');
        push_qname(out, &self.name);
        for attr in &self.attributes {
            out.push(' ');
            push_qname(out, &attr.name);
            out.push_str("=\"");
            out.push_str(&escape_text(&attr.value, true));
            out.push('"');
        }
        out.push('>');
        self.encode_content(out)?;
        for child in &self.children {
            child.encode_node(out)?;
        }
        out.push_str("</");
        push_qname(out, &self.name);
        out.push('>');
        Ok(())
    }

    /// Emit comment, directive and text, in that order
    fn encode_content(&self, out: &mut String) -> Result<()> {
        if !self.comment.is_empty() {
            if self.comment.contains("-->") {
                return Err(Error::with_message(
                    ErrorKind::InvalidComment,
                    Span::empty(),
                    "comment contains '-->'",
                ));
            }
            out.push_str("<!--");
            out.push_str(&self.comment);
            out.push_str("-->");
        }
        if !self.directive.is_empty() {
            if !is_valid_directive(&self.directive) {
                return Err(Error::with_message(
                    ErrorKind::InvalidDirective,
                    Span::empty(),
                    "directive has unbalanced markers",
                ));
            }
            out.push_str("<!");
            out.push_str(&self.directive);
            out.push('>');
        }
        if !self.text.is_empty() {
            out.push_str(&escape_text(&self.text, false));
        }
        Ok(())
    }
}

fn push_qname(out: &mut String, name: &QName) {
    if !name.namespace.is_empty() {
        out.push_str(&name.namespace);
        out.push(':');
    }
    out.push_str(&name.local);
}

/// Escape text for element content or, with `escape_newline`, for attribute
/// values where a literal newline must not survive
fn escape_text(text: &str, escape_newline: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#x9;"),
            '\n' if escape_newline => out.push_str("&#xA;"),
            '\n' => out.push('\n'),
            '\r' => out.push_str("&#xD;"),
            _ if in_character_range(ch) => out.push(ch),
            _ => out.push('\u{FFFD}'),
        }
    }
    out
}

/// Code points allowed in serialized output
pub(crate) const fn in_character_range(ch: char) -> bool {
    matches!(ch,
        '\u{09}' | '\u{0A}' | '\u{0D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// A directive survives re-parsing when its angle brackets balance, counting
/// neither quoted spans nor comment bodies
fn is_valid_directive(directive: &str) -> bool {
    let bytes = directive.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut in_comment = false;
    let (mut prev2, mut prev1) = (0u8, 0u8);
    for (i, &b) in bytes.iter().enumerate() {
        if in_comment {
            if b == b'>' && prev2 == b'-' && prev1 == b'-' {
                in_comment = false;
            }
        } else if let Some(q) = quote {
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'\'' | b'"' => quote = Some(b),
                b'<' if bytes.get(i..i + 4) == Some(b"<!--".as_slice()) => in_comment = true,
                b'<' => depth += 1,
                b'>' if depth == 0 => return false,
                b'>' => depth -= 1,
                _ => {}
            }
        }
        prev2 = prev1;
        prev1 = b;
    }
    depth == 0 && quote.is_none() && !in_comment
}
