//! Markup tokenizer
//!
//! Produces the lexical event stream consumed by the tree builder. Raw byte
//! runs go through the charset strategy before entity decoding, so tokens
//! always carry UTF-8 text.

use crate::charset::{CharsetStrategy, StrictUtf8};
use crate::encode::in_character_range;
use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::cursor::Cursor;
use crate::lexer::token::{Token, TokenKind, TokenSource};
use crate::tree::{Attribute, QName};

/// Streaming tokenizer over raw document bytes
#[derive(Debug)]
pub struct XmlLexer<'a> {
    cursor: Cursor<'a>,
    charset: Box<dyn CharsetStrategy>,
    /// End tag owed after a self-closing tag
    pending_end: Option<QName>,
}

impl<'a> XmlLexer<'a> {
    /// Tokenizer with the strict UTF-8 charset strategy
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_charset(input, Box::new(StrictUtf8))
    }

    /// Tokenizer with a caller-chosen charset strategy
    pub fn with_charset(input: &'a [u8], charset: Box<dyn CharsetStrategy>) -> Self {
        let mut cursor = Cursor::new(input);
        // Tolerate BOMs and other stray bytes ahead of the first tag
        while let Some(b) = cursor.current() {
            if b == b'<' {
                break;
            }
            cursor.advance();
        }
        Self {
            cursor,
            charset,
            pending_end: None,
        }
    }

    fn lex_text(&mut self, start: Pos) -> Result<Token> {
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }
        let raw = self.decode_span(start)?;
        let text = decode_entities(&raw).map_err(|e| e.with_span(self.span_from(start)))?;
        Ok(Token::new(TokenKind::Text(text), self.span_from(start)))
    }

    fn lex_markup(&mut self, start: Pos) -> Result<Token> {
        self.cursor.advance();
        match self.cursor.current() {
            Some(b'/') => self.lex_end_tag(start),
            Some(b'?') => self.lex_instruction(start),
            Some(b'!') => self.lex_bang(start),
            Some(b) if is_name_start(b) => self.lex_start_tag(start),
            Some(_) => Err(self.err(ErrorKind::InvalidToken, "expected tag name after '<'", start)),
            None => Err(self.err(ErrorKind::UnexpectedEof, "unterminated markup", start)),
        }
    }

    fn lex_start_tag(&mut self, start: Pos) -> Result<Token> {
        let name = self.lex_name(start)?;
        let mut attributes = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'>') => {
                    self.cursor.advance();
                    break;
                }
                Some(b'/') => {
                    self.cursor.advance();
                    if !self.cursor.consume(b'>') {
                        return Err(self.err(
                            ErrorKind::InvalidToken,
                            "expected '>' to close self-closing tag",
                            start,
                        ));
                    }
                    self.pending_end = Some(name.clone());
                    break;
                }
                Some(b) if is_name_start(b) => {
                    let attr_name = self.lex_name(start)?;
                    self.cursor.skip_whitespace();
                    if !self.cursor.consume(b'=') {
                        return Err(self.err(
                            ErrorKind::InvalidToken,
                            "expected '=' after attribute name",
                            start,
                        ));
                    }
                    self.cursor.skip_whitespace();
                    let value = self.lex_attr_value(start)?;
                    attributes.push(Attribute::new(attr_name, value));
                }
                Some(_) => {
                    return Err(self.err(ErrorKind::InvalidToken, "malformed start tag", start))
                }
                None => {
                    return Err(self.err(ErrorKind::UnexpectedEof, "unterminated start tag", start))
                }
            }
        }
        Ok(Token::new(
            TokenKind::StartTag { name, attributes },
            self.span_from(start),
        ))
    }

    fn lex_end_tag(&mut self, start: Pos) -> Result<Token> {
        self.cursor.advance();
        let name = self.lex_name(start)?;
        self.cursor.skip_whitespace();
        if !self.cursor.consume(b'>') {
            let kind = if self.cursor.is_eof() {
                ErrorKind::UnexpectedEof
            } else {
                ErrorKind::InvalidToken
            };
            return Err(self.err(kind, "malformed closing tag", start));
        }
        Ok(Token::new(TokenKind::EndTag { name }, self.span_from(start)))
    }

    fn lex_instruction(&mut self, start: Pos) -> Result<Token> {
        self.cursor.advance();
        let target = self.lex_pi_target(start)?;
        self.cursor.skip_whitespace();
        let data_start = self.cursor.position();
        loop {
            if self.cursor.is_eof() {
                return Err(self.err(
                    ErrorKind::UnexpectedEof,
                    "unterminated processing instruction",
                    start,
                ));
            }
            if self.cursor.starts_with(b"?>") {
                break;
            }
            self.cursor.advance();
        }
        let data = self.decode_span(data_start)?;
        self.cursor.advance_by(2);
        Ok(Token::new(
            TokenKind::ProcessingInstruction {
                target,
                data: data.trim().to_string(),
            },
            self.span_from(start),
        ))
    }

    fn lex_bang(&mut self, start: Pos) -> Result<Token> {
        self.cursor.advance();
        if self.cursor.starts_with(b"--") {
            self.cursor.advance_by(2);
            return self.lex_comment(start);
        }
        if self.cursor.starts_with(b"[CDATA[") {
            self.cursor.advance_by(7);
            return self.lex_cdata(start);
        }
        self.lex_directive(start)
    }

    fn lex_comment(&mut self, start: Pos) -> Result<Token> {
        let body_start = self.cursor.position();
        loop {
            if self.cursor.is_eof() {
                return Err(self.err(ErrorKind::UnexpectedEof, "unterminated comment", start));
            }
            if self.cursor.starts_with(b"-->") {
                break;
            }
            self.cursor.advance();
        }
        let comment = self.decode_span(body_start)?;
        self.cursor.advance_by(3);
        Ok(Token::new(TokenKind::Comment(comment), self.span_from(start)))
    }

    /// CDATA content becomes a text token with no entity decoding
    fn lex_cdata(&mut self, start: Pos) -> Result<Token> {
        let body_start = self.cursor.position();
        loop {
            if self.cursor.is_eof() {
                return Err(self.err(
                    ErrorKind::UnexpectedEof,
                    "unterminated CDATA section",
                    start,
                ));
            }
            if self.cursor.starts_with(b"]]>") {
                break;
            }
            self.cursor.advance();
        }
        let text = self.decode_span(body_start)?;
        self.cursor.advance_by(3);
        Ok(Token::new(TokenKind::Text(text), self.span_from(start)))
    }

    /// Directives run to the matching `>`, counting nested angle brackets
    /// but ignoring brackets inside quoted spans and comments
    fn lex_directive(&mut self, start: Pos) -> Result<Token> {
        let body_start = self.cursor.position();
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        let mut in_comment = false;
        let (mut prev2, mut prev1) = (0u8, 0u8);
        loop {
            let Some(b) = self.cursor.current() else {
                return Err(self.err(ErrorKind::UnexpectedEof, "unterminated directive", start));
            };
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
                    b'<' if self.cursor.starts_with(b"<!--") => in_comment = true,
                    b'<' => depth += 1,
                    b'>' if depth == 0 => break,
                    b'>' => depth -= 1,
                    _ => {}
                }
            }
            self.cursor.advance();
            prev2 = prev1;
            prev1 = b;
        }
        let directive = self.decode_span(body_start)?;
        self.cursor.advance();
        Ok(Token::new(
            TokenKind::Directive(directive),
            self.span_from(start),
        ))
    }

    fn lex_name(&mut self, start: Pos) -> Result<QName> {
        let raw = self.lex_raw_name(start)?;
        Ok(QName::from(raw.as_str()))
    }

    fn lex_pi_target(&mut self, start: Pos) -> Result<String> {
        self.lex_raw_name(start)
    }

    fn lex_raw_name(&mut self, start: Pos) -> Result<String> {
        match self.cursor.current() {
            Some(b) if is_name_start(b) => {}
            _ => return Err(self.err(ErrorKind::InvalidToken, "invalid name", start)),
        }
        let from = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if is_name_byte(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        // Name bytes are ASCII by construction
        Ok(String::from_utf8_lossy(self.cursor.slice_from(from)).into_owned())
    }

    fn lex_attr_value(&mut self, start: Pos) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(self.err(
                    ErrorKind::InvalidToken,
                    "expected quoted attribute value",
                    start,
                ))
            }
        };
        self.cursor.advance();
        let value_start = self.cursor.position();
        loop {
            match self.cursor.current() {
                None => {
                    return Err(self.err(
                        ErrorKind::UnexpectedEof,
                        "unterminated attribute value",
                        start,
                    ))
                }
                Some(b'<') => {
                    return Err(self.err(
                        ErrorKind::InvalidToken,
                        "unescaped '<' in attribute value",
                        start,
                    ))
                }
                Some(b) if b == quote => break,
                Some(_) => self.cursor.advance(),
            }
        }
        let raw = self.decode_span(value_start)?;
        self.cursor.advance();
        decode_entities(&raw).map_err(|e| e.with_span(self.span_from(start)))
    }

    /// Charset-decode the bytes between a saved position and the cursor
    fn decode_span(&self, start: Pos) -> Result<String> {
        let raw = self.cursor.slice_from(start.offset);
        self.charset
            .decode(raw)
            .map_err(|e| e.with_span(self.span_from(start)))
    }

    fn span_from(&self, start: Pos) -> Span {
        Span::new(start, self.cursor.position())
    }

    fn err(&self, kind: ErrorKind, message: impl Into<String>, start: Pos) -> Error {
        Error::with_message(kind, self.span_from(start), message)
    }
}

impl TokenSource for XmlLexer<'_> {
    fn next_token(&mut self) -> Result<Token> {
        if let Some(name) = self.pending_end.take() {
            let pos = self.cursor.position();
            return Ok(Token::new(TokenKind::EndTag { name }, Span::new(pos, pos)));
        }
        let start = self.cursor.position();
        match self.cursor.current() {
            None => Ok(Token::new(TokenKind::Eof, Span::new(start, start))),
            Some(b'<') => self.lex_markup(start),
            Some(_) => self.lex_text(start),
        }
    }

    fn set_charset(&mut self, charset: &str) -> Result<()> {
        self.charset.init(charset)
    }
}

const fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'.' | b'-')
}

/// Decode the five predefined entities and numeric character references
fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            out.push(ch);
            continue;
        }
        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            if !next.is_ascii_alphanumeric() && next != '#' {
                break;
            }
            entity.push(next);
        }
        if !terminated {
            return Err(Error::with_message(
                ErrorKind::InvalidEntity,
                Span::empty(),
                format!("unterminated entity reference '&{entity}'"),
            ));
        }
        out.push(resolve_entity(&entity)?);
    }
    Ok(out)
}

fn resolve_entity(entity: &str) -> Result<char> {
    let decoded = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };
            numeric
                .and_then(char::from_u32)
                .filter(|&c| in_character_range(c))
        }
    };
    decoded.ok_or_else(|| {
        Error::with_message(
            ErrorKind::InvalidEntity,
            Span::empty(),
            format!("invalid entity reference '&{entity};'"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<TokenKind> {
        let mut lexer = XmlLexer::new(input.as_bytes());
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = token.kind == TokenKind::Eof;
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn test_start_and_end_tags() {
        let kinds = tokens("<a><b></b></a>");
        assert_eq!(kinds.len(), 5);
        assert!(matches!(&kinds[0], TokenKind::StartTag { name, .. } if name.local == "a"));
        assert!(matches!(&kinds[3], TokenKind::EndTag { name } if name.local == "a"));
    }

    #[test]
    fn test_self_closing_queues_end_tag() {
        let kinds = tokens("<a/>");
        assert_eq!(kinds.len(), 3);
        assert!(matches!(&kinds[0], TokenKind::StartTag { name, .. } if name.local == "a"));
        assert!(matches!(&kinds[1], TokenKind::EndTag { name } if name.local == "a"));
    }

    #[test]
    fn test_attributes_in_order_with_duplicates() {
        let kinds = tokens(r#"<a id="1" class='x' id="2"/>"#);
        let TokenKind::StartTag { attributes, .. } = &kinds[0] else {
            panic!("expected start tag");
        };
        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes[0].value, "1");
        assert_eq!(attributes[1].name.local, "class");
        assert_eq!(attributes[2].value, "2");
    }

    #[test]
    fn test_namespace_prefix_split() {
        let kinds = tokens("<gx:coord></gx:coord>");
        let TokenKind::StartTag { name, .. } = &kinds[0] else {
            panic!("expected start tag");
        };
        assert_eq!(name.namespace, "gx");
        assert_eq!(name.local, "coord");
    }

    #[test]
    fn test_text_with_entities() {
        let kinds = tokens("<a>x &amp; y &lt;z&gt; &#65;&#x42;</a>");
        assert!(matches!(&kinds[1], TokenKind::Text(t) if t == "x & y <z> AB"));
    }

    #[test]
    fn test_cdata_is_raw_text() {
        let kinds = tokens("<a><![CDATA[1 &amp; <2>]]></a>");
        assert!(matches!(&kinds[1], TokenKind::Text(t) if t == "1 &amp; <2>"));
    }

    #[test]
    fn test_comment_token() {
        let kinds = tokens("<a><!-- note --></a>");
        assert!(matches!(&kinds[1], TokenKind::Comment(c) if c == " note "));
    }

    #[test]
    fn test_directive_with_nested_brackets() {
        let kinds = tokens(r#"<!DOCTYPE doc [<!ENTITY x "y">]><doc/>"#);
        assert!(
            matches!(&kinds[0], TokenKind::Directive(d) if d == r#"DOCTYPE doc [<!ENTITY x "y">]"#)
        );
    }

    #[test]
    fn test_directive_quoted_angle_bracket() {
        let kinds = tokens(r#"<!DOCTYPE doc "a>b"><doc/>"#);
        assert!(matches!(&kinds[0], TokenKind::Directive(d) if d == r#"DOCTYPE doc "a>b""#));
    }

    #[test]
    fn test_processing_instruction() {
        let kinds = tokens(r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#);
        assert!(matches!(
            &kinds[0],
            TokenKind::ProcessingInstruction { target, data }
                if target == "xml" && data == r#"version="1.0" encoding="UTF-8""#
        ));
    }

    #[test]
    fn test_leading_noise_skipped() {
        let kinds = tokens("\u{feff}  junk <a/>");
        assert!(matches!(&kinds[0], TokenKind::StartTag { name, .. } if name.local == "a"));
    }

    #[test]
    fn test_unknown_entity_is_error() {
        let mut lexer = XmlLexer::new(b"<a>&nbsp;</a>");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEntity);
    }

    #[test]
    fn test_unterminated_entity_is_error() {
        let mut lexer = XmlLexer::new(b"<a>x &amp y</a>");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEntity);
    }

    #[test]
    fn test_numeric_reference_outside_range_is_error() {
        let mut lexer = XmlLexer::new(b"<a>&#0;</a>");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEntity);
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        let mut lexer = XmlLexer::new(b"<a><!-- oops");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_unquoted_attribute_is_error() {
        let mut lexer = XmlLexer::new(b"<a id=1>");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidToken);
    }

    #[test]
    fn test_unescaped_angle_in_attribute_is_error() {
        let mut lexer = XmlLexer::new(b"<a id=\"x<y\">");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidToken);
    }

    #[test]
    fn test_error_carries_position() {
        let mut lexer = XmlLexer::new(b"<a>\n  <b id=oops>");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.span().start.line, 2);
    }
}
