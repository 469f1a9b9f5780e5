//! Tree builder
//!
//! Consumes lexical events into a node tree rooted at a synthetic anonymous
//! node. Scalar runs are trimmed and dropped when whitespace-only, and a sole
//! anonymous child collapses onto its parent when the element closes.

use tracing::debug;

use crate::charset::CharsetStrategy;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::lexer::token::{TokenKind, TokenSource};
use crate::lexer::xml::XmlLexer;
use crate::tree::Node;

/// Nesting limit guarding against stack exhaustion
const MAX_DEPTH: u16 = 512;

/// Builder turning a token stream into a [`Node`] tree
pub struct Parser<S> {
    source: S,
}

impl<'a> Parser<XmlLexer<'a>> {
    /// Parser over raw bytes with the strict UTF-8 charset strategy
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            source: XmlLexer::new(input),
        }
    }

    /// Parser over raw bytes with a caller-chosen charset strategy
    pub fn with_charset(input: &'a [u8], charset: Box<dyn CharsetStrategy>) -> Self {
        Self {
            source: XmlLexer::with_charset(input, charset),
        }
    }
}

impl<S: TokenSource> Parser<S> {
    /// Parser over any token source
    pub fn from_source(source: S) -> Self {
        Self { source }
    }

    /// Consume the whole stream into a document tree
    ///
    /// The synthetic root is unwrapped when it ends up holding exactly one
    /// named child; otherwise it is returned as-is with its children.
    pub fn parse(&mut self) -> Result<Node> {
        let mut root = Node::default();
        self.build(&mut root, 0)?;
        if root.children.is_empty() {
            return Err(Error::new(ErrorKind::EmptyDocument, Span::empty()));
        }
        let unwrap =
            root.children.len() == 1 && root.children.first().is_some_and(|c| !c.is_anonymous());
        if unwrap {
            if let Some(child) = root.children.pop() {
                return Ok(child);
            }
        }
        Ok(root)
    }

    fn build(&mut self, node: &mut Node, depth: u16) -> Result<()> {
        loop {
            let token = self.source.next_token()?;
            match token.kind {
                TokenKind::StartTag { name, attributes } => {
                    if depth >= MAX_DEPTH {
                        return Err(Error::new(
                            ErrorKind::MaxDepthExceeded { max: MAX_DEPTH },
                            token.span,
                        ));
                    }
                    let mut child = Node::element(name);
                    child.attributes = attributes;
                    self.build(&mut child, depth + 1)?;
                    node.children.push(child);
                }
                TokenKind::EndTag { name } => {
                    if node.is_anonymous() {
                        return Err(Error::with_message(
                            ErrorKind::UnexpectedClosingTag,
                            token.span,
                            format!("unexpected closing tag </{name}>"),
                        ));
                    }
                    if name != node.name {
                        return Err(Error::new(
                            ErrorKind::MismatchedTag {
                                expected: node.name.to_string(),
                                found: name.to_string(),
                            },
                            token.span,
                        ));
                    }
                    collapse(node);
                    return Ok(());
                }
                TokenKind::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        node.children.push(Node::text(trimmed));
                    }
                }
                TokenKind::Comment(comment) => {
                    let trimmed = comment.trim();
                    if !trimmed.is_empty() {
                        node.children.push(Node::comment(trimmed));
                    }
                }
                TokenKind::Directive(directive) => {
                    let trimmed = directive.trim();
                    if !trimmed.is_empty() {
                        node.children.push(Node::directive(trimmed));
                    }
                }
                TokenKind::ProcessingInstruction { target, data } => {
                    // Only the document declaration matters; other
                    // instructions are dropped
                    if target == "xml" {
                        let encoding = declared_encoding(&data).unwrap_or("UTF-8");
                        debug!(encoding, "document declaration");
                        self.source
                            .set_charset(encoding)
                            .map_err(|e| e.with_span(token.span))?;
                    }
                }
                TokenKind::Eof => {
                    if node.is_anonymous() {
                        return Ok(());
                    }
                    return Err(Error::with_message(
                        ErrorKind::UnterminatedElement,
                        token.span,
                        format!("unterminated element <{}>", node.name),
                    ));
                }
            }
        }
    }
}

/// Collapse rule: when a closing element holds exactly one anonymous child
/// carrying scalar content, the content promotes onto the element itself
fn collapse(node: &mut Node) {
    if node.children.len() != 1 {
        return;
    }
    let promote = node.children.first().is_some_and(|c| {
        c.is_anonymous()
            && (!c.text.is_empty() || !c.comment.is_empty() || !c.directive.is_empty())
    });
    if !promote {
        return;
    }
    if let Some(child) = node.children.pop() {
        if !child.text.is_empty() {
            node.text = child.text;
        } else if !child.comment.is_empty() {
            node.comment = child.comment;
        } else {
            node.directive = child.directive;
        }
    }
}

/// Extract the encoding name from declaration payload such as
/// `version="1.0" encoding="UTF-8"`
fn declared_encoding(data: &str) -> Option<&str> {
    let rest = data.get(data.find("encoding=")? + "encoding=".len()..)?;
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = rest.get(1..)?;
    let end = rest.find(quote)?;
    if end == 0 {
        return None;
    }
    rest.get(..end)
}
