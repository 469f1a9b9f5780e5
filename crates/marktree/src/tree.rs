//! Schema-less document tree model

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Qualified name: namespace prefix plus local part
///
/// The prefix is whatever precedes the first `:` in the source name. It is
/// kept verbatim, no namespace resolution is performed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub namespace: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// True when both parts are empty, as on anonymous nodes
    pub fn is_empty(&self) -> bool {
        self.namespace.is_empty() && self.local.is_empty()
    }
}

impl From<&str> for QName {
    /// Splits on the first `:`; everything before it becomes the prefix
    fn from(name: &str) -> Self {
        match name.split_once(':') {
            Some((namespace, local)) => Self::new(namespace, local),
            None => Self::new("", name),
        }
    }
}

impl From<String> for QName {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}:{}", self.namespace, self.local)
        }
    }
}

/// Single attribute; duplicates are legal and source order is preserved
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    pub name: QName,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<QName>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Node in the document tree
///
/// A node with an empty name is anonymous: it holds a run of text, a comment
/// or a directive that appeared between elements. Scalar fields use the empty
/// string for "absent".
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "QName::is_empty")
    )]
    pub name: QName,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub attributes: Vec<Attribute>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub comment: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub directive: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub text: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<Node>,
}

impl Node {
    /// Named element with no content
    pub fn element(name: impl Into<QName>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Anonymous node holding a run of character data
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Anonymous node holding a comment
    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..Self::default()
        }
    }

    /// Anonymous node holding a directive
    pub fn directive(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            ..Self::default()
        }
    }

    /// True for nodes created from inter-element text, comments or directives
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Value of the first attribute with the given local name
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name.local == local)
    }

    /// Mutable access to the first child element with the given local name
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name.local == local)
    }
}
