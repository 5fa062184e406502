//! Parsed document model.
//!
//! Documents are read once into an owned element tree in which every element
//! carries its resolved namespace URI, so lookups never depend on the prefix
//! a producer happened to choose.

mod accessor;
mod parser;

pub use accessor::{DocumentAccessor, FieldPath, LookupTier, Resolved};
pub use parser::parse_document;

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// A single element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    local_name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub(crate) fn new(namespace: Option<String>, local_name: String) -> Self {
        Self {
            namespace,
            local_name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Resolved namespace URI, `None` for unqualified elements.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Tag name without any prefix.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Direct text content, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child with the given local name, in any namespace.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name == local_name)
    }

    /// All elements below this one in document order (pre-order).
    pub fn descendants(&self) -> impl Iterator<Item = &Element> + '_ {
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}

/// A parsed document with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub(crate) fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse a document from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        parse_document(bytes)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

impl std::str::FromStr for Document {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self> {
        parse_document(s.as_bytes())
    }
}
