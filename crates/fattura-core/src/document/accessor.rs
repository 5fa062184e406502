//! Namespace-tolerant field lookup.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Document, Element};

/// A namespace-agnostic designator for a field within the schema.
///
/// `segments` are element local names below the root element, outermost
/// first; `name` is the stable logical name reported in errors. The optional
/// anchor is the segment that identifies the field's block (for example the
/// supplier block as opposed to the buyer block, which share inner element
/// names) and scopes the descendant lookup tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    name: &'static str,
    segments: &'static [&'static str],
    anchor: Option<usize>,
}

impl FieldPath {
    /// Create an unanchored path. `segments` must not be empty.
    pub const fn new(name: &'static str, segments: &'static [&'static str]) -> Self {
        assert!(!segments.is_empty(), "field path needs at least one segment");
        Self {
            name,
            segments,
            anchor: None,
        }
    }

    /// Anchor the descendant tier at `segments[index]`, which must come
    /// before the leaf.
    pub const fn anchored_at(mut self, index: usize) -> Self {
        assert!(index + 1 < self.segments.len(), "anchor must precede the leaf");
        self.anchor = Some(index);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn segments(&self) -> &'static [&'static str] {
        self.segments
    }

    /// Local name of the field element itself.
    pub fn leaf(&self) -> &'static str {
        self.segments[self.segments.len() - 1]
    }

    /// Local name of the anchor element, if any.
    pub fn anchor(&self) -> Option<&'static str> {
        self.anchor.map(|index| self.segments[index])
    }

    /// Schema form of the path, e.g. `A/B/C`.
    pub fn schema_path(&self) -> String {
        self.segments.join("/")
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Lookup tier that produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupTier {
    /// Exact nesting, every segment in the schema namespace.
    Qualified,
    /// Exact nesting, every segment unqualified.
    Unqualified,
    /// Leaf found anywhere below the anchor block.
    Descendant,
}

/// A resolved field value together with the tier that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'d> {
    pub value: &'d str,
    pub tier: LookupTier,
}

/// Resolves [`FieldPath`]s against parsed documents.
///
/// Tiers are tried in a fixed order and the first non-empty value wins:
///
/// 1. [`LookupTier::Qualified`]: exact parent-child nesting from the root,
///    each element in the configured namespace.
/// 2. [`LookupTier::Unqualified`]: exact nesting, elements without namespace.
/// 3. [`LookupTier::Descendant`]: every anchor element anywhere below the
///    root is searched, in document order, for the first element named like
///    the leaf. Namespaces are ignored and wrappers between root, anchor and
///    leaf may be missing or extra. Unanchored paths search the whole
///    document.
#[derive(Debug, Clone)]
pub struct DocumentAccessor {
    namespace_uri: String,
}

impl DocumentAccessor {
    pub fn new(namespace_uri: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
        }
    }

    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    /// Resolve a field to its trimmed text, or `None` when no tier matches.
    pub fn resolve<'d>(&self, document: &'d Document, path: &FieldPath) -> Option<&'d str> {
        self.resolve_with_tier(document, path).map(|r| r.value)
    }

    /// Resolve a field and report which tier produced it.
    pub fn resolve_with_tier<'d>(
        &self,
        document: &'d Document,
        path: &FieldPath,
    ) -> Option<Resolved<'d>> {
        let root = document.root();
        let namespace = self.namespace_uri.as_str();

        let qualified = |e: &Element, segment: &str| {
            e.local_name() == segment && e.namespace() == Some(namespace)
        };
        let unqualified = |e: &Element, segment: &str| {
            e.local_name() == segment && e.namespace().is_none()
        };

        let resolved = find_exact(root, path.segments(), &qualified)
            .map(|value| Resolved { value, tier: LookupTier::Qualified })
            .or_else(|| {
                find_exact(root, path.segments(), &unqualified)
                    .map(|value| Resolved { value, tier: LookupTier::Unqualified })
            })
            .or_else(|| {
                find_anywhere(root, path)
                    .map(|value| Resolved { value, tier: LookupTier::Descendant })
            });

        match &resolved {
            Some(r) => trace!("Resolved {} via {:?}", path, r.tier),
            None => trace!("Could not resolve {}", path),
        }

        resolved
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() { None } else { Some(text) }
}

/// Follow `segments` through direct children, exploring every matching
/// branch in document order.
fn find_exact<'d>(
    element: &'d Element,
    segments: &[&str],
    matches: &dyn Fn(&Element, &str) -> bool,
) -> Option<&'d str> {
    let Some((first, rest)) = segments.split_first() else {
        return non_empty(element.text());
    };

    element
        .children()
        .iter()
        .filter(|child| matches(child, first))
        .find_map(|child| find_exact(child, rest, matches))
}

fn find_anywhere<'d>(root: &'d Element, path: &FieldPath) -> Option<&'d str> {
    let leaf = path.leaf();
    let within = |scope: &'d Element| {
        scope
            .descendants()
            .filter(|e| e.local_name() == leaf)
            .find_map(|e| non_empty(e.text()))
    };

    match path.anchor() {
        Some(anchor) => root
            .descendants()
            .filter(|e| e.local_name() == anchor)
            .find_map(within),
        None => within(root),
    }
}
