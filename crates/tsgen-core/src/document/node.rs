use std::fmt;

use indexmap::IndexMap;

/// The location of a node in the source document, as a `#`-rooted,
/// slash-delimited pointer string (e.g. `#/components/schemas/Widget`).
///
/// Two nodes with the same canonical path are the same logical entity, no
/// matter how many reference chains they were reached through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// The document root, `#`.
    pub fn root() -> Self {
        CanonicalPath("#".to_string())
    }

    /// Normalize a raw `$ref` pointer into a canonical path.
    pub fn from_pointer(pointer: &str) -> Self {
        let trimmed = pointer.trim_start_matches('#').trim_start_matches('/');
        if trimmed.is_empty() {
            Self::root()
        } else {
            CanonicalPath(format!("#/{trimmed}"))
        }
    }

    /// Extend the path by one segment, escaping characters that collide
    /// with the pointer syntax.
    pub fn join(&self, segment: &str) -> Self {
        CanonicalPath(format!("{}/{}", self.0, escape_segment(segment)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, unescaped.
    pub fn last_segment(&self) -> String {
        unescape_segment(self.0.rsplit('/').next().unwrap_or(""))
    }

    /// Whether this path lies under `prefix` (or equals it).
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0 == prefix || self.0.starts_with(&format!("{prefix}/"))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Escape `~` and `/` occurring literally in a field name.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Reverse [`escape_segment`].
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// A fully dereferenced document node.
///
/// Composite variants carry their canonical path as a struct field outside
/// the field map, so it never shows up in field iteration or rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(ArrayNode),
    Object(ObjectNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub path: CanonicalPath,
    pub items: Vec<DocNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub path: CanonicalPath,
    pub fields: IndexMap<String, DocNode>,
}

impl DocNode {
    /// Canonical path, present on composite nodes only.
    pub fn path(&self) -> Option<&CanonicalPath> {
        match self {
            DocNode::Array(a) => Some(&a.path),
            DocNode::Object(o) => Some(&o.path),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            DocNode::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            DocNode::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DocNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Field lookup on object nodes; `None` for anything else.
    pub fn get(&self, field: &str) -> Option<&DocNode> {
        self.as_object().and_then(|o| o.fields.get(field))
    }

    /// String-valued field lookup.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(DocNode::as_str)
    }

    /// The `$ref` marker left behind by the dereferencer, if any.
    pub fn ref_target(&self) -> Option<&str> {
        self.str_field("$ref")
    }
}
