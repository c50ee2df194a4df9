//! In-memory API description model.
//!
//! This is the shape the engine works on, independent of the OpenAPI
//! document it was converted from. Every value here is built once at
//! startup and never mutated afterwards.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::spec::registry::SchemaRegistry;

/// The closed set of schema kinds the synthesizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// Pointer to a named component schema.
    Reference,
    /// Anything the model does not recognize (combinators, missing type).
    Unknown,
}

impl SchemaKind {
    /// Map an OpenAPI `type` string to a kind.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "string" => SchemaKind::String,
            "integer" => SchemaKind::Integer,
            "number" => SchemaKind::Number,
            "boolean" => SchemaKind::Boolean,
            "array" => SchemaKind::Array,
            "object" => SchemaKind::Object,
            _ => SchemaKind::Unknown,
        }
    }

    /// True for `integer` and `number`.
    pub fn is_numeric(self) -> bool {
        matches!(self, SchemaKind::Integer | SchemaKind::Number)
    }
}

/// A recursive description of a JSON value.
///
/// A node with non-empty `properties` is an inline object even when it also
/// carries a `reference_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub format: Option<String>,
    pub properties: IndexMap<String, SchemaNode>,
    pub items: Option<Box<SchemaNode>>,
    pub reference_id: Option<String>,
}

impl SchemaNode {
    /// Create a node of the given kind with no refinements.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            format: None,
            properties: IndexMap::new(),
            items: None,
            reference_id: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown)
    }

    /// Primitive node with a format refinement.
    pub fn with_format(kind: SchemaKind, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Self::new(kind)
        }
    }

    /// Pointer to a named component schema.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            reference_id: Some(id.into()),
            ..Self::new(SchemaKind::Reference)
        }
    }

    /// Array of `items`.
    pub fn array(items: SchemaNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(SchemaKind::Array)
        }
    }

    /// Inline object with properties in the given order.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self {
            properties: properties
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
            ..Self::new(SchemaKind::Object)
        }
    }

    /// The format string, if any.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

/// HTTP methods an OpenAPI path item can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method string is not one of the eight OpenAPI verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod(pub String);

impl fmt::Display for UnsupportedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnsupportedMethod {}

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    /// Case-insensitive parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "put" => Ok(HttpMethod::Put),
            "post" => Ok(HttpMethod::Post),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            "head" => Ok(HttpMethod::Head),
            "patch" => Ok(HttpMethod::Patch),
            "trace" => Ok(HttpMethod::Trace),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// Media-type schemas of one response, keyed by content type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDefinition {
    pub content: IndexMap<String, SchemaNode>,
}

/// One HTTP method on one path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// Response definitions keyed by status code ("200", "4XX", "default").
    pub responses: IndexMap<String, ResponseDefinition>,
}

/// A path template with its declared operations.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    pub template: String,
    pub operations: IndexMap<HttpMethod, Operation>,
}

/// The full API description: paths in document order plus named schemas.
#[derive(Debug, Clone, Default)]
pub struct Specification {
    pub title: String,
    pub version: String,
    pub paths: Vec<PathEntry>,
    pub registry: SchemaRegistry,
}

impl Specification {
    /// Total number of declared operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("PaTcH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("CONNECT".parse::<HttpMethod>().is_err());
        assert!("".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_kind_from_type_name() {
        assert_eq!(SchemaKind::from_type_name("integer"), SchemaKind::Integer);
        assert_eq!(SchemaKind::from_type_name("null"), SchemaKind::Unknown);
        assert!(SchemaKind::Number.is_numeric());
        assert!(!SchemaKind::String.is_numeric());
    }

    #[test]
    fn test_object_preserves_declared_order() {
        let node = SchemaNode::object([
            ("zeta", SchemaNode::new(SchemaKind::String)),
            ("alpha", SchemaNode::new(SchemaKind::Integer)),
        ]);
        let names: Vec<&str> = node.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
