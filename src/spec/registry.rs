//! Named component schemas.
//!
//! Schemas are kept flat, keyed by id. References are resolved by lookup
//! rather than by building a cyclic object graph.

use indexmap::IndexMap;

use crate::spec::model::{SchemaKind, SchemaNode};

const COMPONENT_PREFIX: &str = "#/components/schemas/";

/// Flat registry of component schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, SchemaNode>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named schema.
    pub fn insert(&mut self, id: impl Into<String>, node: SchemaNode) {
        self.schemas.insert(id.into(), node);
    }

    /// Look up a schema by id. Unknown ids yield `None`.
    pub fn resolve(&self, id: &str) -> Option<&SchemaNode> {
        self.schemas.get(id)
    }

    /// Declared kind of a node, following a single reference hop.
    pub fn effective_kind(&self, node: &SchemaNode) -> SchemaKind {
        if !node.properties.is_empty() {
            return SchemaKind::Object;
        }
        match node.reference_id.as_deref() {
            Some(id) => self
                .resolve(id)
                .map(|target| target.kind)
                .unwrap_or(SchemaKind::Unknown),
            None => node.kind,
        }
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl FromIterator<(String, SchemaNode)> for SchemaRegistry {
    fn from_iter<T: IntoIterator<Item = (String, SchemaNode)>>(iter: T) -> Self {
        Self {
            schemas: iter.into_iter().collect(),
        }
    }
}

/// Turn a `$ref` string into a registry id.
///
/// `#/components/schemas/Person` becomes `Person`. Any other shape is kept
/// verbatim, which will not resolve.
pub fn reference_id(reference: &str) -> String {
    reference
        .strip_prefix(COMPONENT_PREFIX)
        .unwrap_or(reference)
        .to_string()
}
