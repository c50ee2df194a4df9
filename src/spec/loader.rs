//! OpenAPI document loading and conversion.
//!
//! The document is parsed with `openapiv3` and converted once into the
//! engine model. Only the parts the engine consumes are carried over:
//! paths, operations, `200`-style responses and their media-type schemas,
//! and component schemas.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use openapiv3::{
    AnySchema, OpenAPI, ReferenceOr, Response, Schema, SchemaKind as OasKind, StatusCode,
    Type, VariantOrUnknownOrEmpty,
};
use thiserror::Error;

use crate::spec::model::{
    HttpMethod, Operation, PathEntry, ResponseDefinition, SchemaKind, SchemaNode, Specification,
};
use crate::spec::registry::{reference_id, SchemaRegistry};

/// The specification could not be loaded.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read specification file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON specification: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML specification: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported specification format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Serialization format of a specification document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(SpecError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a document from text.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<OpenAPI, SpecError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

/// Read and parse a document from disk.
pub fn load_document(path: &Path) -> Result<OpenAPI, SpecError> {
    let format = DocumentFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let document = parse_document(&text, format)?;

    tracing::info!(
        path = %path.display(),
        title = %document.info.title,
        paths = document.paths.paths.len(),
        "Specification document parsed"
    );
    Ok(document)
}

/// Convert a parsed document into the engine model.
pub fn build_specification(document: &OpenAPI) -> Specification {
    let registry: SchemaRegistry = document
        .components
        .as_ref()
        .map(|components| {
            components
                .schemas
                .iter()
                .map(|(id, schema)| (id.clone(), convert_ref(schema)))
                .collect()
        })
        .unwrap_or_default();

    let mut paths = Vec::with_capacity(document.paths.paths.len());
    for (template, item) in &document.paths.paths {
        let item = match item {
            ReferenceOr::Item(item) => item,
            ReferenceOr::Reference { reference } => {
                tracing::warn!(template = %template, reference = %reference, "Skipping referenced path item");
                continue;
            }
        };

        let declared = [
            (HttpMethod::Get, &item.get),
            (HttpMethod::Put, &item.put),
            (HttpMethod::Post, &item.post),
            (HttpMethod::Delete, &item.delete),
            (HttpMethod::Options, &item.options),
            (HttpMethod::Head, &item.head),
            (HttpMethod::Patch, &item.patch),
            (HttpMethod::Trace, &item.trace),
        ];

        let operations = declared
            .into_iter()
            .filter_map(|(method, op)| op.as_ref().map(|op| (method, convert_operation(document, op))))
            .collect();

        paths.push(PathEntry {
            template: template.clone(),
            operations,
        });
    }

    let specification = Specification {
        title: document.info.title.clone(),
        version: document.info.version.clone(),
        paths,
        registry,
    };

    tracing::debug!(
        paths = specification.paths.len(),
        operations = specification.operation_count(),
        schemas = specification.registry.len(),
        "Specification model built"
    );
    specification
}

/// Load a document from disk and build the model in one step.
pub fn load_specification(path: &Path) -> Result<(OpenAPI, Specification), SpecError> {
    let document = load_document(path)?;
    let specification = build_specification(&document);
    Ok((document, specification))
}

fn convert_operation(document: &OpenAPI, op: &openapiv3::Operation) -> Operation {
    let mut responses = IndexMap::new();
    for (status, response) in &op.responses.responses {
        if let Some(response) = resolve_response(document, response) {
            responses.insert(status_key(status), convert_response(response));
        }
    }
    if let Some(response) = op.responses.default.as_ref().and_then(|r| resolve_response(document, r)) {
        responses.insert("default".to_string(), convert_response(response));
    }
    Operation { responses }
}

/// Follow a `#/components/responses/<name>` reference one hop.
fn resolve_response<'a>(document: &'a OpenAPI, response: &'a ReferenceOr<Response>) -> Option<&'a Response> {
    match response {
        ReferenceOr::Item(response) => Some(response),
        ReferenceOr::Reference { reference } => {
            let name = reference.strip_prefix("#/components/responses/")?;
            match document.components.as_ref()?.responses.get(name)? {
                ReferenceOr::Item(response) => Some(response),
                ReferenceOr::Reference { .. } => None,
            }
        }
    }
}

fn convert_response(response: &Response) -> ResponseDefinition {
    let content = response
        .content
        .iter()
        .map(|(content_type, media)| {
            let node = media
                .schema
                .as_ref()
                .map(convert_ref)
                .unwrap_or_else(SchemaNode::unknown);
            (content_type.clone(), node)
        })
        .collect();
    ResponseDefinition { content }
}

fn status_key(status: &StatusCode) -> String {
    match status {
        StatusCode::Code(code) => code.to_string(),
        StatusCode::Range(range) => format!("{range}XX"),
    }
}

fn convert_ref(schema: &ReferenceOr<Schema>) -> SchemaNode {
    match schema {
        ReferenceOr::Reference { reference } => SchemaNode::reference(reference_id(reference)),
        ReferenceOr::Item(schema) => convert_schema(schema),
    }
}

fn convert_boxed_ref(schema: &ReferenceOr<Box<Schema>>) -> SchemaNode {
    match schema {
        ReferenceOr::Reference { reference } => SchemaNode::reference(reference_id(reference)),
        ReferenceOr::Item(schema) => convert_schema(schema),
    }
}

fn convert_properties(properties: &IndexMap<String, ReferenceOr<Box<Schema>>>) -> IndexMap<String, SchemaNode> {
    properties
        .iter()
        .map(|(name, schema)| (name.clone(), convert_boxed_ref(schema)))
        .collect()
}

fn variant_format<T: std::fmt::Debug>(format: &VariantOrUnknownOrEmpty<T>, name: impl Fn(&T) -> &'static str) -> Option<String> {
    match format {
        VariantOrUnknownOrEmpty::Item(item) => Some(name(item).to_string()),
        VariantOrUnknownOrEmpty::Unknown(other) => Some(other.clone()),
        VariantOrUnknownOrEmpty::Empty => None,
    }
}

fn convert_schema(schema: &Schema) -> SchemaNode {
    match &schema.schema_kind {
        OasKind::Type(Type::String(s)) => SchemaNode {
            format: variant_format(&s.format, |f| match f {
                openapiv3::StringFormat::Date => "date",
                openapiv3::StringFormat::DateTime => "date-time",
                openapiv3::StringFormat::Password => "password",
                openapiv3::StringFormat::Byte => "byte",
                openapiv3::StringFormat::Binary => "binary",
            }),
            ..SchemaNode::new(SchemaKind::String)
        },
        OasKind::Type(Type::Integer(i)) => SchemaNode {
            format: variant_format(&i.format, |f| match f {
                openapiv3::IntegerFormat::Int32 => "int32",
                openapiv3::IntegerFormat::Int64 => "int64",
            }),
            ..SchemaNode::new(SchemaKind::Integer)
        },
        OasKind::Type(Type::Number(n)) => SchemaNode {
            format: variant_format(&n.format, |f| match f {
                openapiv3::NumberFormat::Float => "float",
                openapiv3::NumberFormat::Double => "double",
            }),
            ..SchemaNode::new(SchemaKind::Number)
        },
        OasKind::Type(Type::Boolean { .. }) => SchemaNode::new(SchemaKind::Boolean),
        OasKind::Type(Type::Object(o)) => SchemaNode {
            properties: convert_properties(&o.properties),
            ..SchemaNode::new(SchemaKind::Object)
        },
        OasKind::Type(Type::Array(a)) => SchemaNode {
            items: a.items.as_ref().map(|items| Box::new(convert_boxed_ref(items))),
            ..SchemaNode::new(SchemaKind::Array)
        },
        OasKind::Any(any) => convert_any(any),
        OasKind::OneOf { .. } | OasKind::AllOf { .. } | OasKind::AnyOf { .. } | OasKind::Not { .. } => {
            SchemaNode::unknown()
        }
    }
}

/// Schemas without a recognizable `type` tag land here.
fn convert_any(any: &AnySchema) -> SchemaNode {
    let kind = match any.typ.as_deref() {
        Some(name) => SchemaKind::from_type_name(name),
        None if !any.properties.is_empty() => SchemaKind::Object,
        None if any.items.is_some() => SchemaKind::Array,
        None => SchemaKind::Unknown,
    };
    SchemaNode {
        kind,
        format: any.format.clone(),
        properties: convert_properties(&any.properties),
        items: any.items.as_ref().map(|items| Box::new(convert_boxed_ref(items))),
        reference_id: None,
    }
}
