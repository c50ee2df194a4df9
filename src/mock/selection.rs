//! Success response selection.
//!
//! Picks which (status, content type) schema of an operation gets
//! synthesized. The default strategy only knows `200` and three JSON-ish
//! content types; richer policies plug in through [`ResponseSelector`].

use crate::spec::model::{Operation, SchemaNode};

/// The only status the default strategy considers.
pub const SUCCESS_STATUS: &str = "200";

/// Content types in the order they are tried.
pub const CONTENT_TYPE_PRIORITY: [&str; 3] = ["application/json", "text/json", "text/plain"];

/// The schema chosen for a response.
#[derive(Debug, Clone, Copy)]
pub struct SelectedResponse<'a> {
    pub status: &'a str,
    pub content_type: &'a str,
    pub schema: &'a SchemaNode,
}

/// Strategy for choosing the response to synthesize.
pub trait ResponseSelector: Send + Sync + std::fmt::Debug {
    /// `None` means the operation has no representable response.
    fn select<'a>(&self, operation: &'a Operation) -> Option<SelectedResponse<'a>>;
}

/// `200` with `application/json`, `text/json` or `text/plain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessSelector;

impl ResponseSelector for SuccessSelector {
    fn select<'a>(&self, operation: &'a Operation) -> Option<SelectedResponse<'a>> {
        let (status, response) = operation.responses.get_key_value(SUCCESS_STATUS)?;
        CONTENT_TYPE_PRIORITY.iter().find_map(|wanted| {
            response
                .content
                .get_key_value(*wanted)
                .map(|(content_type, schema)| SelectedResponse {
                    status: status.as_str(),
                    content_type: content_type.as_str(),
                    schema,
                })
        })
    }
}
