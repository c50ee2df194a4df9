//! Recursive JSON value synthesis for schema nodes.
//!
//! # Resolution order at every node
//! 1. Non-empty `properties` → inline object (a reference id is ignored)
//! 2. `reference_id` → registry lookup, guarded by the visited stack
//! 3. Dispatch on `kind`
//!
//! Nothing in here returns an error. Shapes the synthesizer does not
//! understand become `null` or an empty container.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Number, Value};

use crate::routing::PathParams;
use crate::spec::model::{SchemaKind, SchemaNode};
use crate::spec::registry::SchemaRegistry;
use crate::synth::heuristics::{HeuristicTable, SAMPLE_EMAIL};

/// Nodes deeper than this synthesize to `null`.
pub const MAX_DEPTH: usize = 20;

/// Fallback for strings no format or heuristic covers.
pub const PLACEHOLDER_TEXT: &str = "Sample Text";

/// Value for `integer` / `int64`.
pub const SAMPLE_INT64: i64 = 1_234_567_890;

/// Value for `number` / `float`.
pub const SAMPLE_FLOAT: f64 = 123.45;

/// Builds example values for one request.
///
/// Holds its own random source, so a synthesizer is never shared between
/// requests. Seeding `rng` makes the output reproducible apart from the
/// current-time formats.
pub struct Synthesizer<'a, R> {
    registry: &'a SchemaRegistry,
    heuristics: &'a HeuristicTable,
    rng: R,
}

impl<'a, R: Rng> Synthesizer<'a, R> {
    pub fn new(registry: &'a SchemaRegistry, heuristics: &'a HeuristicTable, rng: R) -> Self {
        Self {
            registry,
            heuristics,
            rng,
        }
    }

    /// Synthesize a value for a root node.
    pub fn generate(&mut self, node: &SchemaNode, overrides: Option<&PathParams>) -> Value {
        let mut visited = Vec::new();
        self.synthesize(node, 0, &mut visited, overrides, None)
    }

    /// Synthesize `node` at `depth`.
    ///
    /// `visited` holds the reference ids resolved on the path from the root
    /// to this node. Ids are pushed before descending into a reference and
    /// popped afterwards, so sibling branches may resolve the same id.
    pub fn synthesize(
        &mut self,
        node: &SchemaNode,
        depth: usize,
        visited: &mut Vec<String>,
        overrides: Option<&PathParams>,
        property_name: Option<&str>,
    ) -> Value {
        if depth > MAX_DEPTH {
            return Value::Null;
        }

        if !node.properties.is_empty() {
            return self.object(node, depth, visited, overrides);
        }

        if let Some(id) = node.reference_id.as_deref() {
            return self.reference(id, depth, visited, overrides, property_name);
        }

        match node.kind {
            SchemaKind::String => self.string(node, property_name),
            SchemaKind::Integer => self.integer(node),
            SchemaKind::Number => self.number(node),
            SchemaKind::Boolean => Value::Bool(self.rng.gen_bool(0.5)),
            SchemaKind::Array => self.array(node, depth, visited, overrides),
            SchemaKind::Object => Value::Object(Map::new()),
            SchemaKind::Reference | SchemaKind::Unknown => Value::Null,
        }
    }

    fn reference(
        &mut self,
        id: &str,
        depth: usize,
        visited: &mut Vec<String>,
        overrides: Option<&PathParams>,
        property_name: Option<&str>,
    ) -> Value {
        if visited.iter().any(|seen| seen == id) {
            tracing::trace!(reference = %id, depth, "Breaking schema cycle");
            return Value::Null;
        }

        let registry = self.registry;
        let Some(target) = registry.resolve(id) else {
            tracing::trace!(reference = %id, "Unresolvable schema reference");
            return Value::Null;
        };

        visited.push(id.to_string());
        let value = self.synthesize(target, depth, visited, overrides, property_name);
        visited.pop();
        value
    }

    fn object(
        &mut self,
        node: &SchemaNode,
        depth: usize,
        visited: &mut Vec<String>,
        overrides: Option<&PathParams>,
    ) -> Value {
        let mut map = Map::with_capacity(node.properties.len());
        for (name, child) in &node.properties {
            let value = match self.override_value(name, child, overrides) {
                Some(value) => value,
                None => self.synthesize(child, depth + 1, visited, overrides, Some(name)),
            };
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }

    /// Path-parameter echo for `...Id` properties.
    fn override_value(&self, name: &str, child: &SchemaNode, overrides: Option<&PathParams>) -> Option<Value> {
        if !ends_with_id(name) {
            return None;
        }
        let raw = overrides?.get(name)?;

        if self.registry.effective_kind(child).is_numeric() {
            Some(coerce_numeric(raw))
        } else {
            Some(Value::String(raw.to_string()))
        }
    }

    fn array(
        &mut self,
        node: &SchemaNode,
        depth: usize,
        visited: &mut Vec<String>,
        overrides: Option<&PathParams>,
    ) -> Value {
        let Some(items) = node.items.as_deref() else {
            return Value::Array(Vec::new());
        };

        let count = self.rng.gen_range(1..=3);
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.synthesize(items, depth + 1, visited, overrides, None));
        }
        Value::Array(values)
    }

    fn string(&mut self, node: &SchemaNode, property_name: Option<&str>) -> Value {
        let text = match node.format() {
            Some("date-time") => Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            Some("date") => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            Some("uuid") => uuid::Builder::from_random_bytes(self.rng.gen())
                .into_uuid()
                .to_string(),
            Some("email") => SAMPLE_EMAIL.to_string(),
            _ => property_name
                .and_then(|name| self.heuristics.lookup(name))
                .unwrap_or_else(|| PLACEHOLDER_TEXT.to_string()),
        };
        Value::String(text)
    }

    fn integer(&mut self, node: &SchemaNode) -> Value {
        match node.format() {
            Some("int64") => Value::from(SAMPLE_INT64),
            _ => Value::from(self.rng.gen_range(1i64..1000)),
        }
    }

    fn number(&mut self, node: &SchemaNode) -> Value {
        match node.format() {
            Some("float") => Value::from(SAMPLE_FLOAT),
            _ => {
                let raw: f64 = self.rng.gen_range(0.0..1000.0);
                // rounding can land on 1000.00, which is outside the range
                let rounded = ((raw * 100.0).round() / 100.0).min(999.99);
                Value::from(rounded)
            }
        }
    }
}

/// `id`, `orderId`, `CUSTOMERID`, ...
fn ends_with_id(name: &str) -> bool {
    name.len() >= 2
        && name
            .get(name.len() - 2..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case("id"))
}

/// Integer, then float, then the raw string.
fn coerce_numeric(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
