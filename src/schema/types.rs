//! Schema tree definitions
//!
//! One `Schema` node per nesting level:
//! - primary key: source field identifying an entity at this level
//! - scalar mappings: source field index -> destination field name
//! - relations: child schemas, in first-encounter order
//! - element type: destination record instantiated at this level

use serde_json::{json, Value as JsonValue};

use crate::record::{RecordType, Value};

/// Primary-key identity of a level
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey {
    /// Source field name
    pub field: &'static str,
    /// Source field index
    pub index: usize,
    /// Zero value of the field's kind, the "no entity" sentinel
    pub zero: Value,
}

/// Copies one source field into one destination field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMapping {
    pub source_index: usize,
    pub source_field: &'static str,
    pub destination: String,
}

/// A nested relation and its child schema
#[derive(Debug, Clone)]
pub struct Relation {
    /// Destination field holding the child collection
    pub name: String,
    pub schema: Schema,
}

/// Mapping schema for one nesting level.
///
/// Immutable once published to a `SchemaCache`.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(super) primary_key: Option<PrimaryKey>,
    pub(super) scalars: Vec<ScalarMapping>,
    pub(super) relations: Vec<Relation>,
    pub(super) element: RecordType,
}

impl Schema {
    pub(super) fn new(element: RecordType) -> Self {
        Self {
            primary_key: None,
            scalars: Vec::new(),
            relations: Vec::new(),
            element,
        }
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.primary_key.as_ref()
    }

    pub fn scalars(&self) -> &[ScalarMapping] {
        &self.scalars
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn element(&self) -> &RecordType {
        &self.element
    }

    /// Child schema of the named relation
    pub fn relation(&self, name: &str) -> Option<&Schema> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.schema)
    }

    /// Number of levels, counting this one
    pub fn depth(&self) -> usize {
        1 + self
            .relations
            .iter()
            .map(|r| r.schema.depth())
            .max()
            .unwrap_or(0)
    }

    /// Renders the schema tree as JSON for inspection
    pub fn explain(&self) -> JsonValue {
        let primary_key = match &self.primary_key {
            Some(pk) => json!({
                "field": pk.field,
                "index": pk.index,
                "kind": pk.zero.kind(),
            }),
            None => JsonValue::Null,
        };

        let scalars: Vec<JsonValue> = self
            .scalars
            .iter()
            .map(|m| {
                json!({
                    "source": m.source_field,
                    "index": m.source_index,
                    "destination": m.destination,
                })
            })
            .collect();

        let relations: serde_json::Map<String, JsonValue> = self
            .relations
            .iter()
            .map(|r| (r.name.clone(), r.schema.explain()))
            .collect();

        json!({
            "element": self.element.name(),
            "primary_key": primary_key,
            "scalars": scalars,
            "relations": relations,
        })
    }
}
