//! Schema builder
//!
//! Walks the tagged fields of a source row type and builds the schema tree
//! against a destination record type. Every tag segment is resolved while
//! building, so a schema that builds successfully can always be grouped.

use tracing::warn;

use super::types::{PrimaryKey, Relation, ScalarMapping, Schema};
use crate::errors::{MapError, MapResult};
use crate::observability::Event;
use crate::record::{
    record_type, short_type_name, FieldShape, Record, RecordType, SourceField, SourceRow, Value,
};
use crate::tag::{parse_tag, TagSyntax};

/// Builds schemas for (source row, destination record) pairs
pub struct SchemaBuilder<'a> {
    syntax: &'a TagSyntax,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(syntax: &'a TagSyntax) -> Self {
        Self { syntax }
    }

    /// Builds the root schema mapping rows of `S` into records of `R`.
    pub fn build<S: SourceRow, R: Record>(&self) -> MapResult<Schema> {
        let mut root = Schema::new(record_type::<R>());

        for (index, field) in S::fields().iter().enumerate() {
            let raw = match field.tag {
                Some(raw) => raw,
                None => continue,
            };

            let tag = parse_tag(self.syntax, field.name, raw)?;
            if tag.is_ignored() {
                continue;
            }

            insert(&mut root, &tag.segments, tag.primary_key, index, field)
                .map_err(|e| annotate::<S>(e))?;
        }

        Ok(root)
    }
}

/// Adds one tagged source field below `node`, following `segments`.
fn insert(
    node: &mut Schema,
    segments: &[String],
    primary_key: bool,
    index: usize,
    field: &SourceField,
) -> MapResult<()> {
    match segments {
        [] => Ok(()),
        [name] => insert_scalar(node, name, primary_key, index, field),
        [first, rest @ ..] => {
            let position = match node.relations.iter().position(|r| &r.name == first) {
                Some(position) => position,
                None => {
                    let element = resolve_relation(node, first)?;
                    node.relations.push(Relation {
                        name: first.clone(),
                        schema: Schema::new(element),
                    });
                    node.relations.len() - 1
                }
            };

            insert(
                &mut node.relations[position].schema,
                rest,
                primary_key,
                index,
                field,
            )
        }
    }
}

fn insert_scalar(
    node: &mut Schema,
    name: &str,
    primary_key: bool,
    index: usize,
    field: &SourceField,
) -> MapResult<()> {
    let record = node.element.name();
    let destination = node
        .element
        .field(name)
        .ok_or_else(|| MapError::field_not_found(record, name))?;

    match destination.shape {
        FieldShape::Scalar(ty) if ty == field.ty => {}
        FieldShape::Scalar(ty) => {
            return Err(MapError::shape(
                format!("{}.{}", record, name),
                format!(
                    "source field '{}' is {} but destination is {}",
                    field.name, field.ty, ty
                ),
            ));
        }
        FieldShape::Relation(_) => {
            return Err(MapError::shape(
                format!("{}.{}", record, name),
                format!(
                    "source field '{}' maps a scalar onto a relation",
                    field.name
                ),
            ));
        }
    }

    if primary_key {
        if let Some(existing) = &node.primary_key {
            warn!(
                event = Event::DuplicatePrimaryKey.as_str(),
                record,
                kept = existing.field,
                ignored = field.name,
                "level already has a primary key"
            );
        } else {
            node.primary_key = Some(PrimaryKey {
                field: field.name,
                index,
                zero: Value::zero(field.ty.kind),
            });
        }
    }

    node.scalars.push(ScalarMapping {
        source_index: index,
        source_field: field.name,
        destination: name.to_string(),
    });

    Ok(())
}

fn resolve_relation(node: &Schema, name: &str) -> MapResult<RecordType> {
    let record = node.element.name();
    let destination = node
        .element
        .field(name)
        .ok_or_else(|| MapError::field_not_found(record, name))?;

    match destination.shape {
        FieldShape::Relation(element) => Ok(element()),
        FieldShape::Scalar(ty) => Err(MapError::shape(
            format!("{}.{}", record, name),
            format!("expected a relation, found {} scalar", ty),
        )),
    }
}

/// Prefixes shape errors with the source row type
fn annotate<S: SourceRow>(err: MapError) -> MapError {
    match err {
        MapError::Shape { path, reason } => MapError::Shape {
            path: format!("{}->{}", short_type_name::<S>(), path),
            reason,
        },
        other => other,
    }
}
