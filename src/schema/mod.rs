//! Schema inference for rowshape
//!
//! A schema is inferred from the field tags of a source row type and
//! resolved against a destination record type. It is built once per
//! (source, destination) pair and shared through a `SchemaCache`.
//!
//! # Invariants
//!
//! - Built exactly once per key, immutable once published
//! - Every tag segment resolves against the destination type at build time
//! - Failed builds are never published

mod builder;
mod cache;
mod types;

pub use builder::SchemaBuilder;
pub use cache::SchemaCache;
pub use types::{PrimaryKey, Relation, ScalarMapping, Schema};
