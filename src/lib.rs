//! rowshape - tag-driven mapping of flat joined rows into nested records
//!
//! A source row type tags its fields with relation paths
//! (`"users__pkgs__nick_name, pk"`). On first use the tags are resolved
//! against the destination record type into a schema, which is cached per
//! type pair. Rows are then grouped level by level into ordered,
//! deduplicated collections.

pub mod errors;
pub mod grouping;
pub mod mapper;
pub mod observability;
pub mod record;
pub mod schema;
pub mod tag;

pub use errors::{MapError, MapErrorCode, MapResult};
pub use mapper::{map, Mapper};
pub use record::{Record, SourceRow, Value, ValueKind};
pub use schema::{Schema, SchemaCache};
pub use tag::TagSyntax;
