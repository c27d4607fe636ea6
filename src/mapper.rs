//! Public mapping entry points
//!
//! ```
//! rowshape::record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct User {
//!         pub id: i64,
//!         pub name: String,
//!     }
//! }
//!
//! rowshape::record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Class {
//!         pub id: i64,
//!     }
//!     relations {
//!         pub users: User,
//!     }
//! }
//!
//! rowshape::source_row! {
//!     pub struct ClassUserRow {
//!         #[tag = "id, pk"]
//!         pub id: i64,
//!         #[tag = "users__id, pk"]
//!         pub user_id: i64,
//!         #[tag = "users__name"]
//!         pub user_name: String,
//!     }
//! }
//!
//! let rows = vec![
//!     ClassUserRow { id: 1, user_id: 7, user_name: "ann".into() },
//!     ClassUserRow { id: 1, user_id: 8, user_name: "bob".into() },
//! ];
//!
//! let mut classes: Vec<Class> = Vec::new();
//! rowshape::map(&rows, &mut classes).unwrap();
//!
//! assert_eq!(classes.len(), 1);
//! assert_eq!(classes[0].users.len(), 2);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{MapError, MapResult};
use crate::grouping::group_rows;
use crate::observability::Event;
use crate::record::{short_type_name, take_records, FieldData, Record, SourceRow};
use crate::schema::{Schema, SchemaCache};

/// Maps rows through a specific schema cache
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'c> {
    cache: &'c SchemaCache,
}

impl<'c> Mapper<'c> {
    pub fn new(cache: &'c SchemaCache) -> Self {
        Self { cache }
    }

    /// Mapper over the process-wide shared cache
    pub fn shared() -> Mapper<'static> {
        Mapper::new(SchemaCache::global())
    }

    pub fn cache(&self) -> &'c SchemaCache {
        self.cache
    }

    /// Returns the schema used for `S -> R`, building it if needed
    pub fn schema<S: SourceRow, R: Record>(&self) -> MapResult<Arc<Schema>> {
        self.cache.get_or_build::<S, R>()
    }

    /// Groups `rows` into nested `R` records and stores them in `out`.
    ///
    /// `out` is replaced on success and left untouched on error.
    pub fn map<S: SourceRow, R: Record>(&self, rows: &[S], out: &mut Vec<R>) -> MapResult<()> {
        let refs: Vec<&S> = rows.iter().collect();
        self.map_refs(&refs, out)
    }

    /// Same as `map` for a sequence of row references
    pub fn map_refs<S: SourceRow, R: Record>(
        &self,
        rows: &[&S],
        out: &mut Vec<R>,
    ) -> MapResult<()> {
        let source = short_type_name::<S>();
        let record = R::name();
        debug!(
            event = Event::MapStart.as_str(),
            source,
            record,
            rows = rows.len()
        );

        let result = self
            .cache
            .get_or_build::<S, R>()
            .and_then(|schema| {
                panic::catch_unwind(AssertUnwindSafe(|| group_rows(&schema, rows)))
                    .unwrap_or_else(|_| {
                        Err(MapError::internal(format!(
                            "grouping {} rows into {} panicked",
                            source, record
                        )))
                    })
            })
            .and_then(|elements| take_records::<R>(record, "*", FieldData::Records(elements)));

        match result {
            Ok(records) => {
                *out = records;
                debug!(
                    event = Event::MapComplete.as_str(),
                    source,
                    record,
                    groups = out.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = Event::MapFailed.as_str(),
                    source,
                    record,
                    code = err.code().code(),
                    error = %err,
                );
                Err(err)
            }
        }
    }
}

/// Groups `rows` into `out` using the shared schema cache
pub fn map<S: SourceRow, R: Record>(rows: &[S], out: &mut Vec<R>) -> MapResult<()> {
    Mapper::shared().map(rows, out)
}
