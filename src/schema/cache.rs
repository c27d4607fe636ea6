//! Schema cache
//!
//! Registry of built schemas keyed by (source row type, destination type).
//!
//! - Lookups take the read lock only
//! - A miss takes the write lock, re-checks for a racing publisher, then
//!   builds and publishes, so each key is built exactly once
//! - Published schemas are immutable and never evicted
//! - A failed build publishes nothing
//! - A panic inside a descriptor becomes an `Internal` error; the map is
//!   only written after a successful build, so a poisoned guard is still
//!   consistent and is recovered

use std::any::TypeId;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use super::builder::SchemaBuilder;
use super::types::Schema;
use crate::errors::{MapError, MapResult};
use crate::observability::{CacheMetrics, CacheStats, Event};
use crate::record::{short_type_name, Record, SourceRow};
use crate::tag::TagSyntax;

type SchemaKey = (TypeId, TypeId);

static GLOBAL: OnceLock<SchemaCache> = OnceLock::new();

/// Build-once registry of mapping schemas
#[derive(Debug, Default)]
pub struct SchemaCache {
    syntax: TagSyntax,
    schemas: RwLock<HashMap<SchemaKey, Arc<Schema>>>,
    metrics: CacheMetrics,
}

impl SchemaCache {
    /// Creates an empty cache using the default tag syntax
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache bound to a custom tag syntax
    pub fn with_syntax(syntax: TagSyntax) -> MapResult<Self> {
        syntax.validate()?;
        Ok(Self {
            syntax,
            ..Self::default()
        })
    }

    /// The process-wide shared cache
    pub fn global() -> &'static SchemaCache {
        GLOBAL.get_or_init(SchemaCache::new)
    }

    pub fn syntax(&self) -> &TagSyntax {
        &self.syntax
    }

    /// Returns the schema for `S -> R` if it has been published
    pub fn get<S: SourceRow, R: Record>(&self) -> MapResult<Option<Arc<Schema>>> {
        Ok(self.read().get(&key::<S, R>()).cloned())
    }

    /// Returns the schema for `S -> R`, building and publishing it on first use
    pub fn get_or_build<S: SourceRow, R: Record>(&self) -> MapResult<Arc<Schema>> {
        let key = key::<S, R>();

        if let Some(schema) = self.read().get(&key) {
            self.metrics.increment_hits();
            return Ok(Arc::clone(schema));
        }

        let mut schemas = self.write();

        // Another caller may have published while we waited for the write lock.
        if let Some(schema) = schemas.get(&key) {
            self.metrics.increment_hits();
            return Ok(Arc::clone(schema));
        }

        self.metrics.increment_misses();

        let source = short_type_name::<S>();
        let record = R::name();
        info!(event = Event::SchemaBuildStart.as_str(), source, record);

        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            SchemaBuilder::new(&self.syntax).build::<S, R>()
        }))
        .unwrap_or_else(|_| {
            Err(MapError::internal(format!(
                "schema build for {} -> {} panicked",
                source, record
            )))
        });

        match built {
            Ok(schema) => {
                let schema = Arc::new(schema);
                schemas.insert(key, Arc::clone(&schema));
                self.metrics.increment_builds();
                info!(
                    event = Event::SchemaPublished.as_str(),
                    source,
                    record,
                    depth = schema.depth(),
                    cached = schemas.len(),
                );
                Ok(schema)
            }
            Err(err) => {
                self.metrics.increment_build_failures();
                warn!(
                    event = Event::SchemaBuildFailed.as_str(),
                    source,
                    record,
                    code = err.code().code(),
                    error = %err,
                );
                Err(err)
            }
        }
    }

    pub fn contains<S: SourceRow, R: Record>(&self) -> MapResult<bool> {
        Ok(self.get::<S, R>()?.is_some())
    }

    /// Number of published schemas
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SchemaKey, Arc<Schema>>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SchemaKey, Arc<Schema>>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key<S: SourceRow, R: Record>() -> SchemaKey {
    (TypeId::of::<S>(), TypeId::of::<R>())
}
