//! Observable events
//!
//! Every log line emitted by rowshape carries one of these names in its
//! `event` field. Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Schema lifecycle
    /// Schema build started after a cache miss
    SchemaBuildStart,
    /// Schema built and published to the cache
    SchemaPublished,
    /// Schema build failed, nothing published
    SchemaBuildFailed,
    /// A second primary key was declared on one level and ignored
    DuplicatePrimaryKey,

    // Mapping calls
    /// Mapping call begins
    MapStart,
    /// Mapping call produced its output
    MapComplete,
    /// Mapping call returned an error
    MapFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaBuildStart => "SCHEMA_BUILD_BEGIN",
            Event::SchemaPublished => "SCHEMA_PUBLISHED",
            Event::SchemaBuildFailed => "SCHEMA_BUILD_FAILED",
            Event::DuplicatePrimaryKey => "SCHEMA_DUPLICATE_PK",

            Event::MapStart => "MAP_BEGIN",
            Event::MapComplete => "MAP_COMPLETE",
            Event::MapFailed => "MAP_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SchemaBuildFailed | Event::MapFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
