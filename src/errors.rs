//! Mapping error types
//!
//! Error codes:
//! - ROWSHAPE_SHAPE_ERROR
//! - ROWSHAPE_FIELD_NOT_FOUND
//! - ROWSHAPE_INVALID_TAG
//! - ROWSHAPE_INTERNAL_FAILURE
//!
//! Every fault raised while building a schema or grouping rows is returned
//! as a `MapError`. Nothing in the public API panics on malformed input.

use thiserror::Error;

/// Result type for mapping operations
pub type MapResult<T> = Result<T, MapError>;

/// Stable error codes, one per `MapError` variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapErrorCode {
    ShapeError,
    SchemaFieldNotFound,
    InvalidTag,
    InternalFailure,
}

impl MapErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            MapErrorCode::ShapeError => "ROWSHAPE_SHAPE_ERROR",
            MapErrorCode::SchemaFieldNotFound => "ROWSHAPE_FIELD_NOT_FOUND",
            MapErrorCode::InvalidTag => "ROWSHAPE_INVALID_TAG",
            MapErrorCode::InternalFailure => "ROWSHAPE_INTERNAL_FAILURE",
        }
    }
}

impl std::fmt::Display for MapErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the schema builder, the cache and the grouping engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// A type or value does not have the shape the mapping requires
    #[error("shape error at '{path}': {reason}")]
    Shape { path: String, reason: String },

    /// A tag segment names a field the destination type does not have
    #[error("field '{field}' not found on destination type '{record}'")]
    FieldNotFound { record: &'static str, field: String },

    /// A tag string could not be parsed
    #[error("invalid tag '{tag}' on source field '{field}': {reason}")]
    InvalidTag {
        field: String,
        tag: String,
        reason: String,
    },

    /// Any other structural failure
    #[error("internal failure: {0}")]
    Internal(String),
}

impl MapError {
    pub fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        MapError::Shape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn field_not_found(record: &'static str, field: impl Into<String>) -> Self {
        MapError::FieldNotFound {
            record,
            field: field.into(),
        }
    }

    pub fn invalid_tag(
        field: impl Into<String>,
        tag: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MapError::InvalidTag {
            field: field.into(),
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        MapError::Internal(reason.into())
    }

    /// Returns the error code
    pub fn code(&self) -> MapErrorCode {
        match self {
            MapError::Shape { .. } => MapErrorCode::ShapeError,
            MapError::FieldNotFound { .. } => MapErrorCode::SchemaFieldNotFound,
            MapError::InvalidTag { .. } => MapErrorCode::InvalidTag,
            MapError::Internal(_) => MapErrorCode::InternalFailure,
        }
    }
}
