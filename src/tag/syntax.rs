//! Tag syntax configuration
//!
//! Defaults follow the mini-language:
//!
//! ```text
//! tag        := path ["," qualifier]
//! path       := segment ("__" segment)*
//! qualifier  := "pk"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{MapError, MapResult};

/// Delimiters and markers of the tag mini-language.
///
/// A schema cache is bound to one syntax for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSyntax {
    /// Separates relation segments in a path
    pub relation_delimiter: String,
    /// Separates the path from the qualifier
    pub qualifier_separator: char,
    /// Qualifier that marks a primary-key field
    pub primary_key_marker: String,
}

impl Default for TagSyntax {
    fn default() -> Self {
        Self {
            relation_delimiter: "__".to_string(),
            qualifier_separator: ',',
            primary_key_marker: "pk".to_string(),
        }
    }
}

impl TagSyntax {
    /// Rejects syntaxes that cannot be parsed unambiguously
    pub fn validate(&self) -> MapResult<()> {
        if self.relation_delimiter.is_empty() {
            return Err(MapError::internal("relation delimiter must not be empty"));
        }
        if self.primary_key_marker.is_empty() {
            return Err(MapError::internal("primary-key marker must not be empty"));
        }
        if self.relation_delimiter.contains(self.qualifier_separator) {
            return Err(MapError::internal(format!(
                "relation delimiter '{}' contains the qualifier separator '{}'",
                self.relation_delimiter, self.qualifier_separator
            )));
        }
        if self.qualifier_separator.is_whitespace()
            || self.relation_delimiter.chars().any(char::is_whitespace)
        {
            return Err(MapError::internal(
                "tag delimiters must not contain whitespace",
            ));
        }
        Ok(())
    }
}
