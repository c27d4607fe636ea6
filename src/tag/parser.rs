//! Tag parser
//!
//! `"users__pkgs__nick_name, pk"` parses to segments
//! `["users", "pkgs", "nick_name"]` with the primary-key flag set.

use regex::Regex;
use std::sync::OnceLock;

use super::syntax::TagSyntax;
use crate::errors::{MapError, MapResult};

const SEGMENT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static SEGMENT: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn segment_pattern() -> MapResult<&'static Regex> {
    SEGMENT
        .get_or_init(|| Regex::new(SEGMENT_PATTERN))
        .as_ref()
        .map_err(|e| MapError::internal(format!("segment pattern failed to compile: {}", e)))
}

/// A parsed field tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTag {
    /// Relation path; the last segment is the destination field
    pub segments: Vec<String>,
    /// Whether the field is the primary key of its level
    pub primary_key: bool,
}

impl ParsedTag {
    /// An empty path means the field is not mapped
    pub fn is_ignored(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the field belongs to the level it is declared on
    pub fn is_scalar(&self) -> bool {
        self.segments.len() == 1
    }
}

/// Parses a raw tag attached to the source field `field`.
///
/// Whitespace anywhere in the tag is ignored. Unknown qualifiers are
/// ignored; empty or non-identifier segments are rejected.
pub fn parse_tag(syntax: &TagSyntax, field: &str, raw: &str) -> MapResult<ParsedTag> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let (path, qualifier) = match compact.split_once(syntax.qualifier_separator) {
        Some((path, qualifier)) => (path, Some(qualifier)),
        None => (compact.as_str(), None),
    };

    let primary_key = qualifier == Some(syntax.primary_key_marker.as_str());

    if path.is_empty() {
        if primary_key {
            return Err(MapError::invalid_tag(
                field,
                raw,
                "primary-key marker without a path",
            ));
        }
        return Ok(ParsedTag::default());
    }

    let pattern = segment_pattern()?;
    let mut segments = Vec::new();
    for segment in path.split(syntax.relation_delimiter.as_str()) {
        if segment.is_empty() {
            return Err(MapError::invalid_tag(field, raw, "empty segment"));
        }
        if !pattern.is_match(segment) {
            return Err(MapError::invalid_tag(
                field,
                raw,
                format!("segment '{}' is not an identifier", segment),
            ));
        }
        segments.push(segment.to_string());
    }

    Ok(ParsedTag {
        segments,
        primary_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> MapResult<ParsedTag> {
        parse_tag(&TagSyntax::default(), "field", raw)
    }

    #[test]
    fn test_nested_primary_key() {
        let tag = parse("Users__Pkgs__NickName, pk").unwrap();
        assert_eq!(tag.segments, vec!["Users", "Pkgs", "NickName"]);
        assert!(tag.primary_key);
        assert!(!tag.is_scalar());
    }

    #[test]
    fn test_plain_field() {
        let tag = parse("name").unwrap();
        assert_eq!(tag.segments, vec!["name"]);
        assert!(!tag.primary_key);
        assert!(tag.is_scalar());
    }

    #[test]
    fn test_whitespace_is_stripped() {
        let tag = parse("  users __ id ,  pk ").unwrap();
        assert_eq!(tag.segments, vec!["users", "id"]);
        assert!(tag.primary_key);
    }

    #[test]
    fn test_empty_tag_is_ignored() {
        assert!(parse("").unwrap().is_ignored());
        assert!(parse("   ").unwrap().is_ignored());
    }

    #[test]
    fn test_unknown_qualifier_ignored() {
        let tag = parse("id, key").unwrap();
        assert_eq!(tag.segments, vec!["id"]);
        assert!(!tag.primary_key);
    }

    #[test]
    fn test_empty_segment_rejected() {
        let err = parse("users____name").unwrap_err();
        assert!(matches!(err, MapError::InvalidTag { .. }));

        let err = parse("users__").unwrap_err();
        assert!(matches!(err, MapError::InvalidTag { .. }));
    }

    #[test]
    fn test_non_identifier_rejected() {
        let err = parse("users__first-name").unwrap_err();
        assert!(matches!(err, MapError::InvalidTag { .. }));
    }

    #[test]
    fn test_marker_without_path_rejected() {
        let err = parse(", pk").unwrap_err();
        assert!(matches!(err, MapError::InvalidTag { .. }));
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = TagSyntax {
            relation_delimiter: ".".to_string(),
            qualifier_separator: ';',
            primary_key_marker: "key".to_string(),
        };
        let tag = parse_tag(&syntax, "field", "users.pets.name; key").unwrap();
        assert_eq!(tag.segments, vec!["users", "pets", "name"]);
        assert!(tag.primary_key);
    }
}
