//! Field tag mini-language
//!
//! ```text
//! tag        := path ["," qualifier]
//! path       := segment ("__" segment)*
//! qualifier  := "pk"
//! ```
//!
//! Segments are matched case-sensitively against destination field names
//! at the corresponding nesting depth.

mod parser;
mod syntax;

pub use parser::{parse_tag, ParsedTag};
pub use syntax::TagSyntax;
