//! Grouping engine
//!
//! Turns a flat, join-shaped row sequence into nested records.
//!
//! # Execution (per schema level)
//!
//! 1. Scan rows in order, keyed by the level's primary key
//! 2. Skip rows whose key is the zero value of its kind
//! 3. First sighting of a key creates the element from that row
//! 4. Every row of a key is appended to each relation bucket
//! 5. Recurse into each relation bucket, group by group
//! 6. Emit elements in first-occurrence order
//!
//! # Invariants
//!
//! - Output order is first-occurrence order, never sorted
//! - One element per distinct non-zero key per level
//! - Grouping state is per call; nothing is shared between calls

mod engine;

pub use engine::group_rows;
