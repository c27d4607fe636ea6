//! Observability for rowshape
//!
//! - Structured events through the `tracing` facade; the library never
//!   installs a subscriber
//! - Lock-free counters for the schema cache
//!
//! # Usage
//!
//! ```ignore
//! use rowshape::observability::Event;
//!
//! tracing::info!(event = Event::SchemaPublished.as_str(), record = "Class");
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{CacheMetrics, CacheStats};
