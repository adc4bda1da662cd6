//! Engagement history: per-event invocation counts and timestamps.
//!
//! Keys live in two disjoint namespaces (code points and interactions). Counts
//! are reset, but keys kept, whenever the host app's version or build changes.

mod model;

pub use model::{Engagement, EngagementNamespace, EngagementRecord};
