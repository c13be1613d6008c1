//! Report generation for bucketed pull-request statistics.
//!
//! Both renderers take the aggregation result as-is: a column layout plus
//! buckets already in chronological order. They never reorder or recompute.

pub mod console;
pub mod csv;
