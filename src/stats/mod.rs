//! The aggregation core: date bucketing, record classification, and
//! per-bucket counter accumulation.
//!
//! # Implementation Model
//!
//! Each pull-request record flows through three pure steps:
//!
//! 1. [`classify`](classify::classify) decides whether the record is in
//!    scope and derives its `(dimension, resolution)` pair
//! 2. [`bucket`](bucket::bucket) maps the record's creation time to a
//!    [`BucketKey`](bucket::BucketKey) for the configured granularity
//! 3. [`Aggregator`](aggregate::Aggregator) increments the typed counters
//!    for that bucket
//!
//! The aggregation state is a `BTreeMap` keyed by bucket, so a single
//! aggregator can drain any number of record sequences (one per repository)
//! and always emits buckets in chronological order. The per-bucket invariant
//! is that, for each dimension, the `opened` counter equals the sum of the
//! `merged`, `closed`, and `unresolved` counters.

mod aggregate;
mod bucket;
mod classify;
mod counters;
mod error;

pub use aggregate::{Aggregator, WeightMode};
pub use bucket::{BucketKey, Granularity, bucket};
pub use classify::{Classification, Dimension, Resolution, classify};
pub use counters::{BucketCounters, Direction, column_label, columns};
pub use error::StatsError;
