use super::bucket::{BucketKey, Granularity, bucket};
use super::classify::{Dimension, classify};
use super::counters::{BucketCounters, Direction};
use super::error::StatsError;
use crate::source::PullRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const LOG_TARGET: &str = " aggregate";

/// What each record contributes to its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMode {
    /// Each pull request counts as 1.
    Count,
    /// Each pull request counts as its number of changed lines.
    Lines,
}

/// Stateful accumulator mapping buckets to counters.
///
/// One aggregator serves a whole run: record sequences from multiple
/// repositories are drained into the same state without resetting between
/// them, so cross-repository totals are additive. Records are consumed one
/// at a time in a single forward pass; nothing is materialized beyond the
/// bucket table itself.
#[derive(Debug)]
pub struct Aggregator {
    granularity: Granularity,
    start: DateTime<Utc>,
    weight: WeightMode,
    dimension: Option<Dimension>,
    buckets: BTreeMap<BucketKey, BucketCounters>,
}

impl Aggregator {
    /// Create an empty aggregator.
    ///
    /// `dimension` restricts the run to records of one origin; `None` counts
    /// both internal and external records into the same state.
    #[must_use]
    pub const fn new(granularity: Granularity, start: DateTime<Utc>, weight: WeightMode, dimension: Option<Dimension>) -> Self {
        Self {
            granularity,
            start,
            weight,
            dimension,
            buckets: BTreeMap::new(),
        }
    }

    /// Accumulate one record. Excluded records are a no-op.
    ///
    /// # Errors
    ///
    /// In [`WeightMode::Lines`], a record without a resolvable changed-line
    /// count aborts the run with [`StatsError::MissingMetric`]. Substituting
    /// zero would break the opened = merged + closed + unresolved invariant.
    pub fn record(&mut self, pull: &PullRecord) -> Result<(), StatsError> {
        let Some(classification) = classify(pull, self.start) else {
            log::debug!(target: LOG_TARGET, "Ignoring pull request #{} targeting '{}'", pull.number, pull.base_ref);
            return Ok(());
        };

        if self.dimension.is_some_and(|dim| dim != classification.dimension) {
            return Ok(());
        }

        let increment = match self.weight {
            WeightMode::Count => 1,
            WeightMode::Lines => pull.changed_lines.ok_or(StatsError::MissingMetric { number: pull.number })?,
        };

        let key = bucket(pull.created_at, self.granularity);
        let counters = self.buckets.entry(key).or_default();
        counters.add(Direction::Opened, classification.dimension, increment);
        counters.add(classification.resolution.into(), classification.dimension, increment);

        Ok(())
    }

    /// Number of distinct buckets touched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Consume the aggregator and hand the bucket table to the reporter.
    /// Iteration order is chronological by period start.
    #[must_use]
    pub fn into_buckets(self) -> BTreeMap<BucketKey, BucketCounters> {
        self.buckets
    }
}
