use crate::source::{CombinedState, PullRecord};
use chrono::{DateTime, Utc};
use strum::{Display, EnumIter};

/// Internal/external origin of a pull request, derived upstream from author
/// affiliation and treated as opaque input here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    Internal,
    External,
}

/// Outcome of a pull request at snapshot time.
///
/// `Merged` and `Closed` are mutually exclusive terminal states; anything
/// still open is `Unresolved`. Re-running a report later can move records
/// from `Unresolved` to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Resolution {
    Merged,
    Closed,
    Unresolved,
}

/// The `(dimension, resolution)` pair for an in-scope record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub dimension: Dimension,
    pub resolution: Resolution,
}

/// Classify a record, or return `None` if it is out of scope.
///
/// A record is excluded entirely when it targets the `release` branch or an
/// `rc/` branch (case-sensitive), or when it was created strictly before
/// `start`. A record created exactly at `start` is included.
#[must_use]
pub fn classify(pull: &PullRecord, start: DateTime<Utc>) -> Option<Classification> {
    if pull.base_ref == "release" || pull.base_ref.starts_with("rc/") {
        return None;
    }

    if pull.created_at < start {
        return None;
    }

    let resolution = match pull.state {
        CombinedState::Merged => Resolution::Merged,
        CombinedState::Closed => Resolution::Closed,
        CombinedState::Open => Resolution::Unresolved,
    };

    Some(Classification {
        dimension: pull.dimension,
        resolution,
    })
}
