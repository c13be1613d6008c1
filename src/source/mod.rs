//! Pull-request record sources.
//!
//! A record source produces a lazy, finite sequence of [`PullRecord`]s for a
//! named repository. Pagination, authentication, and rate-limit waits are
//! internal to the source; the aggregation core only ever sees records or a
//! [`StatsError::SourceUnavailable`].

mod github;
mod mirror;

use crate::stats::{Dimension, StatsError};
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use futures_util::stream::BoxStream;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

pub use github::GithubSource;
pub use mirror::MirrorSource;

const LOG_TARGET: &str = "    source";

/// How much of each record to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Listing fields only; `changed_lines` may be absent.
    List,
    /// Also resolve the changed-line count, which may cost one extra
    /// request per record.
    Full,
}

/// The hosting platform's reported status of a pull request at query time.
///
/// `Merged` and `Closed` are mutually exclusive by construction: a merged
/// pull request is never reported as merely closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedState {
    Open,
    Closed,
    Merged,
}

/// One pull request, as consumed by the aggregation core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRecord {
    pub number: u64,
    /// Creation time, normalized to UTC at the parse boundary.
    pub created_at: DateTime<Utc>,
    pub state: CombinedState,
    pub dimension: Dimension,
    /// Name of the branch the pull request merges into.
    pub base_ref: String,
    /// Changed-line count (additions + deletions), when resolvable.
    pub changed_lines: Option<u64>,
}

/// A lazily produced sequence of records; one forward pass is sufficient.
pub type RecordStream<'a> = BoxStream<'a, Result<PullRecord, StatsError>>;

/// Producer of pull-request records for a repository.
pub trait RecordSource {
    /// Fetch all pull requests of `repo` (`owner/name`), every state.
    fn fetch<'a>(&'a self, repo: &'a str, detail: Detail) -> RecordStream<'a>;
}

/// Wire shape shared by the hosting API and the mirror backend (the mirror
/// stores the hosting platform's JSON verbatim).
#[derive(Debug, Deserialize)]
pub(crate) struct RawPull {
    number: u64,
    created_at: DateTime<Utc>,
    state: RawState,
    merged_at: Option<DateTime<Utc>>,
    base: RawRef,
    user: Option<RawUser>,
    additions: Option<u64>,
    deletions: Option<u64>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum RawState {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

impl RawPull {
    const fn number(&self) -> u64 {
        self.number
    }

    /// Derive the combined state: a populated `merged_at` wins over `closed`.
    const fn state(&self) -> CombinedState {
        if self.merged_at.is_some() {
            CombinedState::Merged
        } else {
            match self.state {
                RawState::Closed => CombinedState::Closed,
                RawState::Open => CombinedState::Open,
            }
        }
    }

    fn changed_lines(&self) -> Option<u64> {
        match (self.additions, self.deletions) {
            (Some(a), Some(d)) => Some(a + d),
            _ => None,
        }
    }

    /// Convert to a core record, tagging internal/external from the
    /// configured author set.
    fn into_record(self, internal_users: &HashSet<String>) -> PullRecord {
        let state = self.state();
        let changed_lines = self.changed_lines();
        let dimension = match &self.user {
            Some(user) if internal_users.contains(&user.login) => Dimension::Internal,
            _ => Dimension::External,
        };

        PullRecord {
            number: self.number,
            created_at: self.created_at.with_timezone(&Utc),
            state,
            dimension,
            base_ref: self.base.ref_name,
            changed_lines,
        }
    }
}

/// Request topics tallied by [`RequestCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTopic {
    /// Listing pages fetched.
    Pages,
    /// Per-record detail fetches.
    Details,
}

impl RequestTopic {
    const fn name(self) -> &'static str {
        match self {
            Self::Pages => "page",
            Self::Details => "detail",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    const fn all() -> [Self; 2] {
        [Self::Pages, Self::Details]
    }
}

/// Explicit per-run tally of requests a record source has made.
///
/// Constructed at the start of a run, handed to each source, and torn down
/// with the run. Cloning shares the underlying counters.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter {
    counts: Arc<[AtomicU64; 2]>,
}

impl RequestCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request for the topic.
    pub fn tally(&self, topic: RequestTopic) {
        let _ = self.counts[topic.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Count so far for a topic.
    #[must_use]
    pub fn count(&self, topic: RequestTopic) -> u64 {
        self.counts[topic.index()].load(Ordering::Relaxed)
    }

    /// Total across all topics.
    #[must_use]
    pub fn total(&self) -> u64 {
        RequestTopic::all().iter().map(|&topic| self.count(topic)).sum()
    }

    /// Log the per-topic breakdown at the end of a run.
    pub fn log_summary(&self) {
        let parts: Vec<String> = RequestTopic::all()
            .iter()
            .map(|&topic| format!("{} {} request(s)", self.count(topic), topic.name()))
            .collect();
        log::info!(target: LOG_TARGET, "Completed {} in total: {}", self.total(), parts.join(", "));
    }
}
