use thiserror::Error;

/// Failures that abort an aggregation run.
///
/// A run is all-or-nothing: any of these discards the partial bucket state,
/// since a report built from a partially drained source would silently break
/// the per-bucket invariants.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The record source could not be drained: transport exhausted, a
    /// non-retryable HTTP status, or the rate-limit retry budget used up.
    #[error("record source unavailable for '{repo}': {reason}")]
    SourceUnavailable { repo: String, reason: String },

    /// Line-count mode only: the changed-line count for a record could not
    /// be resolved. Never substituted with zero.
    #[error("no changed-line count available for pull request #{number}")]
    MissingMetric { number: u64 },
}

impl StatsError {
    /// Shorthand for a [`StatsError::SourceUnavailable`] with formatted context.
    pub fn unavailable(repo: &str, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            repo: repo.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_display() {
        let err = StatsError::unavailable("acme/widget", "HTTP 500");
        assert_eq!(err.to_string(), "record source unavailable for 'acme/widget': HTTP 500");
    }

    #[test]
    fn test_missing_metric_display() {
        let err = StatsError::MissingMetric { number: 42 };
        assert_eq!(err.to_string(), "no changed-line count available for pull request #42");
    }
}
