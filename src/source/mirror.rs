//! Pre-synced mirror record source.
//!
//! Alternate backend reading from a database mirror of the hosting
//! platform's pull-request records (exposed over a small JSON API with
//! offset pagination). Since the mirror is pre-synced there is no
//! rate-limit dance, and records carry their changed-line counts inline.

use super::{Detail, RawPull, RecordSource, RecordStream, RequestCounter, RequestTopic};
use crate::stats::StatsError;
use futures_util::{StreamExt, TryStreamExt, stream};
use std::collections::HashSet;

const LOG_TARGET: &str = "    mirror";
const PAGE_LIMIT: usize = 500;

/// Record source backed by a pre-synced mirror of pull-request records.
#[derive(Debug, Clone)]
pub struct MirrorSource {
    client: reqwest::Client,
    base_url: String,
    internal_users: HashSet<String>,
    counter: RequestCounter,
}

impl MirrorSource {
    pub fn new(base_url: impl Into<String>, internal_users: HashSet<String>, counter: RequestCounter) -> crate::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent("prstats").build()?,
            base_url: base_url.into(),
            internal_users,
            counter,
        })
    }

    /// Base URL of the mirror API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn pull_page(&self, repo: &str, offset: usize) -> Result<Vec<RawPull>, StatsError> {
        let url = format!("{}/repos/{repo}/pulls?offset={offset}&limit={PAGE_LIMIT}", self.base_url);
        log::info!(target: LOG_TARGET, "Fetching mirrored pull requests for '{repo}' (offset {offset})");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StatsError::unavailable(repo, format!("mirror transport failure: {e}")))?;
        self.counter.tally(RequestTopic::Pages);

        let status = resp.status();
        if !status.is_success() {
            return Err(StatsError::unavailable(repo, format!("HTTP {status} from mirror at {url}")));
        }

        resp.json()
            .await
            .map_err(|e| StatsError::unavailable(repo, format!("malformed mirror payload: {e}")))
    }
}

impl RecordSource for MirrorSource {
    fn fetch<'a>(&'a self, repo: &'a str, _detail: Detail) -> RecordStream<'a> {
        // The mirror stores full records, so the detail level changes
        // nothing: changed-line counts are either present or were never
        // synced, and the aggregator decides whether that matters.
        let pages = stream::try_unfold(Some(0usize), move |offset| async move {
            let Some(offset) = offset else {
                return Ok(None);
            };
            let pulls = self.pull_page(repo, offset).await?;
            let next = (pulls.len() == PAGE_LIMIT).then(|| offset + PAGE_LIMIT);
            Ok(Some((stream::iter(pulls.into_iter().map(Ok::<RawPull, StatsError>)), next)))
        });

        pages
            .try_flatten()
            .map_ok(move |raw| raw.into_record(&self.internal_users))
            .boxed()
    }
}
