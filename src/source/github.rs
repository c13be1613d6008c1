//! Hosting API record source.
//!
//! Thin client for the hosting platform's pull-request listing endpoint:
//! `Link`-header pagination, token auth, and rate-limit waits derived from
//! the platform's own reset signal. The aggregation core never sees a
//! rate-limit response, only records or `SourceUnavailable`.

use super::{Detail, RawPull, RecordSource, RecordStream, RequestCounter, RequestTopic};
use crate::stats::StatsError;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt, stream};
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use std::collections::HashSet;

const LOG_TARGET: &str = "    github";
const PAGE_SIZE: u8 = 100;
const MAX_RATE_LIMIT_WAIT_SECS: i64 = 3600;
const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Rate limit information from response headers.
#[derive(Debug, Clone, Copy)]
struct RateLimitInfo {
    remaining: usize,
    reset_at: DateTime<Utc>,
}

/// Record source backed by the hosting platform's REST API.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: reqwest::Client,
    base_url: String,
    internal_users: HashSet<String>,
    counter: RequestCounter,
}

impl GithubSource {
    /// Create a new source with an optional personal access token.
    pub fn new(token: Option<&str>, base_url: impl Into<String>, internal_users: HashSet<String>, counter: RequestCounter) -> crate::Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        let mut builder = reqwest::Client::builder().user_agent("prstats");

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            builder = builder.default_headers(headers);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
            internal_users,
            counter,
        })
    }

    /// Base URL this source talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET, waiting out rate limits using the platform's reset
    /// signal. Non-retryable statuses and an exhausted retry budget become
    /// `SourceUnavailable`.
    async fn api_call(&self, repo: &str, url: &str) -> Result<reqwest::Response, StatsError> {
        let mut waits = 0u32;
        loop {
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| StatsError::unavailable(repo, format!("transport failure: {e}")))?;

            let rate_limit = extract_rate_limit_from_headers(resp.headers());
            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            if matches!(status.as_u16(), 403 | 429) {
                if waits >= MAX_RATE_LIMIT_RETRIES {
                    return Err(StatsError::unavailable(repo, "rate-limit retry budget exceeded"));
                }
                waits += 1;

                if let Some(rl) = rate_limit {
                    log::debug!(target: LOG_TARGET, "Rate limit for '{repo}': {} remaining, resets at {}", rl.remaining, rl.reset_at.format("%T"));
                }

                let now = Utc::now();
                let reset_at = rate_limit.map_or_else(|| now + chrono::Duration::minutes(1), |rl| rl.reset_at);
                let wait_until = reset_at.min(now + chrono::Duration::seconds(MAX_RATE_LIMIT_WAIT_SECS));
                let wait = (wait_until - now).to_std().unwrap_or(core::time::Duration::ZERO);

                log::warn!(target: LOG_TARGET, "Hit rate limit for '{repo}', waiting until {}", wait_until.format("%T"));
                tokio::time::sleep(wait).await;
                continue;
            }

            return Err(StatsError::unavailable(repo, format!("HTTP {status} from {url}")));
        }
    }

    /// Fetch one listing page. Returns the page and whether another follows.
    async fn pull_page(&self, repo: &str, page: u32) -> Result<(Vec<RawPull>, bool), StatsError> {
        let url = format!("{}/repos/{repo}/pulls?state=all&per_page={PAGE_SIZE}&page={page}", self.base_url);
        log::info!(target: LOG_TARGET, "Fetching pull requests for '{repo}' (page {page})");

        let resp = self.api_call(repo, &url).await?;
        self.counter.tally(RequestTopic::Pages);

        let has_next = resp
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|link| link.contains(r#"rel="next""#));

        let pulls: Vec<RawPull> = resp
            .json()
            .await
            .map_err(|e| StatsError::unavailable(repo, format!("malformed listing payload: {e}")))?;

        let has_next = has_next && !pulls.is_empty();
        Ok((pulls, has_next))
    }

    /// Resolve the changed-line count for one pull request.
    async fn fetch_changed_lines(&self, repo: &str, number: u64) -> Result<u64, StatsError> {
        let url = format!("{}/repos/{repo}/pulls/{number}", self.base_url);

        let result = self.api_call(repo, &url).await;
        self.counter.tally(RequestTopic::Details);

        // Any failure to resolve the detail leaves the record unweighable.
        let resp = result.map_err(|_| StatsError::MissingMetric { number })?;
        let detail: RawPullDetail = resp.json().await.map_err(|_| StatsError::MissingMetric { number })?;

        Ok(detail.additions + detail.deletions)
    }
}

impl RecordSource for GithubSource {
    fn fetch<'a>(&'a self, repo: &'a str, detail: Detail) -> RecordStream<'a> {
        let pages = stream::try_unfold(Some(1u32), move |page_num| async move {
            let Some(page) = page_num else {
                return Ok(None);
            };
            let (pulls, has_next) = self.pull_page(repo, page).await?;
            let next = has_next.then(|| page + 1);
            Ok(Some((stream::iter(pulls.into_iter().map(Ok::<RawPull, StatsError>)), next)))
        });

        pages
            .try_flatten()
            .and_then(move |raw: RawPull| async move {
                let mut record = raw.into_record(&self.internal_users);
                if detail == Detail::Full && record.changed_lines.is_none() {
                    record.changed_lines = Some(self.fetch_changed_lines(repo, record.number).await?);
                }
                Ok(record)
            })
            .boxed()
    }
}

#[derive(Debug, Deserialize)]
struct RawPullDetail {
    additions: u64,
    deletions: u64,
}

/// Extract rate limit information from API response headers.
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
