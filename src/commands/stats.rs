//! The stats command: fetch, aggregate, report.

use super::Host;
use super::common::{CommonArgs, init_logging};
use crate::Result;
use crate::config::RepoConfig;
use crate::report;
use crate::source::{Detail, GithubSource, MirrorSource, RecordSource, RequestCounter};
use crate::stats::{Aggregator, Dimension, Granularity, WeightMode, columns};
use camino::Utf8PathBuf;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use futures_util::TryStreamExt;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

const GITHUB_API_URL: &str = "https://api.github.com";
const LOG_TARGET: &str = "     stats";

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Bucket by ISO week instead of by month
    #[arg(long, conflicts_with = "quarterly")]
    pub weekly: bool,

    /// Bucket by calendar quarter instead of by month
    #[arg(long)]
    pub quarterly: bool,

    /// Count only pull requests from internal authors
    #[arg(long, conflicts_with = "external")]
    pub internal: bool,

    /// Count only pull requests from external authors
    #[arg(long)]
    pub external: bool,

    /// Weight each pull request by its changed-line count instead of counting it once
    #[arg(long)]
    pub lines: bool,

    /// Ignore pull requests created before this UTC date
    /// (e.g. 2014-12-25, 20141225, 12/25/2014, or Dec/25/2014)
    #[arg(long, value_name = "DATE", default_value = "2013-06-01", value_parser = parse_start)]
    pub start: DateTime<Utc>,

    /// Read records from a pre-synced mirror at this base URL instead of the hosting API
    #[arg(long, value_name = "URL")]
    pub db: Option<String>,

    /// Output the statistics to a CSV file instead of to the terminal
    #[arg(long, value_name = "PATH")]
    pub csv: Option<Utf8PathBuf>,
}

impl StatsArgs {
    const fn granularity(&self) -> Granularity {
        if self.weekly {
            Granularity::Week
        } else if self.quarterly {
            Granularity::Quarter
        } else {
            Granularity::Month
        }
    }

    const fn dimension(&self) -> Option<Dimension> {
        if self.internal {
            Some(Dimension::Internal)
        } else if self.external {
            Some(Dimension::External)
        } else {
            None
        }
    }

    const fn weight(&self) -> WeightMode {
        if self.lines { WeightMode::Lines } else { WeightMode::Count }
    }
}

fn parse_start(value: &str) -> Result<DateTime<Utc>, String> {
    // Accepts the same date spellings the tool has historically taken.
    ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y", "%b/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| format!("invalid date '{value}', expected YYYY-MM-DD, YYYYMMDD, MM/DD/YYYY, or Mon/DD/YYYY"))
}

pub async fn process_stats<H: Host>(host: &mut H, args: &StatsArgs) -> Result<()> {
    init_logging(args.common.log_level);

    let config = RepoConfig::load(&args.common.repos)?;
    let internal_users = config.internal_users();
    let counter = RequestCounter::new();

    let source: Box<dyn RecordSource> = match &args.db {
        Some(url) => Box::new(MirrorSource::new(url.clone(), internal_users, counter.clone())?),
        None => Box::new(GithubSource::new(
            args.common.github_token.as_deref(),
            GITHUB_API_URL,
            internal_users,
            counter.clone(),
        )?),
    };

    let detail = if args.lines { Detail::Full } else { Detail::List };
    let dimension = args.dimension();
    let mut aggregator = Aggregator::new(args.granularity(), args.start, args.weight(), dimension);

    for repo in config.tracked() {
        log::info!(target: LOG_TARGET, "Aggregating pull requests of '{}'", repo.name);

        let mut records = source.fetch(&repo.name, detail);
        while let Some(record) = records
            .try_next()
            .await
            .into_app_err_with(|| format!("fetching pull requests of '{}'", repo.name))?
        {
            aggregator
                .record(&record)
                .into_app_err_with(|| format!("aggregating pull requests of '{}'", repo.name))?;
        }
    }

    counter.log_summary();

    let cols = columns(dimension);
    let buckets = aggregator.into_buckets();

    if let Some(filename) = &args.csv {
        let mut csv_output = String::new();
        report::csv::generate(&cols, &buckets, &mut csv_output)?;
        fs::write(filename, csv_output)?;
    } else {
        let mut console_output = String::new();
        report::console::generate(&cols, &buckets, args.common.color.use_colors(), &mut console_output)?;
        let _ = write!(host.output(), "{console_output}");
    }

    Ok(())
}
