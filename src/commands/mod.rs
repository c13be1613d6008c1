//! Command-line interface and orchestration for prstats
//!
//! This module implements the CLI commands and wires the other modules into
//! end-to-end runs: argument parsing, repository-list loading, record
//! fetching, aggregation, and report generation.
//!
//! ## Commands
//!
//! - **stats**: Fetch pull requests for every tracked repository, bucket them
//!   by time period, and report the counters as a console table or CSV file
//! - **init**: Generate a default repository list file
//!
//! The `run` function parses command-line arguments using clap and routes to
//! the appropriate command handler. The stats command builds one record
//! source for the run (the hosting API, or a mirror when `--db` is given),
//! drains every tracked repository into a single aggregator, and renders the
//! result.

mod common;
mod host;
mod init;
mod run;
mod stats;

pub use common::{ColorMode, CommonArgs, LogLevel};
pub use host::Host;
pub use init::{InitArgs, init_repos};
pub use run::run;
pub use stats::{StatsArgs, process_stats};
