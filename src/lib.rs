#![doc(hidden)]

//! Core library for prstats
//!
//! This library aggregates pull-request activity from a source-control hosting
//! API into time-bucketed statistics: how many pull requests were opened,
//! merged, closed, or remain unresolved in each month, week, or quarter,
//! broken out by internal/external contributor.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`config`]: Repository-list configuration
//! - [`stats`]: Bucketing, classification, and aggregation (the core)
//! - [`source`]: Pull-request record sources (hosting API, pre-synced mirror)
//! - [`report`]: CSV and console report generation

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod config;
#[cfg(not(any(debug_assertions, test)))]
mod config;

#[cfg(any(debug_assertions, test))]
pub mod report;
#[cfg(not(any(debug_assertions, test)))]
mod report;

#[cfg(any(debug_assertions, test))]
pub mod source;
#[cfg(not(any(debug_assertions, test)))]
mod source;

#[cfg(any(debug_assertions, test))]
pub mod stats;
#[cfg(not(any(debug_assertions, test)))]
mod stats;

pub use crate::commands::{Host, run};
