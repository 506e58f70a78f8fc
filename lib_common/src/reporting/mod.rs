//! # Reporting Module
//!
//! The periodic stats reporter and the sink abstraction it publishes
//! through. Reporting is diagnostic: snapshots are eventually consistent and
//! a slow sink delays the next fire rather than overlapping it.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Periodic top-K snapshot reporting.
pub mod stats_reporter;

pub use stats_reporter::{ConsoleSink, ReportSink, StatsReport, StatsReporter};
