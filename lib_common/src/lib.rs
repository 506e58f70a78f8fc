//! # TagStream Common Library
//!
//! Shared components for the TagStream hashtag statistics consumer. The
//! binary in the `consumers` crate wires these modules into a running
//! pipeline: a filtered-stream ingestor feeds a concurrent frequency table
//! and record counter, while a periodic reporter publishes top-K snapshots.

// Declare the modules to re-export
pub mod configs;
pub mod core;
pub mod ingestors;
pub mod loggers;
pub mod reporting;
pub mod retrieve;

// Re-export the primary types
pub use self::configs::settings::{ResolvedSettings, Settings, SettingsError};
pub use self::core::frequency_table::FrequencyTable;
pub use self::core::record_counter::RecordCounter;
pub use self::core::tokenizer::extract_hashtags;
pub use self::ingestors::filtered_stream::{FilteredStreamConfig, FilteredStreamIngestor};
pub use self::reporting::stats_reporter::{ConsoleSink, ReportSink, StatsReport, StatsReporter};
