//! # Data Ingestors Module
//!
//! Clients for getting external data into the system. The filtered-stream
//! ingestor is the front door for the newline-delimited record stream; rule
//! setup is the one-shot precondition call that tells the upstream service
//! what to put on that stream.
//!
//! ## Contained Modules:
//! - **`filtered_stream`**: the long-lived HTTP streaming session and the
//!   read-and-dispatch ingestion loop feeding the core aggregates.
//! - **`rule_setup`**: registers server-side filter rules before streaming
//!   starts. Its failure is logged but never aborts the run.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The long-lived streaming session and ingestion loop.
pub mod filtered_stream;
/// One-shot registration of upstream filter rules.
pub mod rule_setup;

// --- Public API Re-exports ---
pub use filtered_stream::{FilteredStreamConfig, FilteredStreamIngestor};
pub use rule_setup::register_rules;
