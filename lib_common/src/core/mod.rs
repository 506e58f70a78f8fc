//! # Core Aggregation Module
//!
//! The heart of the TagStream engine: the pure tokenizer plus the two pieces
//! of shared mutable state the whole pipeline revolves around.
//!
//! ## Core Components:
//!
//! - **`tokenizer`**: a stateless, pattern-matching hashtag extractor. It is
//!   the only piece of business logic in the system and is deliberately a
//!   free function so it can be tested in isolation.
//!
//! - **`frequency_table`**: the concurrently-updated hashtag counts. Many
//!   short-lived line tasks increment it while the reporter reads top-K
//!   snapshots; all synchronization is internal.
//!
//! - **`record_counter`**: a lock-free monotonically-increasing counter of
//!   processed records. The same type also backs the malformed-record
//!   failure count.
//!
//! These components are created once per streaming session and injected into
//! the ingestor and reporter at construction; nothing in here is a process
//! global.

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Stateless hashtag extraction from free text.
pub mod tokenizer;
/// The concurrent hashtag -> count map with top-K snapshots.
pub mod frequency_table;
/// A lock-free monotonically-increasing counter.
pub mod record_counter;

// --- Public API Re-exports ---
pub use frequency_table::FrequencyTable;
pub use record_counter::RecordCounter;
pub use tokenizer::extract_hashtags;
