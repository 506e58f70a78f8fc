//! # Filtered Stream Ingestor
//!
//! Owns the long-lived HTTP streaming session and the ingestion loop on top
//! of it. The GET reads response headers eagerly and then consumes the body
//! incrementally; the body is reassembled into newline-delimited records and
//! each candidate line is handed to an independent task that parses it,
//! bumps the record counter and feeds the tokenizer output into the shared
//! frequency table.
//!
//! ## Lifecycle:
//! - The loop runs until the body reports EOF, the transport fails (fatal —
//!   there is deliberately no auto-reconnect), or the shared cancellation
//!   token fires.
//! - Dispatch is fire-and-forget relative to the read loop, but every task
//!   lands on a `TaskTracker` so shutdown can drain outstanding work with a
//!   bounded timeout instead of silently abandoning updates.
//! - A malformed record is logged and counted on the failure counter; it
//!   never takes the session down.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::core::tokenizer::extract_hashtags;
use crate::core::{FrequencyTable, RecordCounter};

/// Configuration for one streaming session.
#[derive(Debug, Clone)]
pub struct FilteredStreamConfig {
    /// Absolute URL of the streaming GET endpoint.
    pub stream_url: String,
    /// Bearer token for the `Authorization` header. `None` sends the request
    /// unauthenticated and lets the server reject it.
    pub bearer_token: Option<String>,
    /// How long shutdown waits for in-flight line tasks before abandoning them.
    pub drain_timeout: Duration,
}

impl Default for FilteredStreamConfig {
    fn default() -> Self {
        Self {
            stream_url: "https://api.twitter.com/2/tweets/search/stream".to_string(),
            bearer_token: None,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// The streaming session plus its read-and-dispatch loop.
///
/// Shared state is injected at construction and scoped to one session; the
/// ingestor owns no ambient globals.
pub struct FilteredStreamIngestor {
    config: FilteredStreamConfig,
    hashtags: Arc<FrequencyTable>,
    records: Arc<RecordCounter>,
    parse_failures: Arc<RecordCounter>,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl FilteredStreamIngestor {
    /// Creates a new ingestor around injected shared state.
    ///
    /// The HTTP client gets a connect timeout but no overall request timeout:
    /// the streaming body is unbounded by design and an idle-but-healthy
    /// stream must not be killed by a read deadline.
    pub fn new(
        config: FilteredStreamConfig,
        hashtags: Arc<FrequencyTable>,
        records: Arc<RecordCounter>,
        parse_failures: Arc<RecordCounter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            hashtags,
            records,
            parse_failures,
            shutdown,
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .user_agent("TagStream/1.0")
                .build()
                .unwrap_or_default(), // Fallback to a default client if the builder fails.
        }
    }

    /// Primary execution loop for a single streaming session.
    ///
    /// Returns when the stream ends or cancellation fires; a non-2xx status
    /// or a mid-stream transport error is fatal and propagated to the caller.
    pub async fn run(&self) -> anyhow::Result<()> {
        log::info!("Opening filtered stream: {}", self.config.stream_url);

        let mut request = self.client.get(&self.config.stream_url);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        // Headers arrive here; the body is only pulled chunk by chunk below.
        let response = request.send().await?.error_for_status()?;
        log::info!("Stream connected: HTTP {}", response.status());

        let mut body = response.bytes_stream();
        let tracker = TaskTracker::new();
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    log::info!("Cancellation requested. Ingestion loop stopping.");
                    break;
                }
                chunk = body.next() => {
                    match chunk {
                        Some(Ok(bytes)) => {
                            buffer.extend_from_slice(&bytes);
                            for line in drain_lines(&mut buffer) {
                                self.dispatch(line, &tracker);
                            }
                        }
                        Some(Err(e)) => {
                            self.drain(&tracker).await;
                            return Err(anyhow::anyhow!("Stream transport failure: {}", e));
                        }
                        None => {
                            log::info!("Stream ended (EOF).");
                            break;
                        }
                    }
                }
            }
        }

        self.drain(&tracker).await;
        Ok(())
    }

    /// Spawns an independent processing task for one line.
    ///
    /// Blank keep-alive lines and lines without a single `#` fail the cheap
    /// pre-filter and are dropped before any work is committed. The loop does
    /// not wait for the task; completion order is unrelated to arrival order.
    fn dispatch(&self, line: String, tracker: &TaskTracker) {
        if !line.contains('#') {
            return;
        }

        let hashtags = Arc::clone(&self.hashtags);
        let records = Arc::clone(&self.records);
        let failures = Arc::clone(&self.parse_failures);
        tracker.spawn(async move {
            process_line(&line, &hashtags, &records, &failures);
        });
    }

    /// Best-effort drain of outstanding line tasks with a bounded timeout.
    async fn drain(&self, tracker: &TaskTracker) {
        tracker.close();
        if tokio::time::timeout(self.config.drain_timeout, tracker.wait())
            .await
            .is_err()
        {
            log::warn!(
                "Drain timed out after {:?}; {} in-flight line task(s) abandoned.",
                self.config.drain_timeout,
                tracker.len()
            );
        }
    }
}

/// Splits complete newline-terminated lines out of `buffer`, leaving any
/// trailing partial line in place for the next chunk. CRLF is tolerated.
///
/// UTF-8 decoding happens per complete line, after splitting: a `\n` byte
/// never occurs inside a multi-byte sequence, so a character split across
/// two chunks reassembles intact.
pub fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        lines.push(String::from_utf8_lossy(&line).into_owned());
    }
    lines
}

/// Processes one record line: validate, count, extract, update.
///
/// The structured parse only validates that the line is a well-formed record;
/// hashtag extraction always runs against the raw text. Within a single call
/// the record-counter increment happens before any table update. A line that
/// fails to parse is counted on `failures` and skipped — the one documented
/// deviation from the original behavior, which let the error vanish inside
/// the fire-and-forget task.
pub fn process_line(
    line: &str,
    hashtags: &FrequencyTable,
    records: &RecordCounter,
    failures: &RecordCounter,
) {
    if line.is_empty() {
        return;
    }

    if let Err(e) = serde_json::from_str::<serde_json::Value>(line) {
        failures.next();
        log::warn!("Skipping malformed record: {}", e);
        return;
    }

    records.next();
    for tag in extract_hashtags(line) {
        hashtags.increment(&tag);
    }
}

#[cfg(test)]
mod tests {
    use super::{drain_lines, process_line};
    use crate::core::{FrequencyTable, RecordCounter};

    fn state() -> (FrequencyTable, RecordCounter, RecordCounter) {
        (
            FrequencyTable::new(),
            RecordCounter::new(),
            RecordCounter::new(),
        )
    }

    #[test]
    fn valid_record_counts_once_and_updates_each_hashtag() {
        let (table, records, failures) = state();
        let line = r#"{"data":{"text":"launch day #hashtag1 #hashtag2","entities":{"hashtags":[{"text":"hashtag1"},{"text":"hashtag2"}]}}}"#;

        process_line(line, &table, &records, &failures);

        assert_eq!(records.current(), 1);
        assert_eq!(failures.current(), 0);
        assert_eq!(table.count("#hashtag1"), 1);
        assert_eq!(table.count("#hashtag2"), 1);
    }

    #[test]
    fn duplicate_hashtags_in_one_line_count_separately() {
        let (table, records, failures) = state();
        let line = r#"{"data":{"text":"echo #hashtag1 #hashtag1 #hashtag2"}}"#;

        process_line(line, &table, &records, &failures);

        assert_eq!(records.current(), 1);
        assert_eq!(table.count("#hashtag1"), 2);
        assert_eq!(table.count("#hashtag2"), 1);
        assert_eq!(failures.current(), 0);
    }

    #[test]
    fn empty_line_changes_nothing() {
        let (table, records, failures) = state();

        process_line("", &table, &records, &failures);

        assert_eq!(records.current(), 0);
        assert_eq!(failures.current(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn malformed_record_is_counted_as_failure_not_record() {
        let (table, records, failures) = state();

        process_line("not json at all #tag", &table, &records, &failures);

        assert_eq!(records.current(), 0);
        assert_eq!(failures.current(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn record_without_hashtags_still_counts() {
        let (table, records, failures) = state();

        process_line(r#"{"data":{"text":"quiet day"}}"#, &table, &records, &failures);

        assert_eq!(records.current(), 1);
        assert!(table.is_empty());
        assert_eq!(failures.current(), 0);
    }

    #[test]
    fn drain_lines_keeps_trailing_partial_line() {
        let mut buffer = b"{\"a\":1}\n{\"b\":2}\n{\"par".to_vec();
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(buffer, b"{\"par");

        buffer.extend_from_slice(b"tial\":3}\n");
        assert_eq!(drain_lines(&mut buffer), vec!["{\"partial\":3}"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn drain_lines_strips_carriage_returns_and_yields_blank_keepalives() {
        let mut buffer = b"{\"a\":1}\r\n\r\n".to_vec();
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec!["{\"a\":1}", ""]);
    }

    #[test]
    fn drain_lines_reassembles_a_character_split_across_chunks() {
        // "né" encoded as UTF-8, with the two-byte 'é' split between chunks.
        let mut buffer = b"{\"t\":\"n\xc3".to_vec();
        assert!(drain_lines(&mut buffer).is_empty());

        buffer.extend_from_slice(b"\xa9\"}\n");
        assert_eq!(drain_lines(&mut buffer), vec!["{\"t\":\"n\u{e9}\"}"]);
    }
}
