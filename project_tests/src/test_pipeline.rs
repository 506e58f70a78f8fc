//! # Pipeline Integration Exerciser
//!
//! Pushes a batch of synthetic stream lines through the real per-line
//! pipeline (`process_line`) plus a live `StatsReporter` with a capturing
//! sink, end to end, without any network access. It verifies record
//! counting, hashtag extraction, malformed-line accounting and top-K
//! ordering against known inputs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lib_common::core::{FrequencyTable, RecordCounter};
use lib_common::ingestors::filtered_stream::{drain_lines, process_line};
use lib_common::reporting::stats_reporter::{ReportSink, StatsReport, StatsReporter};

/// Sink that stores every published report for later inspection.
#[derive(Default)]
struct CapturingSink {
    reports: Mutex<Vec<StatsReport>>,
}

impl ReportSink for CapturingSink {
    fn publish(&self, report: &StatsReport) {
        self.reports
            .lock()
            .expect("CapturingSink lock poisoned")
            .push(report.clone());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let hashtags = Arc::new(FrequencyTable::new());
    let records = Arc::new(RecordCounter::new());
    let failures = Arc::new(RecordCounter::new());

    println!("--- Starting Pipeline Tests ---");

    // --- TEST 1: Chunked transport reassembly ---
    // Feed the line splitter the same byte stream a chunked HTTP body would
    // deliver, split at awkward places.
    println!("\n[Test 1] Line reassembly across chunk boundaries...");
    let mut buffer: Vec<u8> = Vec::new();
    let mut lines = Vec::new();
    for chunk in [
        &b"{\"data\":{\"text\":\"alpha #rust\"}}\n{\"data\":{\"te"[..],
        b"xt\":\"beta #rust #tokio\"}}\r\n",
        b"\n{\"data\":{\"text\":\"gamma #Tokio\"}}\nnot json #broken\n",
    ] {
        buffer.extend_from_slice(chunk);
        lines.extend(drain_lines(&mut buffer));
    }
    assert_eq!(lines.len(), 5); // 4 records + 1 blank keep-alive
    assert!(buffer.is_empty());
    println!("✅ Reassembled {} line(s)", lines.len());

    // --- TEST 2: Per-line processing ---
    // Empty keep-alives and lines without '#' are dropped by the same
    // pre-filter the ingestion loop applies before dispatching.
    println!("\n[Test 2] Per-line processing with pre-filter...");
    for line in &lines {
        if !line.contains('#') {
            continue;
        }
        process_line(line, &hashtags, &records, &failures);
    }
    assert_eq!(records.current(), 3);
    assert_eq!(failures.current(), 1);
    assert_eq!(hashtags.count("#rust"), 2);
    assert_eq!(hashtags.count("#tokio"), 1);
    assert_eq!(hashtags.count("#Tokio"), 1); // case preserved, distinct key
    println!(
        "✅ {} record(s), {} malformed, {} distinct hashtag(s)",
        records.current(),
        failures.current(),
        hashtags.len()
    );

    // --- TEST 3: Duplicate hashtags in one record ---
    println!("\n[Test 3] Duplicate hashtags count per occurrence...");
    process_line(
        r#"{"data":{"text":"echo #hashtag1 #hashtag1 #hashtag2"}}"#,
        &hashtags,
        &records,
        &failures,
    );
    assert_eq!(hashtags.count("#hashtag1"), 2);
    assert_eq!(hashtags.count("#hashtag2"), 1);
    assert_eq!(records.current(), 4);
    println!("✅ Duplicates counted separately");

    // --- TEST 4: Reporter snapshot over live state ---
    println!("\n[Test 4] Reporter snapshot and first-fire-at-zero...");
    let sink = Arc::new(CapturingSink::default());
    let shutdown = CancellationToken::new();
    let reporter = StatsReporter::new(
        Duration::from_secs(5),
        10,
        Arc::clone(&hashtags),
        Arc::clone(&records),
        Arc::clone(&failures),
        sink.clone() as Arc<dyn ReportSink>,
        shutdown.clone(),
    );

    let handle = tokio::spawn(async move { reporter.run().await });
    // The first tick completes immediately; give the task a moment to run.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();
    handle.await?;

    let reports = sink.reports.lock().expect("CapturingSink lock poisoned");
    assert!(!reports.is_empty(), "first report must fire at t=0");
    let report = &reports[0];
    assert_eq!(report.record_count, 4);
    assert_eq!(report.parse_failures, 1);
    assert_eq!(report.top_hashtags[0], ("#hashtag1".to_string(), 2));
    assert_eq!(report.top_hashtags[1], ("#rust".to_string(), 2));
    println!(
        "✅ First report at t=0 with {} top entr(ies)",
        report.top_hashtags.len()
    );

    println!("\n--- All pipeline tests passed ---");
    Ok(())
}
