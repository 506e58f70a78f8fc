//! # Stats Reporter
//!
//! A periodic task that snapshots the record counter and the top-K hashtags
//! and publishes them through a `ReportSink`. The interval fires immediately
//! at loop start (first report at t = 0) and then every period; if a sink is
//! slow the next fire is delayed instead of overlapped. The reporter holds
//! explicit references to its state and stops on the shared cancellation
//! token — there is no ambient timer callback capturing globals.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::{FrequencyTable, RecordCounter};

/// A point-in-time, non-transactional view of the aggregates.
///
/// The snapshot is consistent per key, not across keys: concurrent writers
/// may land between the counter read and the table copy, which is fine for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    /// Records processed since session start.
    pub record_count: u64,
    /// Lines that failed the structured parse since session start.
    pub parse_failures: u64,
    /// Up to K (token, count) pairs, count descending.
    pub top_hashtags: Vec<(String, u64)>,
}

/// Where snapshots go. Implemented by the console sink in production and by
/// capturing sinks in tests.
pub trait ReportSink: Send + Sync {
    /// Publishes one snapshot. Called synchronously from the reporter loop.
    fn publish(&self, report: &StatsReport);
}

/// Prints snapshots to stdout, batch-style, like the original console output.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn publish(&self, report: &StatsReport) {
        println!("Number of records received: {}", report.record_count);
        if report.parse_failures > 0 {
            println!("Malformed records skipped: {}", report.parse_failures);
        }
        println!("Top {} hashtags for this batch of records:", report.top_hashtags.len());
        for (tag, count) in &report.top_hashtags {
            println!("{}: {}", tag, count);
            println!("---------------------");
        }
    }
}

/// The periodic reporting task.
pub struct StatsReporter {
    period: Duration,
    top_count: usize,
    hashtags: Arc<FrequencyTable>,
    records: Arc<RecordCounter>,
    parse_failures: Arc<RecordCounter>,
    sink: Arc<dyn ReportSink>,
    shutdown: CancellationToken,
}

impl StatsReporter {
    /// Creates a reporter over injected shared state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        period: Duration,
        top_count: usize,
        hashtags: Arc<FrequencyTable>,
        records: Arc<RecordCounter>,
        parse_failures: Arc<RecordCounter>,
        sink: Arc<dyn ReportSink>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            period,
            top_count,
            hashtags,
            records,
            parse_failures,
            sink,
            shutdown,
        }
    }

    /// Takes one snapshot of the aggregates.
    pub fn snapshot(&self) -> StatsReport {
        StatsReport {
            record_count: self.records.current(),
            parse_failures: self.parse_failures.current(),
            top_hashtags: self.hashtags.top_k(self.top_count),
        }
    }

    /// Runs until the cancellation token fires.
    ///
    /// `tokio::time::interval` completes its first tick immediately, which
    /// gives the required report at t = 0. `MissedTickBehavior::Delay` keeps
    /// single-threaded-timer semantics: a slow sink pushes the next fire out
    /// instead of stacking fires.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    log::info!("Stats reporter received shutdown signal.");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.snapshot();
                    self.sink.publish(&report);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

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

    fn reporter_with_sink(
        period: Duration,
        shutdown: CancellationToken,
    ) -> (StatsReporter, Arc<CapturingSink>, Arc<FrequencyTable>, Arc<RecordCounter>) {
        let hashtags = Arc::new(FrequencyTable::new());
        let records = Arc::new(RecordCounter::new());
        let failures = Arc::new(RecordCounter::new());
        let sink = Arc::new(CapturingSink::default());
        let reporter = StatsReporter::new(
            period,
            10,
            Arc::clone(&hashtags),
            Arc::clone(&records),
            failures,
            sink.clone() as Arc<dyn ReportSink>,
            shutdown,
        );
        (reporter, sink, hashtags, records)
    }

    #[test]
    fn snapshot_reads_counter_and_sorted_top_k() {
        let shutdown = CancellationToken::new();
        let (reporter, _sink, hashtags, records) =
            reporter_with_sink(Duration::from_secs(5), shutdown);

        records.next();
        records.next();
        for _ in 0..3 {
            hashtags.increment("#a");
        }
        hashtags.increment("#b");

        let report = reporter.snapshot();
        assert_eq!(report.record_count, 2);
        assert_eq!(
            report.top_hashtags,
            vec![("#a".to_string(), 3), ("#b".to_string(), 1)]
        );
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_report_fires_at_time_zero_and_then_every_period() {
        let shutdown = CancellationToken::new();
        let (reporter, sink, _hashtags, _records) =
            reporter_with_sink(Duration::from_secs(5), shutdown.clone());

        let handle = tokio::spawn(async move { reporter.run().await });
        settle().await;
        assert_eq!(sink.reports.lock().unwrap().len(), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(sink.reports.lock().unwrap().len(), 2);

        shutdown.cancel();
        handle.await.expect("reporter task completes after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_further_reports() {
        let shutdown = CancellationToken::new();
        let (reporter, sink, _hashtags, _records) =
            reporter_with_sink(Duration::from_secs(5), shutdown.clone());

        let handle = tokio::spawn(async move { reporter.run().await });
        settle().await;
        shutdown.cancel();
        handle.await.expect("reporter task completes after cancel");

        let published = sink.reports.lock().unwrap().len();
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(sink.reports.lock().unwrap().len(), published);
    }
}
