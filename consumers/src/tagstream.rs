//! # TagStream Consumer
//!
//! The production binary: registers upstream filter rules, opens the
//! long-lived filtered stream, and keeps a frequency table plus record
//! counter updated while a periodic reporter prints the top hashtags.
//!
//! ## Execution Flow:
//! 1. Load `.env`, layered settings and logging.
//! 2. Register filter rules (failure is logged and the run continues).
//! 3. Build the session-scoped shared state and spawn the stats reporter.
//! 4. Run the ingestion loop until EOF, a fatal stream error, or a signal.
//! 5. Cancel the shared token and join both tasks before exiting.

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use lib_common::configs::load_settings;
use lib_common::core::{FrequencyTable, RecordCounter};
use lib_common::ingestors::filtered_stream::{FilteredStreamConfig, FilteredStreamIngestor};
use lib_common::ingestors::rule_setup::register_rules;
use lib_common::loggers::setup_logging;
use lib_common::reporting::stats_reporter::{ConsoleSink, StatsReporter};
use lib_common::retrieve::ky_http::ApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before settings so TAGSTREAM_* variables are visible to clap.
    dotenvy::dotenv().ok();

    let settings = load_settings()?;
    setup_logging("tagstream", &settings.log_dir, &settings.log_level)?;

    if settings.bearer_token.is_none() {
        log::warn!(
            "No bearer token configured (TAGSTREAM_BEARER_TOKEN); upstream will likely reject the stream request."
        );
    }

    // --- Phase 1: One-shot rule registration (non-fatal by policy) ---
    let api = ApiClient::new(settings.bearer_token.clone());
    match register_rules(&api, &settings.rules_url, &settings.rules).await {
        Ok(true) => {}
        Ok(false) => log::error!("Rule registration rejected; streaming anyway."),
        Err(e) => log::error!("Rule registration failed: {}; streaming anyway.", e),
    }

    // --- Phase 2: Session-scoped shared state ---
    let hashtags = Arc::new(FrequencyTable::new());
    let records = Arc::new(RecordCounter::new());
    let parse_failures = Arc::new(RecordCounter::new());
    let shutdown = CancellationToken::new();

    // --- Phase 3: Periodic reporter ---
    let reporter = StatsReporter::new(
        settings.report_interval,
        settings.top_count,
        Arc::clone(&hashtags),
        Arc::clone(&records),
        Arc::clone(&parse_failures),
        Arc::new(ConsoleSink),
        shutdown.clone(),
    );
    let reporter_handle = tokio::spawn(async move { reporter.run().await });

    // --- Phase 4: Ingestion loop ---
    let ingestor = FilteredStreamIngestor::new(
        FilteredStreamConfig {
            stream_url: settings.stream_url.clone(),
            bearer_token: settings.bearer_token.clone(),
            drain_timeout: settings.drain_timeout,
        },
        Arc::clone(&hashtags),
        Arc::clone(&records),
        Arc::clone(&parse_failures),
        shutdown.clone(),
    );
    let mut ingest_handle = tokio::spawn(async move { ingestor.run().await });

    // --- Phase 5: Wait for completion or a shutdown signal ---
    let outcome: Result<()> = tokio::select! {
        joined = &mut ingest_handle => flatten_join(joined),
        _ = shutdown_signal() => {
            log::info!("Shutdown signal received, stopping ingestion.");
            // The loop exits on the token and drains its in-flight work.
            shutdown.cancel();
            flatten_join(ingest_handle.await)
        }
    };
    if let Err(e) = &outcome {
        log::error!("Ingestion failed: {}", e);
    }

    shutdown.cancel();
    let _ = reporter_handle.await;

    log::info!(
        "Final tally: {} record(s), {} malformed, {} distinct hashtag(s).",
        records.current(),
        parse_failures.current(),
        hashtags.len()
    );
    log::info!("Shutdown complete.");
    outcome
}

/// Collapses a spawn join result and the ingestor's own result.
fn flatten_join(joined: Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(anyhow::anyhow!("Ingestion task panicked: {}", e)),
    }
}

/// Resolves on `CTRL+C` or, on unix, `SIGTERM`.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
