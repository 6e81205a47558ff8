// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `otelout run` command implementation.
//!
//! Starts the OTel output, pumps a k6 JSON feed into it in batches, and
//! stops the output on end of input or on a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use otelout_config::model::{DiagnosticTarget, OteloutConfig};
use otelout_core::{
    DiagnosticSink, OteloutError, OutputAdapter, Sample, SampleBatch, SampleContainer,
    TracingSink, WriterSink,
};
use otelout_otlp::OtelOutput;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::feed::parse_line;
use crate::shutdown;

/// Counters for one pass over a feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    pub lines: usize,
    pub samples: usize,
    pub skipped: usize,
    pub batches: usize,
}

/// Runs the `otelout run` command.
pub async fn run_feed(
    config: OteloutConfig,
    input: Option<PathBuf>,
    batch_size: usize,
) -> Result<(), OteloutError> {
    let sink = diagnostic_sink(config.output.diagnostics);
    let output = OtelOutput::new(config, sink);
    output.start().await?;

    let cancel = shutdown::install_signal_handler();
    let pumped = match input {
        Some(path) => match tokio::fs::File::open(&path).await {
            Ok(file) => pump(BufReader::new(file), &output, batch_size, cancel).await,
            Err(e) => Err(e),
        },
        None => pump(BufReader::new(tokio::io::stdin()), &output, batch_size, cancel).await,
    };

    let stopped = output.stop().await;
    match pumped {
        Ok(stats) => {
            info!(
                lines = stats.lines,
                samples = stats.samples,
                skipped = stats.skipped,
                batches = stats.batches,
                "feed finished"
            );
            stopped
        }
        Err(e) => {
            if let Err(stop_err) = stopped {
                warn!(error = %stop_err, "output stop failed after feed error");
            }
            Err(OteloutError::Internal(format!("failed to read feed: {e}")))
        }
    }
}

/// Reads feed lines until end of input or cancellation, delivering samples
/// in batches of `batch_size`.
///
/// Unparseable lines are logged and skipped. The final partial batch is
/// always delivered.
pub async fn pump<R>(
    reader: R,
    output: &dyn OutputAdapter,
    batch_size: usize,
    cancel: CancellationToken,
) -> std::io::Result<PumpStats>
where
    R: AsyncBufRead + Unpin,
{
    let batch_size = batch_size.max(1);
    let mut lines = reader.lines();
    let mut stats = PumpStats::default();
    let mut batch: Vec<Sample> = Vec::with_capacity(batch_size);

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("feed cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        stats.lines += 1;

        match parse_line(&line) {
            Ok(Some(sample)) => {
                batch.push(sample);
                if batch.len() >= batch_size {
                    deliver(output, &mut batch, &mut stats);
                }
            }
            Ok(None) => {}
            Err(e) => {
                stats.skipped += 1;
                warn!(line = stats.lines, error = %e, "skipping unparseable feed line");
            }
        }
    }

    deliver(output, &mut batch, &mut stats);
    Ok(stats)
}

fn deliver(output: &dyn OutputAdapter, batch: &mut Vec<Sample>, stats: &mut PumpStats) {
    if batch.is_empty() {
        return;
    }
    stats.samples += batch.len();
    stats.batches += 1;
    let containers: Vec<Box<dyn SampleContainer>> =
        vec![Box::new(SampleBatch::from(std::mem::take(batch)))];
    output.add_samples(&containers);
}

fn diagnostic_sink(target: DiagnosticTarget) -> Arc<dyn DiagnosticSink> {
    match target {
        DiagnosticTarget::Stdout => Arc::new(WriterSink::stdout()),
        DiagnosticTarget::Stderr => Arc::new(WriterSink::stderr()),
        DiagnosticTarget::Log => Arc::new(TracingSink),
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("otelout={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use otelout_test_utils::{ExportedValue, TestHarness};

    use super::*;

    const FEED: &str = concat!(
        r#"{"type":"Metric","data":{"name":"http_reqs","type":"counter"},"metric":"http_reqs"}"#,
        "\n",
        r#"{"type":"Point","data":{"time":"2024-05-09T12:00:00Z","value":120.5,"tags":{}},"metric":"http_req_duration"}"#,
        "\n",
        r#"{"type":"Point","data":{"time":"2024-05-09T12:00:00Z","value":1,"tags":{}},"metric":"http_reqs"}"#,
        "\n",
        "garbage\n",
        "\n",
        r#"{"type":"Point","data":{"time":"2024-05-09T12:00:01Z","value":99,"tags":{}},"metric":"unknown_metric"}"#,
        "\n",
    );

    #[tokio::test]
    async fn feed_is_pumped_in_batches() {
        let harness = TestHarness::started().await.expect("start");
        let stats = pump(FEED.as_bytes(), &harness.output, 2, CancellationToken::new())
            .await
            .expect("in-memory read");
        assert_eq!(
            stats,
            PumpStats {
                lines: 6,
                samples: 3,
                skipped: 1,
                batches: 2,
            }
        );

        harness.output.stop().await.expect("stop");
        let points = harness.exported();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0].value,
            ExportedValue::Histogram {
                count: 1,
                sum: 120.5
            }
        );
        assert_eq!(points[1].value, ExportedValue::Sum(1.0));
    }

    #[tokio::test]
    async fn cancelled_feed_delivers_nothing_further() {
        let harness = TestHarness::started().await.expect("start");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let stats = pump(FEED.as_bytes(), &harness.output, 10, cancel)
            .await
            .expect("cancelled");
        assert_eq!(stats.batches, 0);
        harness.output.stop().await.expect("stop");
    }

    #[test]
    #[tracing_test::traced_test]
    fn log_target_forwards_diagnostics_to_tracing() {
        let sink = diagnostic_sink(DiagnosticTarget::Log);
        sink.write_line("config: forwarded to tracing");
        assert!(logs_contain("config: forwarded to tracing"));
    }
}
