// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic channel for lifecycle milestones and recoverable errors.
//!
//! The output writes one line per event, prefixed with a short category
//! label (`exporter: ...`). Sinks only need to accept a line of text.

use std::io::Write;
use std::sync::Mutex;

use strum::Display;

/// Category label prefixed to every diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DiagnosticCategory {
    Config,
    Resource,
    Exporter,
    Instrument,
    Lifecycle,
    Shutdown,
}

/// Write-only text sink receiving diagnostic lines.
pub trait DiagnosticSink: Send + Sync {
    /// Accepts one line of text, without a trailing newline.
    fn write_line(&self, line: &str);

    /// Formats and writes a categorized line.
    fn report(&self, category: DiagnosticCategory, message: &str) {
        self.write_line(&format!("{category}: {message}"));
    }
}

/// Sink writing lines to any [`Write`] (stdout, stderr, a file).
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl WriterSink<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn write_line(&self, line: &str) {
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{line}") {
            tracing::warn!(error = %e, "failed to write diagnostic line");
        }
    }
}

/// Sink forwarding diagnostic lines to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::info!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_prefixes_category_label() {
        let sink = WriterSink::new(Vec::new());
        sink.report(DiagnosticCategory::Instrument, "bad name");
        sink.report(DiagnosticCategory::Exporter, "no transport");
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        assert_eq!(text, "instrument: bad name\nexporter: no transport\n");
    }

    #[test]
    fn write_line_appends_newline() {
        let sink = WriterSink::new(Vec::new());
        sink.write_line("OTEL_SERVICE_NAME=checkout");
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        assert_eq!(text, "OTEL_SERVICE_NAME=checkout\n");
    }

    #[test]
    fn category_labels_are_lowercase() {
        assert_eq!(DiagnosticCategory::Resource.to_string(), "resource");
        assert_eq!(DiagnosticCategory::Shutdown.to_string(), "shutdown");
    }

    #[test]
    #[tracing_test::traced_test]
    fn tracing_sink_emits_log_events() {
        TracingSink.report(DiagnosticCategory::Lifecycle, "output started");
        assert!(logs_contain("lifecycle: output started"));
    }
}
