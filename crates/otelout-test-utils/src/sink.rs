// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic sink that keeps every line for assertions.

use std::sync::{Mutex, PoisonError};

use otelout_core::{DiagnosticCategory, DiagnosticSink};

/// Captures diagnostic lines in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines reported under `category`.
    pub fn lines_in(&self, category: DiagnosticCategory) -> Vec<String> {
        let prefix = format!("{category}: ");
        self.lines()
            .into_iter()
            .filter(|line| line.starts_with(&prefix))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_filtered_by_category() {
        let sink = RecordingSink::new();
        sink.report(DiagnosticCategory::Config, "endpoint=<sdk default>");
        sink.report(DiagnosticCategory::Instrument, "bad name");
        sink.write_line("raw line");

        assert_eq!(sink.len(), 3);
        assert_eq!(
            sink.lines_in(DiagnosticCategory::Instrument),
            vec!["instrument: bad name".to_string()]
        );
        sink.clear();
        assert!(sink.is_empty());
    }
}
