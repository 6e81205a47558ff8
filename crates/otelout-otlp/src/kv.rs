// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of `key=value,key2=value2` lists.
//!
//! This is the format of `OTEL_EXPORTER_OTLP_HEADERS` and
//! `OTEL_RESOURCE_ATTRIBUTES`. Whitespace around keys and values is trimmed,
//! empty entries are skipped, and a value may itself contain `=`. Header
//! values are percent-encoded (`Basic%20abc`).

use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyValueError {
    #[error("entry `{entry}` has no `=` separator")]
    MissingSeparator { entry: String },

    #[error("entry `{entry}` has an empty key")]
    EmptyKey { entry: String },

    #[error("value of `{key}` does not decode to UTF-8")]
    InvalidEncoding { key: String },
}

/// Parses a comma separated `key=value` list, preserving order.
pub fn parse_key_values(raw: &str) -> Result<Vec<(String, String)>, KeyValueError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) =
                entry
                    .split_once('=')
                    .ok_or_else(|| KeyValueError::MissingSeparator {
                        entry: entry.to_string(),
                    })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(KeyValueError::EmptyKey {
                    entry: entry.to_string(),
                });
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parses a header list and percent-decodes every value.
pub fn parse_headers(raw: &str) -> Result<Vec<(String, String)>, KeyValueError> {
    parse_key_values(raw)?
        .into_iter()
        .map(|(key, value)| {
            let decoded = percent_decode_str(&value)
                .decode_utf8()
                .map_err(|_| KeyValueError::InvalidEncoding { key: key.clone() })?
                .into_owned();
            Ok((key, decoded))
        })
        .collect()
}

/// Renders a header list for logs with every value replaced by `***`.
///
/// Malformed lists are reported as such instead of being echoed back,
/// since they may still carry secrets.
pub fn mask_values(raw: &str) -> String {
    match parse_key_values(raw) {
        Ok(pairs) => pairs
            .iter()
            .map(|(key, _)| format!("{key}=***"))
            .collect::<Vec<_>>()
            .join(","),
        Err(_) => "<malformed>".to_string(),
    }
}
