// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of the k6 `--out json` line format.
//!
//! Each line is one JSON object. `Point` lines carry a sample; `Metric`
//! lines declare a metric and are skipped.

use std::collections::BTreeMap;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset};
use otelout_core::Sample;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum FeedLine {
    Point { metric: String, data: PointData },
    Metric {},
}

#[derive(Debug, Deserialize)]
struct PointData {
    time: Option<DateTime<FixedOffset>>,
    value: f64,
    #[serde(default)]
    tags: Option<BTreeMap<String, serde_json::Value>>,
}

/// Parses one feed line. Blank lines and metric declarations yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Sample>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<FeedLine>(line)? {
        FeedLine::Metric {} => Ok(None),
        FeedLine::Point { metric, data } => {
            let mut sample = Sample::new(metric, data.value);
            if let Some(time) = data.time {
                sample = sample.at(SystemTime::from(time));
            }
            for (key, value) in data.tags.unwrap_or_default() {
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::String(s) => sample = sample.with_tag(key, s),
                    other => sample = sample.with_tag(key, other.to_string()),
                }
            }
            Ok(Some(sample))
        }
    }
}
