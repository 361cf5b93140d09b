//! Metric and sequence definitions.
//!
//! These are the validated, typed form of a configuration document. Type and
//! operation strings are resolved once here; nothing downstream compares
//! strings again.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PdgError, Result};
use crate::value::ValueSource;

/// Histogram upper bounds used when a metric does not declare its own.
/// `+Inf` is implied.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Summary,
    Histogram,
}

impl MetricKind {
    /// Case-insensitive lookup of a configured `type`.
    pub fn parse(metric: &str, raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(MetricKind::Counter),
            "gauge" => Ok(MetricKind::Gauge),
            "summary" => Ok(MetricKind::Summary),
            "histogram" => Ok(MetricKind::Histogram),
            _ => Err(PdgError::UnknownMetricType {
                metric: metric.to_string(),
                kind: raw.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Summary => "summary",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a gauge sequence does with each generated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeOp {
    Inc,
    Dec,
    Set,
}

impl FromStr for GaugeOp {
    type Err = PdgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inc" => Ok(GaugeOp::Inc),
            "dec" => Ok(GaugeOp::Dec),
            "set" => Ok(GaugeOp::Set),
            _ => Err(PdgError::Config(format!(
                "unknown operation {s:?} (expected inc, dec or set)"
            ))),
        }
    }
}

/// One timed step of a metric's schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSpec {
    /// How long the sequence keeps ticking before the next one takes over.
    pub duration: Duration,
    /// Pause between two ticks.
    pub interval: Duration,
    pub source: ValueSource,
    /// Only meaningful for gauges, where it is required.
    pub operation: Option<GaugeOp>,
    /// Values in the metric's `label_names` order; empty means unlabeled.
    pub label_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub name: String,
    pub kind: MetricKind,
    pub description: String,
    pub label_names: Vec<String>,
    /// Histogram upper bounds, ascending, without `+Inf`. Empty for other kinds.
    pub buckets: Vec<f64>,
    pub sequences: Vec<SequenceSpec>,
}
