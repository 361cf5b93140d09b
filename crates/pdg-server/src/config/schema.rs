use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::Deserialize;
use serde_yaml::Value;

use pdg_core::error::{PdgError, Result};
use pdg_core::model::{GaugeOp, MetricKind, MetricSpec, SequenceSpec, DEFAULT_BUCKETS};
use pdg_core::value::{Sample, ValueSource};

use super::MetricsConfig;

/// Top-level metric document as written in YAML.
#[derive(Debug, Deserialize)]
pub struct MetricsDocument {
    #[serde(alias = "config")]
    pub metrics: Vec<RawMetric>,
}

impl MetricsDocument {
    /// Resolve types, defaults and labels. Metrics with an unknown type are
    /// skipped with a warning; every other problem fails the whole document.
    pub fn compile(self) -> Result<MetricsConfig> {
        let mut seen = HashSet::new();
        let mut metrics = Vec::with_capacity(self.metrics.len());

        for raw in self.metrics {
            let kind = match MetricKind::parse(&raw.name, &raw.kind) {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!(metric = %raw.name, kind = %raw.kind, "{e}, ignoring");
                    continue;
                }
            };
            if !seen.insert(raw.name.clone()) {
                return Err(PdgError::Config(format!(
                    "duplicate metric name: {}",
                    raw.name
                )));
            }
            metrics.push(raw.compile(kind)?);
        }

        Ok(MetricsConfig { metrics })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawMetric {
    pub name: String,
    pub description: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub labels: Vec<String>,

    /// Histogram upper bounds. Ignored for other types.
    #[serde(default)]
    pub buckets: Option<Vec<f64>>,

    #[serde(default, alias = "sequence")]
    pub sequences: Vec<RawSequence>,
}

impl RawMetric {
    fn compile(self, kind: MetricKind) -> Result<MetricSpec> {
        if self.name.trim().is_empty() {
            return Err(PdgError::Config("metric name must not be empty".into()));
        }

        let mut names = HashSet::new();
        for l in &self.labels {
            if !names.insert(l.as_str()) {
                return Err(PdgError::Config(format!(
                    "metric {}: duplicate label name {l:?}",
                    self.name
                )));
            }
        }

        let buckets = match kind {
            MetricKind::Histogram => resolve_buckets(&self.name, self.buckets),
            _ => {
                if self.buckets.is_some() {
                    tracing::warn!(metric = %self.name, "buckets only apply to histograms, ignoring");
                }
                Vec::new()
            }
        };

        let sequences = self
            .sequences
            .into_iter()
            .enumerate()
            .map(|(idx, s)| s.compile(&self.name, kind, &self.labels, idx))
            .collect::<Result<Vec<_>>>()?;

        Ok(MetricSpec {
            name: self.name,
            kind,
            description: self.description,
            label_names: self.labels,
            buckets,
            sequences,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawSequence {
    /// Seconds this sequence runs before the next one starts.
    pub eval_time: Option<u64>,
    /// Seconds between ticks.
    pub interval: Option<f64>,
    pub value: Option<Literal>,
    #[serde(alias = "values")]
    pub range: Option<String>,
    pub operation: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, Value>,
}

/// A fixed `value`, written as a YAML number or as a quoted one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(Sample),
    Text(String),
}

impl Literal {
    fn resolve(self) -> Result<Sample> {
        match self {
            Literal::Number(v) => Ok(v),
            Literal::Text(s) => s.parse(),
        }
    }
}

impl RawSequence {
    fn compile(
        self,
        metric: &str,
        kind: MetricKind,
        label_names: &[String],
        idx: usize,
    ) -> Result<SequenceSpec> {
        let ctx = |e: PdgError| match e {
            PdgError::Config(msg) => {
                PdgError::Config(format!("metric {metric} sequence {idx}: {msg}"))
            }
            other => other,
        };

        let duration = match self.eval_time {
            Some(secs) => Duration::from_secs(secs),
            None => {
                tracing::warn!(metric, sequence = idx, "eval_time not set, defaulting to 1s");
                Duration::from_secs(1)
            }
        };

        let interval = match self.interval {
            Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs).map_err(|e| {
                ctx(PdgError::Config(format!("invalid interval {secs}: {e}")))
            })?,
            Some(secs) => {
                return Err(ctx(PdgError::Config(format!(
                    "interval must be a positive number of seconds, got {secs}"
                ))))
            }
            None => {
                tracing::warn!(metric, sequence = idx, "interval not set, defaulting to 1s");
                Duration::from_secs(1)
            }
        };

        let source = match (self.value, self.range) {
            (Some(v), range) => {
                if range.is_some() {
                    tracing::warn!(metric, sequence = idx, "both value and range set, using value");
                }
                ValueSource::Fixed(v.resolve().map_err(ctx)?)
            }
            (None, Some(range)) => ValueSource::parse_range(&range).map_err(ctx)?,
            (None, None) => {
                return Err(ctx(PdgError::Config(
                    "either value or range must be set".into(),
                )))
            }
        };

        if kind == MetricKind::Counter && !source.is_non_negative() {
            return Err(ctx(PdgError::Config(
                "counters can only be incremented by non-negative values".into(),
            )));
        }

        let operation = match (kind, self.operation) {
            (MetricKind::Gauge, Some(op)) => Some(op.parse::<GaugeOp>().map_err(ctx)?),
            // Reported when the runner reaches this sequence.
            (MetricKind::Gauge, None) => None,
            (_, Some(op)) => {
                tracing::warn!(metric, sequence = idx, operation = %op, "operation only applies to gauges, ignoring");
                None
            }
            (_, None) => None,
        };

        let label_values = resolve_labels(metric, label_names, self.labels).map_err(ctx)?;

        Ok(SequenceSpec {
            duration,
            interval,
            source,
            operation,
            label_values,
        })
    }
}

/// Order a sequence's label map by the metric's declared label names.
fn resolve_labels(
    metric: &str,
    names: &[String],
    mut raw: BTreeMap<String, Value>,
) -> Result<Vec<String>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw.len() != names.len() {
        return Err(PdgError::LabelArity {
            metric: metric.to_string(),
            expected: names.len(),
            got: raw.len(),
        });
    }
    names
        .iter()
        .map(|n| {
            let v = raw
                .remove(n)
                .ok_or_else(|| PdgError::Config(format!("label {n:?} has no value")))?;
            scalar_to_string(n, v)
        })
        .collect()
}

fn scalar_to_string(label: &str, v: Value) -> Result<String> {
    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(PdgError::Config(format!(
            "label {label:?} must be a string, number or bool"
        ))),
    }
}

/// Custom buckets must be non-empty, finite and strictly increasing. Anything
/// else falls back to the default layout.
fn resolve_buckets(metric: &str, buckets: Option<Vec<f64>>) -> Vec<f64> {
    let Some(buckets) = buckets else {
        return DEFAULT_BUCKETS.to_vec();
    };

    if buckets.is_empty() {
        tracing::warn!(metric, "buckets is empty, falling back to default buckets");
        return DEFAULT_BUCKETS.to_vec();
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        tracing::warn!(metric, "buckets contain non-finite values, falling back to default buckets");
        return DEFAULT_BUCKETS.to_vec();
    }
    if !buckets.windows(2).all(|w| w[0] < w[1]) {
        tracing::warn!(
            metric,
            "buckets are not strictly increasing, falling back to default buckets"
        );
        return DEFAULT_BUCKETS.to_vec();
    }
    buckets
}
