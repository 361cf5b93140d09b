//! Metric families backing the generated instruments.
//!
//! Every family keeps its series in a `DashMap` keyed by the label-value
//! tuple (in declared label order), so the runner that owns a metric can add
//! series while a scrape iterates. Sample values are `f64` stored as bits in
//! atomics. An empty tuple is the family's unlabeled series.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use pdg_core::error::{PdgError, Result};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a sample value like the reference Prometheus clients do
/// (`3.0`, `0.25`, `+Inf`).
pub fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn write_sample(out: &mut String, name: &str, labels: &str, value: f64) {
    if labels.is_empty() {
        let _ = writeln!(out, "{} {}", name, fmt_value(value));
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, labels, fmt_value(value));
    }
}

/// `f64` cell with lock-free add.
#[derive(Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn add(&self, v: f64) {
        let mut cur = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + v).to_bits();
            match self
                .0
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => cur = actual,
            }
        }
    }
}

/// One time series inside a family.
pub trait Series: Send + Sync + 'static {
    /// Construction parameters shared by every series of a family.
    type Layout: Send + Sync;

    /// Value of the `# TYPE` line.
    const TYPE: &'static str;

    fn new(layout: &Self::Layout) -> Self;

    /// Name used on the `# HELP`/`# TYPE` lines for a configured metric name.
    fn exposed_name(name: &str) -> String {
        name.to_string()
    }

    /// Append this series' samples. `labels` is the pre-rendered label set,
    /// empty for the unlabeled series.
    fn render(&self, name: &str, labels: &str, out: &mut String);
}

#[derive(Default)]
pub struct Counter {
    value: AtomicF64,
}

impl Counter {
    pub fn inc(&self, v: f64) {
        self.value.add(v);
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

impl Series for Counter {
    type Layout = ();
    const TYPE: &'static str = "counter";

    fn new(_: &()) -> Self {
        Self::default()
    }

    // Counters are exposed with a single `_total` suffix.
    fn exposed_name(name: &str) -> String {
        format!("{}_total", name.strip_suffix("_total").unwrap_or(name))
    }

    fn render(&self, name: &str, labels: &str, out: &mut String) {
        write_sample(out, name, labels, self.get());
    }
}

#[derive(Default)]
pub struct Gauge {
    value: AtomicF64,
}

impl Gauge {
    pub fn inc(&self, v: f64) {
        self.value.add(v);
    }

    pub fn dec(&self, v: f64) {
        self.value.add(-v);
    }

    pub fn set(&self, v: f64) {
        self.value.set(v);
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

impl Series for Gauge {
    type Layout = ();
    const TYPE: &'static str = "gauge";

    fn new(_: &()) -> Self {
        Self::default()
    }

    fn render(&self, name: &str, labels: &str, out: &mut String) {
        write_sample(out, name, labels, self.get());
    }
}

/// Summary without quantiles: observation count and sum.
#[derive(Default)]
pub struct Summary {
    count: AtomicU64,
    sum: AtomicF64,
}

impl Summary {
    pub fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.add(v);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }
}

impl Series for Summary {
    type Layout = ();
    const TYPE: &'static str = "summary";

    fn new(_: &()) -> Self {
        Self::default()
    }

    fn render(&self, name: &str, labels: &str, out: &mut String) {
        write_sample(out, &format!("{name}_count"), labels, self.count() as f64);
        write_sample(out, &format!("{name}_sum"), labels, self.sum());
    }
}

pub struct Histogram {
    bounds: Arc<[f64]>,
    // Cumulative: bucket i counts observations <= bounds[i].
    buckets: Box<[AtomicU64]>,
    count: AtomicU64,
    sum: AtomicF64,
}

impl Histogram {
    /// Observe a value and increment every bucket whose bound is not below it.
    pub fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.add(v);
        for (i, &b) in self.bounds.iter().enumerate() {
            if v <= b {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    /// `(upper bound, cumulative count)` pairs, without `+Inf`.
    pub fn buckets(&self) -> Vec<(f64, u64)> {
        self.bounds
            .iter()
            .zip(self.buckets.iter())
            .map(|(&b, c)| (b, c.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Series for Histogram {
    type Layout = Arc<[f64]>;
    const TYPE: &'static str = "histogram";

    fn new(bounds: &Arc<[f64]>) -> Self {
        Self {
            bounds: Arc::clone(bounds),
            buckets: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            count: AtomicU64::new(0),
            sum: AtomicF64::default(),
        }
    }

    fn render(&self, name: &str, labels: &str, out: &mut String) {
        let prefix = if labels.is_empty() {
            String::new()
        } else {
            format!("{labels},")
        };
        for (le, count) in self.buckets() {
            let _ = writeln!(
                out,
                "{}_bucket{{{}le=\"{}\"}} {}",
                name,
                prefix,
                fmt_value(le),
                fmt_value(count as f64)
            );
        }
        let count = self.count() as f64;
        let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, fmt_value(count));
        write_sample(out, &format!("{name}_count"), labels, count);
        write_sample(out, &format!("{name}_sum"), labels, self.sum());
    }
}

/// A named metric and all of its label combinations.
pub struct Family<S: Series> {
    name: String,
    help: String,
    label_names: Vec<String>,
    layout: S::Layout,
    series: DashMap<Vec<String>, Arc<S>>,
}

impl<S: Series> Family<S> {
    /// A family without label names starts with its unlabeled series, so it
    /// is exposed at zero before the first tick.
    pub fn new(name: &str, help: &str, label_names: &[String], layout: S::Layout) -> Self {
        let series = DashMap::new();
        if label_names.is_empty() {
            series.insert(Vec::new(), Arc::new(S::new(&layout)));
        }
        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.to_vec(),
            layout,
            series,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the series for a label-value tuple, creating it on first use.
    /// The empty tuple selects the unlabeled series; any other tuple must
    /// match the declared label names one to one.
    pub fn with_label_values(&self, values: &[String]) -> Result<Arc<S>> {
        if !values.is_empty() && values.len() != self.label_names.len() {
            return Err(PdgError::LabelArity {
                metric: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        if let Some(s) = self.series.get(values) {
            return Ok(Arc::clone(s.value()));
        }
        let s = self
            .series
            .entry(values.to_vec())
            .or_insert_with(|| Arc::new(S::new(&self.layout)));
        Ok(Arc::clone(s.value()))
    }

    /// Existing series for a tuple, without creating it.
    pub fn get(&self, values: &[String]) -> Option<Arc<S>> {
        self.series.get(values).map(|s| Arc::clone(s.value()))
    }

    /// Number of distinct label tuples seen so far.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    fn label_string(&self, values: &[String]) -> String {
        self.label_names
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Render in Prometheus text exposition format, series sorted by labels.
    pub fn render(&self, out: &mut String) {
        let exposed = S::exposed_name(&self.name);
        let _ = writeln!(out, "# HELP {} {}", exposed, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", exposed, S::TYPE);

        let mut rows: Vec<(Vec<String>, Arc<S>)> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (values, series) in rows {
            series.render(&exposed, &self.label_string(&values), out);
        }
    }
}
