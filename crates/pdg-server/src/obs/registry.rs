//! Instrument set for one generation.

use std::sync::Arc;

use pdg_core::model::{MetricKind, MetricSpec};

use super::metrics::{Counter, Family, Gauge, Histogram, Summary};

/// Runtime object for one configured metric.
pub enum Instrument {
    Counter(Family<Counter>),
    Gauge(Family<Gauge>),
    Summary(Family<Summary>),
    Histogram(Family<Histogram>),
}

impl Instrument {
    pub fn from_spec(spec: &MetricSpec) -> Self {
        let (name, help, labels) = (&spec.name, &spec.description, &spec.label_names);
        match spec.kind {
            MetricKind::Counter => Instrument::Counter(Family::new(name, help, labels, ())),
            MetricKind::Gauge => Instrument::Gauge(Family::new(name, help, labels, ())),
            MetricKind::Summary => Instrument::Summary(Family::new(name, help, labels, ())),
            MetricKind::Histogram => Instrument::Histogram(Family::new(
                name,
                help,
                labels,
                Arc::from(spec.buckets.as_slice()),
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Instrument::Counter(f) => f.name(),
            Instrument::Gauge(f) => f.name(),
            Instrument::Summary(f) => f.name(),
            Instrument::Histogram(f) => f.name(),
        }
    }

    pub fn render(&self, out: &mut String) {
        match self {
            Instrument::Counter(f) => f.render(out),
            Instrument::Gauge(f) => f.render(out),
            Instrument::Summary(f) => f.render(out),
            Instrument::Histogram(f) => f.render(out),
        }
    }
}

/// Immutable-after-construction collection of instruments, in config order.
#[derive(Default)]
pub struct MetricsRegistry {
    instruments: Vec<Arc<Instrument>>,
}

impl MetricsRegistry {
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a MetricSpec>) -> Self {
        Self {
            instruments: specs
                .into_iter()
                .map(|s| Arc::new(Instrument::from_spec(s)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Instrument>> {
        self.instruments.iter().find(|i| i.name() == name).cloned()
    }

    pub fn instruments(&self) -> &[Arc<Instrument>] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Render every instrument in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for i in &self.instruments {
            i.render(&mut out);
        }
        out
    }
}
