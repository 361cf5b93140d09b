//! One versioned snapshot of configuration and instruments.

use std::sync::Arc;

use pdg_core::model::MetricSpec;

use super::runner::{FatalHook, RunnerHandle, SequenceRunner};
use crate::config::MetricsConfig;
use crate::obs::{Instrument, MetricsRegistry};

/// Specs and instruments of one generation. Immutable once built; the
/// instruments' series maps are the only thing that changes while it is
/// active.
pub struct Generation {
    version: u64,
    specs: Vec<Arc<MetricSpec>>,
    registry: MetricsRegistry,
}

impl Generation {
    pub fn new(version: u64, config: MetricsConfig) -> Self {
        let specs: Vec<Arc<MetricSpec>> = config.metrics.into_iter().map(Arc::new).collect();
        let registry = MetricsRegistry::from_specs(specs.iter().map(|s| s.as_ref()));
        Self {
            version,
            specs,
            registry,
        }
    }

    /// A generation with nothing in it, published when a reload fails.
    pub fn empty(version: u64) -> Self {
        Self::new(version, MetricsConfig::default())
    }

    /// Spawn one runner per metric, bound to this generation's instruments.
    pub fn launch(&self, on_fatal: &FatalHook) -> Vec<RunnerHandle> {
        self.specs
            .iter()
            .zip(self.registry.instruments())
            .map(|(spec, instrument)| {
                SequenceRunner::new(
                    Arc::clone(spec),
                    Arc::clone(instrument),
                    Arc::clone(on_fatal),
                )
                .spawn()
            })
            .collect()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    pub fn instrument(&self, name: &str) -> Option<Arc<Instrument>> {
        self.registry.get(name)
    }

    pub fn render(&self) -> String {
        self.registry.render()
    }
}
