//! Metric families and the per-generation registry rendered by `/metrics/`.
//!
//! Storage is atomics plus `DashMap` so runners never wait on a scrape.

pub mod metrics;
pub mod registry;

pub use metrics::{Counter, Family, Gauge, Histogram, Series, Summary};
pub use registry::{Instrument, MetricsRegistry};
