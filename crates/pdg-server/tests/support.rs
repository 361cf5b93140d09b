//! Helpers shared by the server integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::sync::{Arc, Mutex};

use pdg_core::model::MetricSpec;
use pdg_server::config;
use pdg_server::engine::{FatalHook, Generation};
use pdg_server::obs::Instrument;

pub fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/configs/{name}")).unwrap()
}

/// Compile a document that is expected to hold exactly one metric.
pub fn single_metric(yaml: &str) -> MetricSpec {
    let mut cfg = config::load_from_str(yaml).expect("config must load");
    assert_eq!(cfg.metrics.len(), 1, "expected a single metric");
    cfg.metrics.remove(0)
}

/// Fatal errors captured by [`recording_hook`], as `"<CODE>: <message>"`.
pub type Seen = Arc<Mutex<Vec<String>>>;

/// Fatal hook that records instead of exiting.
pub fn recording_hook() -> (FatalHook, Seen) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let hook: FatalHook = Arc::new(move |err| {
        sink.lock()
            .unwrap()
            .push(format!("{}: {err}", err.code().as_str()));
    });
    (hook, seen)
}

pub fn counter_value(instrument: &Instrument, labels: &[&str]) -> Option<f64> {
    let Instrument::Counter(f) = instrument else {
        panic!("{} is not a counter", instrument.name());
    };
    f.get(&owned(labels)).map(|c| c.get())
}

pub fn gauge_value(instrument: &Instrument, labels: &[&str]) -> Option<f64> {
    let Instrument::Gauge(f) = instrument else {
        panic!("{} is not a gauge", instrument.name());
    };
    f.get(&owned(labels)).map(|g| g.get())
}

pub fn generation_counter(generation: &Generation, name: &str) -> f64 {
    let instrument = generation.instrument(name).expect("metric must exist");
    counter_value(&instrument, &[]).unwrap_or(0.0)
}

pub fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}
