#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use pdg_core::model::{GaugeOp, MetricKind, DEFAULT_BUCKETS};
use pdg_core::value::{Sample, ValueSource};
use pdg_server::config;

mod support;
use support::{fixture, single_metric};

#[test]
fn basic_document_compiles() {
    let cfg = config::load_from_str(&fixture("basic.yml")).expect("must parse");
    let kinds: Vec<MetricKind> = cfg.metrics.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        [
            MetricKind::Counter,
            MetricKind::Gauge,
            MetricKind::Summary,
            MetricKind::Histogram
        ]
    );

    let requests = &cfg.metrics[0];
    assert_eq!(requests.label_names, ["method", "code"]);
    // Label maps are reordered to the declared label names.
    assert_eq!(requests.sequences[0].label_values, ["GET", "200"]);
    assert_eq!(requests.sequences[1].label_values, ["POST", "500"]);
    assert_eq!(requests.sequences[0].source, ValueSource::IntRange { min: 1, max: 10 });
    assert_eq!(requests.sequences[1].interval, Duration::from_millis(500));

    let depth = &cfg.metrics[1];
    let ops: Vec<Option<GaugeOp>> = depth.sequences.iter().map(|s| s.operation).collect();
    assert_eq!(ops, [Some(GaugeOp::Inc), Some(GaugeOp::Dec), Some(GaugeOp::Set)]);
    assert_eq!(depth.sequences[2].interval, Duration::from_secs(1));

    let latency = &cfg.metrics[3];
    assert_eq!(latency.buckets, [0.1, 0.5, 1.0, 5.0]);
}

#[test]
fn legacy_key_names_are_accepted() {
    let m = single_metric(&fixture("legacy_keys.yml"));
    assert_eq!(m.name, "legacy_jobs");
    assert_eq!(m.sequences.len(), 1);
    assert_eq!(m.sequences[0].source, ValueSource::IntRange { min: 1, max: 3 });
}

#[test]
fn unknown_type_is_skipped() {
    let doc = r#"
metrics:
  - name: odd
    description: not a real type
    type: timer
    sequences: [{ value: 1 }]
  - name: ok
    description: fine
    type: gauge
    sequences: [{ value: 1, operation: set }]
"#;
    let cfg = config::load_from_str(doc).expect("unknown type must not be fatal");
    assert_eq!(cfg.metrics.len(), 1);
    assert_eq!(cfg.metrics[0].name, "ok");
}

#[test]
fn missing_defaults_fall_back_to_one_second() {
    let m = single_metric(
        r#"
metrics:
  - name: c
    description: d
    type: counter
    sequences:
      - value: 1
"#,
    );
    assert_eq!(m.sequences[0].duration, Duration::from_secs(1));
    assert_eq!(m.sequences[0].interval, Duration::from_secs(1));
    assert!(m.sequences[0].label_values.is_empty());
}

#[test]
fn fixed_values_keep_their_type() {
    let m = single_metric(
        r#"
metrics:
  - name: g
    description: d
    type: gauge
    sequences:
      - { value: 42, operation: set }
      - { value: 42.0, operation: set }
"#,
    );
    assert_eq!(m.sequences[0].source, ValueSource::Fixed(Sample::Int(42)));
    assert_eq!(m.sequences[1].source, ValueSource::Fixed(Sample::Float(42.0)));
}

#[test]
fn quoted_values_are_read_as_numbers() {
    let m = single_metric(
        r#"
metrics:
  - name: g
    description: d
    type: gauge
    sequences:
      - { value: "5", operation: set }
      - { value: " 2.5 ", operation: set }
"#,
    );
    assert_eq!(m.sequences[0].source, ValueSource::Fixed(Sample::Int(5)));
    assert_eq!(m.sequences[1].source, ValueSource::Fixed(Sample::Float(2.5)));

    let err = config::load_from_str(
        "metrics: [{ name: g, description: d, type: gauge, sequences: [{ value: five, operation: set }] }]",
    )
    .expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG_ERROR");
    assert!(err.to_string().contains("metric g sequence 0"), "{err}");
}

#[test]
fn gauge_without_operation_loads() {
    // Reported by the runner, not the loader.
    let m = single_metric(
        r#"
metrics:
  - name: g
    description: d
    type: gauge
    sequences: [{ value: 1 }]
"#,
    );
    assert_eq!(m.sequences[0].operation, None);
}

#[test]
fn operation_on_counter_is_ignored() {
    let m = single_metric(
        r#"
metrics:
  - name: c
    description: d
    type: counter
    sequences: [{ value: 1, operation: set }]
"#,
    );
    assert_eq!(m.sequences[0].operation, None);
}

#[test]
fn histogram_buckets_fall_back_to_default() {
    for buckets in ["[]", "[1, 0.5]", "[1, 1]", "[.inf]"] {
        let m = single_metric(&format!(
            r#"
metrics:
  - name: h
    description: d
    type: histogram
    buckets: {buckets}
    sequences: [{{ value: 1 }}]
"#
        ));
        assert_eq!(m.buckets, DEFAULT_BUCKETS, "buckets={buckets}");
    }

    let m = single_metric(
        r#"
metrics:
  - name: h
    description: d
    type: histogram
    sequences: [{ value: 1 }]
"#,
    );
    assert_eq!(m.buckets, DEFAULT_BUCKETS);
}

#[test]
fn rejected_documents() {
    let cases = [
        ("missing metrics key", "other: []", "CONFIG_ERROR"),
        ("not yaml", "metrics: [", "CONFIG_ERROR"),
        (
            "missing description",
            "metrics: [{ name: a, type: counter }]",
            "CONFIG_ERROR",
        ),
        (
            "bad range",
            "metrics: [{ name: a, description: d, type: counter, sequences: [{ range: ten-20 }] }]",
            "CONFIG_ERROR",
        ),
        (
            "range without separator",
            "metrics: [{ name: a, description: d, type: counter, sequences: [{ range: '10' }] }]",
            "CONFIG_ERROR",
        ),
        (
            "no value source",
            "metrics: [{ name: a, description: d, type: counter, sequences: [{ interval: 1 }] }]",
            "CONFIG_ERROR",
        ),
        (
            "zero interval",
            "metrics: [{ name: a, description: d, type: counter, sequences: [{ value: 1, interval: 0 }] }]",
            "CONFIG_ERROR",
        ),
        (
            "negative counter",
            "metrics: [{ name: a, description: d, type: counter, sequences: [{ value: -1 }] }]",
            "CONFIG_ERROR",
        ),
        (
            "unknown operation",
            "metrics: [{ name: a, description: d, type: gauge, sequences: [{ value: 1, operation: mul }] }]",
            "CONFIG_ERROR",
        ),
        (
            "duplicate metric",
            "metrics: [{ name: a, description: d, type: counter }, { name: a, description: d, type: gauge }]",
            "CONFIG_ERROR",
        ),
        (
            "duplicate label",
            "metrics: [{ name: a, description: d, type: counter, labels: [x, x] }]",
            "CONFIG_ERROR",
        ),
        (
            "too few label values",
            "metrics: [{ name: a, description: d, type: counter, labels: [x, y], sequences: [{ value: 1, labels: { x: '1' } }] }]",
            "LABEL_ARITY",
        ),
        (
            "wrong label name",
            "metrics: [{ name: a, description: d, type: counter, labels: [x], sequences: [{ value: 1, labels: { y: '1' } }] }]",
            "CONFIG_ERROR",
        ),
    ];

    for (what, doc, code) in cases {
        let err = config::load_from_str(doc).expect_err(what);
        assert_eq!(err.code().as_str(), code, "case={what}: {err}");
    }
}

#[test]
fn errors_name_the_offending_sequence() {
    let err = config::load_from_str(
        "metrics: [{ name: reqs, description: d, type: counter, sequences: [{ value: 1 }, { range: 5-1 }] }]",
    )
    .expect_err("must fail");
    let msg = err.to_string();
    assert!(msg.contains("metric reqs sequence 1"), "{msg}");
}

#[test]
fn missing_file_is_a_config_error() {
    let err = config::load_from_file("tests/configs/does-not-exist.yml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG_ERROR");
}
