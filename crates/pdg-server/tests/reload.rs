//! Generation swaps driven by the reload coordinator.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use pdg_server::config::{ConfigSource, InMemorySource};
use pdg_server::engine::ReloadCoordinator;

mod support;
use support::{generation_counter, recording_hook};

const FIRST: &str = r#"
metrics:
  - name: gen_requests
    description: Requests
    type: counter
    sequences: [{ eval_time: 3600, interval: 1, value: 1 }]
"#;

const RENAMED: &str = r#"
metrics:
  - name: gen_requests_renamed
    description: Requests
    type: counter
    sequences: [{ eval_time: 3600, interval: 1, value: 1 }]
"#;

const TWO_METRICS: &str = r#"
metrics:
  - name: a
    description: d
    type: counter
    sequences: [{ eval_time: 3600, interval: 1, value: 1 }]
  - name: b
    description: d
    type: gauge
    sequences: [{ eval_time: 3600, interval: 1, value: 1, operation: inc }]
"#;

async fn coordinator(doc: &str) -> (Arc<InMemorySource>, ReloadCoordinator) {
    let source = Arc::new(InMemorySource::new(doc));
    let (hook, _) = recording_hook();
    let dyn_source: Arc<dyn ConfigSource> = source.clone();
    let c = ReloadCoordinator::start(dyn_source, hook).await.expect("start");
    (source, c)
}

#[tokio::test(start_paused = true)]
async fn reload_swaps_in_renamed_metric_and_retires_old_runner() {
    let (source, c) = coordinator(FIRST).await;
    assert_eq!(c.current().version(), 1);
    assert_eq!(c.active_runners().await, 1);

    sleep(Duration::from_millis(2500)).await;
    let old = c.current();
    assert_eq!(generation_counter(&old, "gen_requests"), 3.0);

    source.replace(RENAMED);
    let version = c.reload().await.expect("reload");
    assert_eq!(version, 2);

    let out = c.render();
    assert!(out.contains("gen_requests_renamed_total"), "{out}");
    assert!(!out.contains("gen_requests_total"), "{out}");
    assert_eq!(c.active_runners().await, 1);

    // Nothing keeps writing into the retired generation.
    let frozen = generation_counter(&old, "gen_requests");
    sleep(Duration::from_secs(10)).await;
    assert_eq!(generation_counter(&old, "gen_requests"), frozen);
    assert!(generation_counter(&c.current(), "gen_requests_renamed") >= 10.0);

    c.shutdown().await;
    assert_eq!(c.active_runners().await, 0);
}

#[tokio::test(start_paused = true)]
async fn failed_reload_leaves_no_runners_until_fixed() {
    let (source, c) = coordinator(FIRST).await;
    sleep(Duration::from_millis(1500)).await;

    source.replace("metrics: [");
    let err = c.reload().await.expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG_ERROR");
    assert_eq!(c.active_runners().await, 0);
    assert_eq!(c.current().version(), 2);
    assert!(c.current().registry().is_empty());
    assert_eq!(c.render(), "");

    source.replace(FIRST);
    assert_eq!(c.reload().await.expect("reload"), 3);
    assert_eq!(c.active_runners().await, 1);
    assert!(c.render().contains("gen_requests_total"));

    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn concurrent_reloads_are_serialized() {
    let (_source, c) = coordinator(TWO_METRICS).await;
    sleep(Duration::from_millis(500)).await;

    let (a, b) = tokio::join!(c.reload(), c.reload());
    let mut versions = [a.expect("first reload"), b.expect("second reload")];
    versions.sort_unstable();
    assert_eq!(versions, [2, 3]);

    // Exactly one set of runners survives.
    assert_eq!(c.active_runners().await, 2);
    assert_eq!(c.current().version(), 3);

    c.shutdown().await;
    assert_eq!(c.active_runners().await, 0);
}

#[tokio::test(start_paused = true)]
async fn abandoned_reload_still_completes() {
    let (source, c) = coordinator(FIRST).await;
    sleep(Duration::from_millis(1500)).await;

    source.replace(RENAMED);
    // The caller gives up before the old runners are joined.
    let gave_up = tokio::time::timeout(Duration::ZERO, c.reload()).await;
    assert!(gave_up.is_err());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(c.current().version(), 2);
    assert_eq!(c.active_runners().await, 1);
    let out = c.render();
    assert!(out.contains("gen_requests_renamed_total"), "{out}");
    assert!(generation_counter(&c.current(), "gen_requests_renamed") >= 10.0);

    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_keeps_last_generation_readable() {
    let (_source, c) = coordinator(FIRST).await;
    sleep(Duration::from_millis(1500)).await;

    c.shutdown().await;
    let out = c.render();
    assert!(out.contains("gen_requests_total 2.0"), "{out}");
}

#[tokio::test]
async fn initial_config_error_is_returned() {
    let source: Arc<dyn ConfigSource> = Arc::new(InMemorySource::new("metrics: 3"));
    let (hook, _) = recording_hook();
    let err = ReloadCoordinator::start(source, hook)
        .await
        .err()
        .expect("start must fail");
    assert_eq!(err.code().as_str(), "CONFIG_ERROR");
}
