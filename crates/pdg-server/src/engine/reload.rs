//! Reload coordination.
//!
//! A reload stops and joins every runner of the active generation, reads a
//! fresh configuration, starts the next generation's runners and only then
//! publishes it. Scrapes read whichever generation is published through the
//! `ArcSwap` and never wait on a reload. Reloads are serialized by the mutex
//! that owns the runner handles.

use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use tokio::sync::{Mutex, OwnedMutexGuard};

use pdg_core::error::{PdgError, Result};

use super::generation::Generation;
use super::runner::{FatalHook, RunnerHandle};
use crate::config::ConfigSource;

pub struct ReloadCoordinator {
    inner: Arc<Shared>,
}

struct Shared {
    source: Arc<dyn ConfigSource>,
    current: ArcSwap<Generation>,
    runners: Arc<Mutex<Vec<RunnerHandle>>>,
    on_fatal: FatalHook,
}

impl ReloadCoordinator {
    /// Load and start the first generation. A configuration error is
    /// returned as-is so the caller can abort startup.
    pub async fn start(source: Arc<dyn ConfigSource>, on_fatal: FatalHook) -> Result<Self> {
        let config = source.load().await?;
        let generation = Generation::new(1, config);
        let runners = generation.launch(&on_fatal);
        tracing::info!(
            version = 1,
            metrics = runners.len(),
            source = %source.describe(),
            "metrics generation started"
        );

        Ok(Self {
            inner: Arc::new(Shared {
                source,
                current: ArcSwap::from_pointee(generation),
                runners: Arc::new(Mutex::new(runners)),
                on_fatal,
            }),
        })
    }

    /// The published generation.
    pub fn current(&self) -> Arc<Generation> {
        self.inner.current.load_full()
    }

    /// Exposition of the published generation.
    pub fn render(&self) -> String {
        self.inner.current.load().render()
    }

    /// Runners of the active generation that have not exited.
    pub async fn active_runners(&self) -> usize {
        self.inner
            .runners
            .lock()
            .await
            .iter()
            .filter(|r| !r.is_finished())
            .count()
    }

    /// Replace the active generation with one built from a fresh load of
    /// the configuration source. Returns the new generation's version.
    ///
    /// The swap runs on its own task: dropping the returned future does not
    /// abandon a reload halfway. If loading fails, the old runners stay
    /// stopped and an empty generation is published; the error is returned
    /// to the caller.
    pub async fn reload(&self) -> Result<u64> {
        let shared = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let runners = Arc::clone(&shared.runners).lock_owned().await;
            shared.swap(runners).await
        })
        .await
        .map_err(|e| PdgError::Internal(format!("reload task failed: {e}")))?
    }

    /// Stop and join every runner. The published generation stays readable.
    pub async fn shutdown(&self) {
        let mut runners = self.inner.runners.lock().await;
        retire(std::mem::take(&mut *runners)).await;
    }
}

impl Shared {
    async fn swap(&self, mut runners: OwnedMutexGuard<Vec<RunnerHandle>>) -> Result<u64> {
        let retiring = std::mem::take(&mut *runners);
        let stopped = retiring.len();
        retire(retiring).await;

        let version = self.current.load().version() + 1;
        tracing::debug!(version, stopped, "runners stopped, reading configuration");

        let config = match self.source.load().await {
            Ok(config) => config,
            Err(e) => {
                self.current.store(Arc::new(Generation::empty(version)));
                tracing::error!(version, error = %e, "reload failed, no metrics are being generated");
                return Err(e);
            }
        };

        let generation = Generation::new(version, config);
        *runners = generation.launch(&self.on_fatal);
        self.current.store(Arc::new(generation));

        tracing::info!(version, metrics = runners.len(), "configuration reloaded");
        Ok(version)
    }
}

async fn retire(runners: Vec<RunnerHandle>) {
    for r in &runners {
        r.stop();
    }
    join_all(runners.into_iter().map(RunnerHandle::join)).await;
}
