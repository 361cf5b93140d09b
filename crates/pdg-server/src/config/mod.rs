//! Metric document loading.
//!
//! YAML is parsed into the raw schema, then compiled into validated
//! [`MetricSpec`]s. Where the document comes from is abstracted behind
//! [`ConfigSource`] so reloads can re-read it.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use arc_swap::ArcSwap;
use async_trait::async_trait;

use pdg_core::error::{PdgError, Result};
use pdg_core::model::MetricSpec;

pub use schema::{Literal, MetricsDocument, RawMetric, RawSequence};

/// A compiled configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct MetricsConfig {
    pub metrics: Vec<MetricSpec>,
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<MetricsConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| PdgError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MetricsConfig> {
    let doc: MetricsDocument =
        serde_yaml::from_str(s).map_err(|e| PdgError::Config(format!("invalid yaml: {e}")))?;
    doc.compile()
}

/// Where configuration snapshots come from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<MetricsConfig>;
}

/// Reads a YAML file on every load.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<MetricsConfig> {
        tracing::debug!(path = %self.path.display(), "reading configuration");
        let s = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PdgError::Config(format!("read {} failed: {e}", self.path.display()))
        })?;
        load_from_str(&s)
    }
}

/// Holds the YAML document in memory; `replace` swaps it for the next load.
pub struct InMemorySource {
    doc: ArcSwap<String>,
}

impl InMemorySource {
    pub fn new(doc: impl Into<String>) -> Self {
        Self {
            doc: ArcSwap::from_pointee(doc.into()),
        }
    }

    pub fn replace(&self, doc: impl Into<String>) {
        self.doc.store(std::sync::Arc::new(doc.into()));
    }
}

#[async_trait]
impl ConfigSource for InMemorySource {
    fn describe(&self) -> String {
        "in-memory document".to_string()
    }

    async fn load(&self) -> Result<MetricsConfig> {
        let doc = self.doc.load_full();
        load_from_str(&doc)
    }
}
