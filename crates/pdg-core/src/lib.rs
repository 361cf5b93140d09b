//! pdg core: metric model, value generation, and the shared error type.
//!
//! This crate describes *what* a synthetic metric does over time. It carries
//! no runtime or HTTP dependencies; the server crate owns scheduling and
//! exposition.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `PdgError`/`Result` so a bad config never crashes the loader.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod value;

/// Shared result type.
pub use error::{ErrorCode, PdgError, Result};
pub use model::{GaugeOp, MetricKind, MetricSpec, SequenceSpec, DEFAULT_BUCKETS};
pub use value::{Sample, ValueSource};
