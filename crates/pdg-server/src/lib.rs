//! pdg server library entry.
//!
//! Wires configuration loading, the metric registry, the sequence runners
//! and the reload coordinator behind a small HTTP surface. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod engine;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod settings;
