//! Sequence execution engine.
//!
//! One [`SequenceRunner`] task per metric drives its instrument through the
//! adapter; the [`ReloadCoordinator`] owns the runners of the active
//! [`Generation`] and swaps generations on reload.

pub mod adapter;
pub mod generation;
pub mod reload;
pub mod runner;

pub use generation::Generation;
pub use reload::ReloadCoordinator;
pub use runner::{exit_process, FatalHook, RunnerHandle, SequenceRunner};
