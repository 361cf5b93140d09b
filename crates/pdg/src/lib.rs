//! Top-level facade crate for the Prometheus data generator.
//!
//! Re-exports the core model and the server library so users can depend on a single crate.

pub mod core {
    pub use pdg_core::*;
}

pub mod server {
    pub use pdg_server::*;
}
