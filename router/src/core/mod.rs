//! Deterministic route-registry logic.
//!
//! Core modules are free of I/O. They operate on in-memory tables and return
//! deterministic outputs suitable for tests.

pub mod cut;
pub mod immutability;
pub mod invariants;
pub mod loupe;
pub mod ownership;
pub mod route_index;
pub mod signature;
pub mod types;
