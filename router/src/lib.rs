//! Runtime-reconfigurable call-dispatch router.
//!
//! A [`router::Router`] maps function ids to independently deployed modules and
//! forwards calls to them, while every module reads and writes the router's own
//! storage. Routes change only through owner-gated, all-or-nothing cuts.
//!
//! - **[`core`]**: Pure route-table logic (index, cut validation, loupe reads,
//!   ownership). No I/O.
//! - **[`module`]**: The forwarding seam: executable code plus injected state.
//! - **[`io`]**: Config, snapshots and cut files on disk.
//!
//! [`session`] ties snapshots and config to a live router for the CLI.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod module;
pub mod router;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
