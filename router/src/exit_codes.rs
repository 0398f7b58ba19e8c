//! Stable exit codes for router CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config, snapshot, cut or other errors.
pub const INVALID: i32 = 1;
/// `router resolve` found no route for the function id.
pub const NOT_FOUND: i32 = 2;
/// A mutating command was issued by a caller that is not the owner.
pub const UNAUTHORIZED: i32 = 3;
