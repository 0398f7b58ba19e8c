//! Frozen-route checks.
//!
//! A route whose module is the router's own address is part of the router's
//! permanent core. Nothing is stored for this: the fact is read off the index,
//! and since no edit may touch such a route it stays true once it holds.

use crate::core::route_index::RouteIndex;
use crate::core::types::{FunctionId, ModuleAddress};

/// True if `id` currently routes to the router itself.
pub fn is_immutable(index: &RouteIndex, router: ModuleAddress, id: &FunctionId) -> bool {
    index.resolve(id) == Some(router)
}

/// Identifiers frozen in `index`, in module-list order.
pub fn immutable_functions(index: &RouteIndex, router: ModuleAddress) -> Vec<FunctionId> {
    index.routes_of(&router).to_vec()
}
