//! Read-only projections over the route index.

use crate::core::route_index::RouteIndex;
use crate::core::types::{FunctionId, ModuleAddress, ModuleRoutes};
use crate::error::RouterError;

/// Introspection reads. Implementors only expose their index; every query is
/// a pure function of it.
pub trait Loupe {
    fn route_index(&self) -> &RouteIndex;

    /// Every module with its identifiers, in module order.
    fn all_routes_by_module(&self) -> Vec<ModuleRoutes> {
        self.route_index().groups()
    }

    fn routes_of(&self, module: &ModuleAddress) -> Vec<FunctionId> {
        self.route_index().routes_of(module).to_vec()
    }

    fn all_modules(&self) -> Vec<ModuleAddress> {
        self.route_index().modules().to_vec()
    }

    /// Module routed for `id`, or [`RouterError::RouteNotFound`].
    fn module_of(&self, id: &FunctionId) -> Result<ModuleAddress, RouterError> {
        self.route_index()
            .resolve(id)
            .ok_or(RouterError::RouteNotFound { id: *id })
    }
}

impl Loupe for RouteIndex {
    fn route_index(&self) -> &RouteIndex {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{addr, fid};

    #[test]
    fn projections_follow_index_order() {
        let mut index = RouteIndex::new();
        index.put(fid(1), addr(2));
        index.put(fid(2), addr(1));
        index.put(fid(3), addr(2));

        assert_eq!(
            index.all_routes_by_module(),
            vec![
                ModuleRoutes::new(addr(2), vec![fid(1), fid(3)]),
                ModuleRoutes::new(addr(1), vec![fid(2)]),
            ]
        );
        assert_eq!(index.all_modules(), vec![addr(2), addr(1)]);
        assert_eq!(Loupe::routes_of(&index, &addr(2)), vec![fid(1), fid(3)]);
        assert!(Loupe::routes_of(&index, &addr(5)).is_empty());
        assert_eq!(index.module_of(&fid(2)), Ok(addr(1)));
    }

    #[test]
    fn module_of_missing_route_is_not_found() {
        let index = RouteIndex::new();
        assert_eq!(
            index.module_of(&fid(7)),
            Err(RouterError::RouteNotFound { id: fid(7) })
        );
    }

    /// Repeated reads without mutation return identical results.
    #[test]
    fn reads_are_repeatable() {
        let mut index = RouteIndex::new();
        index.put(fid(1), addr(1));
        index.put(fid(2), addr(2));
        index.erase(&fid(1));
        assert_eq!(index.all_routes_by_module(), index.all_routes_by_module());
        assert_eq!(index.all_modules(), index.all_modules());
    }
}
