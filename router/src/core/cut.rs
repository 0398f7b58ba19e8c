//! Validation and application of cut entries.
//!
//! Entries are applied in caller order onto a copy of the index, so an entry
//! sees the effects of the entries before it. The first violated precondition
//! aborts the whole cut and the original index is left untouched; callers
//! commit the returned index only after every later step succeeds.

use tracing::debug;

use crate::core::immutability::is_immutable;
use crate::core::route_index::RouteIndex;
use crate::core::types::{CutAction, CutEntry, FunctionId, ModuleAddress};
use crate::error::RouterError;

/// Apply `entries` to a copy of `index`, returning the edited copy.
///
/// `router` is the router's own address (routes to it are frozen).
/// `has_code` reports whether an address can be a route target.
pub fn stage_cut<F>(
    index: &RouteIndex,
    router: ModuleAddress,
    entries: &[CutEntry],
    has_code: F,
) -> Result<RouteIndex, RouterError>
where
    F: Fn(&ModuleAddress) -> bool,
{
    let mut staged = index.clone();
    for entry in entries {
        apply_entry(&mut staged, router, entry, &has_code)?;
    }
    Ok(staged)
}

fn apply_entry<F>(
    index: &mut RouteIndex,
    router: ModuleAddress,
    entry: &CutEntry,
    has_code: &F,
) -> Result<(), RouterError>
where
    F: Fn(&ModuleAddress) -> bool,
{
    if entry.functions.is_empty() {
        return Err(RouterError::EmptySelectorSet {
            module: entry.module,
        });
    }
    debug!(
        module = %entry.module,
        action = %entry.action,
        functions = entry.functions.len(),
        "staging cut entry"
    );

    match entry.action {
        CutAction::Add => add_functions(index, entry.module, &entry.functions, has_code),
        CutAction::Replace => {
            replace_functions(index, router, entry.module, &entry.functions, has_code)
        }
        CutAction::Remove => remove_functions(index, router, entry.module, &entry.functions),
    }
}

fn add_functions<F>(
    index: &mut RouteIndex,
    module: ModuleAddress,
    ids: &[FunctionId],
    has_code: &F,
) -> Result<(), RouterError>
where
    F: Fn(&ModuleAddress) -> bool,
{
    if module.is_null() {
        return Err(RouterError::AddFromNullModule { ids: ids.to_vec() });
    }
    require_code(module, has_code)?;

    for id in ids {
        if index.contains(id) {
            return Err(RouterError::AlreadyExists { id: *id });
        }
        index.put(*id, module);
    }
    Ok(())
}

fn replace_functions<F>(
    index: &mut RouteIndex,
    router: ModuleAddress,
    module: ModuleAddress,
    ids: &[FunctionId],
    has_code: &F,
) -> Result<(), RouterError>
where
    F: Fn(&ModuleAddress) -> bool,
{
    if module.is_null() {
        return Err(RouterError::ReplaceWithNullModule { ids: ids.to_vec() });
    }
    require_code(module, has_code)?;

    for id in ids {
        let current = index.resolve(id).ok_or(RouterError::NoSuchRoute {
            action: CutAction::Replace,
            id: *id,
        })?;
        if is_immutable(index, router, id) {
            return Err(RouterError::Immutable {
                action: CutAction::Replace,
                id: *id,
            });
        }
        if current == module {
            return Err(RouterError::SameModule { id: *id });
        }
        index.put(*id, module);
    }
    Ok(())
}

fn remove_functions(
    index: &mut RouteIndex,
    router: ModuleAddress,
    module: ModuleAddress,
    ids: &[FunctionId],
) -> Result<(), RouterError> {
    if !module.is_null() {
        return Err(RouterError::RemoveTargetMustBeNull { module });
    }

    for id in ids {
        if !index.contains(id) {
            return Err(RouterError::NoSuchRoute {
                action: CutAction::Remove,
                id: *id,
            });
        }
        if is_immutable(index, router, id) {
            return Err(RouterError::Immutable {
                action: CutAction::Remove,
                id: *id,
            });
        }
        index.erase(id);
    }
    Ok(())
}

fn require_code<F>(module: ModuleAddress, has_code: &F) -> Result<(), RouterError>
where
    F: Fn(&ModuleAddress) -> bool,
{
    if !has_code(&module) {
        return Err(RouterError::InvalidModule { module });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ROUTER, addr, fid};

    const ACCOUNT: u64 = 99;

    fn has_code(address: &ModuleAddress) -> bool {
        *address != addr(ACCOUNT) && !address.is_null()
    }

    fn base_index() -> RouteIndex {
        let mut index = RouteIndex::new();
        index.put(fid(1), addr(1));
        index.put(fid(2), addr(1));
        index.put(fid(3), addr(2));
        index
    }

    #[test]
    fn add_routes_new_functions() {
        let index = base_index();
        let staged = stage_cut(
            &index,
            ROUTER,
            &[CutEntry::add(addr(3), vec![fid(4), fid(5)])],
            has_code,
        )
        .expect("stage");
        assert_eq!(staged.routes_of(&addr(3)), &[fid(4), fid(5)]);
        assert_eq!(staged.modules(), &[addr(1), addr(2), addr(3)]);
        assert!(!index.contains(&fid(4)), "input index must not change");
    }

    #[test]
    fn empty_function_list_is_rejected_before_module_checks() {
        let err = stage_cut(&base_index(), ROUTER, &[CutEntry::remove(vec![])], has_code)
            .expect_err("empty");
        assert_eq!(
            err,
            RouterError::EmptySelectorSet {
                module: ModuleAddress::NULL
            }
        );
    }

    #[test]
    fn add_from_null_module_lists_every_id() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::add(ModuleAddress::NULL, vec![fid(7), fid(8)])],
            has_code,
        )
        .expect_err("null add");
        assert_eq!(
            err,
            RouterError::AddFromNullModule {
                ids: vec![fid(7), fid(8)]
            }
        );
    }

    #[test]
    fn add_to_codeless_module_is_invalid() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::add(addr(ACCOUNT), vec![fid(7)])],
            has_code,
        )
        .expect_err("no code");
        assert_eq!(
            err,
            RouterError::InvalidModule {
                module: addr(ACCOUNT)
            }
        );
    }

    #[test]
    fn add_existing_function_fails() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::add(addr(3), vec![fid(9), fid(1)])],
            has_code,
        )
        .expect_err("exists");
        assert_eq!(err, RouterError::AlreadyExists { id: fid(1) });
    }

    /// Duplicates inside one entry collide with the earlier copy.
    #[test]
    fn add_duplicate_within_entry_fails() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::add(addr(3), vec![fid(9), fid(9)])],
            has_code,
        )
        .expect_err("duplicate");
        assert_eq!(err, RouterError::AlreadyExists { id: fid(9) });
    }

    #[test]
    fn replace_moves_function_to_new_module() {
        let staged = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::replace(addr(2), vec![fid(1)])],
            has_code,
        )
        .expect("stage");
        assert_eq!(staged.resolve(&fid(1)), Some(addr(2)));
        assert_eq!(staged.routes_of(&addr(1)), &[fid(2)]);
        assert_eq!(staged.routes_of(&addr(2)), &[fid(3), fid(1)]);
    }

    #[test]
    fn replace_with_null_module_fails() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::replace(ModuleAddress::NULL, vec![fid(1)])],
            has_code,
        )
        .expect_err("null replace");
        assert_eq!(err, RouterError::ReplaceWithNullModule { ids: vec![fid(1)] });
    }

    #[test]
    fn replace_missing_function_fails() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::replace(addr(2), vec![fid(42)])],
            has_code,
        )
        .expect_err("missing");
        assert_eq!(
            err,
            RouterError::NoSuchRoute {
                action: CutAction::Replace,
                id: fid(42)
            }
        );
    }

    #[test]
    fn replace_with_same_module_fails() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::replace(addr(1), vec![fid(2)])],
            has_code,
        )
        .expect_err("same module");
        assert_eq!(err, RouterError::SameModule { id: fid(2) });
    }

    /// The frozen check runs before the same-module check.
    #[test]
    fn replace_immutable_function_fails() {
        let mut index = base_index();
        index.put(fid(10), ROUTER);
        for target in [addr(2), ROUTER] {
            let err = stage_cut(
                &index,
                ROUTER,
                &[CutEntry::replace(target, vec![fid(10)])],
                |_: &ModuleAddress| true,
            )
            .expect_err("immutable");
            assert_eq!(
                err,
                RouterError::Immutable {
                    action: CutAction::Replace,
                    id: fid(10)
                }
            );
        }
    }

    #[test]
    fn remove_requires_null_module() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry {
                module: addr(1),
                action: CutAction::Remove,
                functions: vec![fid(1)],
            }],
            has_code,
        )
        .expect_err("non-null remove");
        assert_eq!(
            err,
            RouterError::RemoveTargetMustBeNull { module: addr(1) }
        );
    }

    #[test]
    fn remove_missing_function_fails() {
        let err = stage_cut(
            &base_index(),
            ROUTER,
            &[CutEntry::remove(vec![fid(42)])],
            has_code,
        )
        .expect_err("missing");
        assert_eq!(
            err,
            RouterError::NoSuchRoute {
                action: CutAction::Remove,
                id: fid(42)
            }
        );
    }

    #[test]
    fn remove_immutable_function_fails() {
        let mut index = base_index();
        index.put(fid(10), ROUTER);
        let err = stage_cut(&index, ROUTER, &[CutEntry::remove(vec![fid(10)])], has_code)
            .expect_err("immutable");
        assert_eq!(
            err,
            RouterError::Immutable {
                action: CutAction::Remove,
                id: fid(10)
            }
        );
    }

    /// Later entries observe earlier ones within the same cut.
    #[test]
    fn entries_apply_in_order() {
        let staged = stage_cut(
            &base_index(),
            ROUTER,
            &[
                CutEntry::add(addr(3), vec![fid(4)]),
                CutEntry::replace(addr(1), vec![fid(4)]),
                CutEntry::remove(vec![fid(1)]),
            ],
            has_code,
        )
        .expect("stage");
        assert_eq!(staged.resolve(&fid(4)), Some(addr(1)));
        assert!(!staged.contains(&fid(1)));
        assert_eq!(staged.routes_of(&addr(1)), &[fid(4), fid(2)]);
        assert_eq!(staged.modules(), &[addr(1), addr(2)]);
    }

    /// The first failing entry decides the error even if a later entry is also bad.
    #[test]
    fn first_violation_wins() {
        let index = base_index();
        let err = stage_cut(
            &index,
            ROUTER,
            &[
                CutEntry::add(addr(3), vec![fid(4)]),
                CutEntry::remove(vec![fid(42)]),
                CutEntry::add(ModuleAddress::NULL, vec![fid(5)]),
            ],
            has_code,
        )
        .expect_err("violation");
        assert_eq!(
            err,
            RouterError::NoSuchRoute {
                action: CutAction::Remove,
                id: fid(42)
            }
        );
        assert!(!index.contains(&fid(4)));
    }
}
