//! Consistency checks for route tables.

use std::collections::HashSet;

use crate::core::route_index::RouteIndex;
use crate::core::types::{FunctionId, ModuleRoutes};

/// Check persisted route tables before they are loaded into an index:
/// - No null module
/// - No module listed twice
/// - No module with an empty identifier list
/// - No identifier owned twice
pub fn validate_groups(groups: &[ModuleRoutes]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_modules = HashSet::new();
    let mut seen_ids: HashSet<FunctionId> = HashSet::new();

    for (position, group) in groups.iter().enumerate() {
        if group.module.is_null() {
            errors.push(format!("modules[{position}]: null module cannot own routes"));
        }
        if !seen_modules.insert(group.module) {
            errors.push(format!("modules[{position}]: duplicate module {}", group.module));
        }
        if group.functions.is_empty() {
            errors.push(format!("modules[{position}]: module {} owns no functions", group.module));
        }
        for id in &group.functions {
            if !seen_ids.insert(*id) {
                errors.push(format!("modules[{position}]: duplicate function id {id}"));
            }
        }
    }

    errors
}

/// Cross-check the three views of a live index:
/// every routed id appears exactly once in its module's list, and the module
/// list holds exactly the modules that own something.
pub fn check_index(index: &RouteIndex) -> Vec<String> {
    let mut errors = Vec::new();
    let mut listed = 0usize;
    let mut seen_modules = HashSet::new();

    for module in index.modules() {
        if !seen_modules.insert(*module) {
            errors.push(format!("module {module} listed twice"));
        }
        let ids = index.routes_of(module);
        if ids.is_empty() {
            errors.push(format!("module {module} listed without functions"));
        }
        for id in ids {
            listed += 1;
            match index.resolve(id) {
                Some(owner) if owner == *module => {}
                Some(owner) => errors.push(format!(
                    "function {id} listed under {module} but routed to {owner}"
                )),
                None => errors.push(format!("function {id} listed under {module} but unrouted")),
            }
            let copies = ids.iter().filter(|other| *other == id).count();
            if copies != 1 {
                errors.push(format!("function {id} appears {copies} times under {module}"));
            }
        }
    }

    if listed != index.len() {
        errors.push(format!(
            "{} routes indexed but {listed} listed under modules",
            index.len()
        ));
    }

    errors
}
