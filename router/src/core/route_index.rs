//! Bidirectional identifier/module index.
//!
//! Three views are kept in lockstep:
//! - identifier → (owning module, slot in that module's list)
//! - module → ordered list of owned identifiers
//! - ordered list of modules that own at least one identifier
//!
//! Removal from either list is swap-with-last then pop, so it is O(1) and
//! reorders the list unless the removed element was already last.

use std::collections::HashMap;

use crate::core::types::{FunctionId, ModuleAddress, ModuleRoutes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RouteSlot {
    module: ModuleAddress,
    position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModuleSlot {
    functions: Vec<FunctionId>,
    position: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteIndex {
    routes: HashMap<FunctionId, RouteSlot>,
    modules: HashMap<ModuleAddress, ModuleSlot>,
    order: Vec<ModuleAddress>,
}

impl RouteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an index by inserting every module's identifiers in listed order.
    ///
    /// Feeding back the output of [`RouteIndex::groups`] reproduces the same
    /// module order and per-module order.
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a ModuleRoutes>) -> Self {
        let mut index = Self::new();
        for group in groups {
            for id in &group.functions {
                index.put(*id, group.module);
            }
        }
        index
    }

    pub fn resolve(&self, id: &FunctionId) -> Option<ModuleAddress> {
        self.routes.get(id).map(|slot| slot.module)
    }

    pub fn contains(&self, id: &FunctionId) -> bool {
        self.routes.contains_key(id)
    }

    /// Identifiers owned by `module` in internal order. Empty for unknown modules.
    pub fn routes_of(&self, module: &ModuleAddress) -> &[FunctionId] {
        self.modules
            .get(module)
            .map(|slot| slot.functions.as_slice())
            .unwrap_or(&[])
    }

    pub fn modules(&self) -> &[ModuleAddress] {
        &self.order
    }

    /// Every module paired with its identifiers, in module order.
    pub fn groups(&self) -> Vec<ModuleRoutes> {
        self.order
            .iter()
            .map(|module| ModuleRoutes::new(*module, self.routes_of(module).to_vec()))
            .collect()
    }

    /// Number of routed identifiers.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route `id` to `module`, detaching it from any previous owner first.
    ///
    /// Re-putting an identifier onto its current module keeps its slot.
    pub fn put(&mut self, id: FunctionId, module: ModuleAddress) {
        debug_assert!(!module.is_null(), "null module is never a route target");
        if let Some(slot) = self.routes.get(&id).copied() {
            if slot.module == module {
                return;
            }
            self.detach(id, slot);
        }

        let next_position = self.order.len();
        let record = self.modules.entry(module).or_insert_with(|| ModuleSlot {
            functions: Vec::new(),
            position: next_position,
        });
        if record.functions.is_empty() {
            self.order.push(module);
        }
        record.functions.push(id);
        let position = record.functions.len() - 1;
        self.routes.insert(id, RouteSlot { module, position });
    }

    /// Drop the route for `id`, returning the module that owned it.
    pub fn erase(&mut self, id: &FunctionId) -> Option<ModuleAddress> {
        let slot = self.routes.get(id).copied()?;
        self.detach(*id, slot);
        Some(slot.module)
    }

    fn detach(&mut self, id: FunctionId, slot: RouteSlot) {
        self.routes.remove(&id);
        let Some(record) = self.modules.get_mut(&slot.module) else {
            return;
        };

        let last = record.functions.len() - 1;
        if slot.position != last {
            let moved = record.functions[last];
            record.functions[slot.position] = moved;
            if let Some(moved_slot) = self.routes.get_mut(&moved) {
                moved_slot.position = slot.position;
            }
        }
        record.functions.pop();

        if record.functions.is_empty() {
            let position = record.position;
            self.modules.remove(&slot.module);
            self.prune_module(position);
        }
    }

    fn prune_module(&mut self, position: usize) {
        let last = self.order.len() - 1;
        if position != last {
            let moved = self.order[last];
            self.order[position] = moved;
            if let Some(moved_record) = self.modules.get_mut(&moved) {
                moved_record.position = position;
            }
        }
        self.order.pop();
    }
}
