//! The router aggregate: route index, owner, durable storage and event log.
//!
//! Mutating entry points stage their effects on copies and commit only when
//! every step (including a forwarded initializer) succeeds, so a failed call
//! leaves routes, storage, owner and events exactly as they were.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::cut::stage_cut;
use crate::core::immutability::immutable_functions;
use crate::core::invariants::validate_groups;
use crate::core::loupe::Loupe;
use crate::core::ownership::OwnershipGate;
use crate::core::route_index::RouteIndex;
use crate::core::types::{
    Call, Cut, CutEntry, FunctionId, Initializer, ModuleAddress, ModuleRoutes, RouterEvent,
};
use crate::error::RouterError;
use crate::module::{ExecutionContext, ModuleHost, ModuleSource, Storage};

/// Current [`RouterSnapshot`] format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Construction parameters for [`Router::deploy`].
#[derive(Debug, Clone)]
pub struct DeployArgs {
    /// The router's own address. Routes to it are immutable.
    pub address: ModuleAddress,
    pub owner: ModuleAddress,
    /// Initial routes, added in order.
    pub modules: Vec<ModuleRoutes>,
    /// Mandatory one-shot initializer run as part of construction.
    pub init: Initializer,
}

/// Persisted router state: owner, route tables and storage.
///
/// Code is not part of a snapshot; restoring needs a [`ModuleSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterSnapshot {
    pub version: u32,
    pub address: ModuleAddress,
    pub owner: ModuleAddress,
    pub modules: Vec<ModuleRoutes>,
    pub storage: Storage,
}

#[derive(Debug)]
pub struct Router<H = ModuleHost> {
    address: ModuleAddress,
    gate: OwnershipGate,
    index: RouteIndex,
    storage: Storage,
    host: H,
    events: Vec<RouterEvent>,
}

impl<H: ModuleSource> Router<H> {
    /// Build a router from its initial routes and run the mandatory initializer.
    ///
    /// Returns an error, and no router, if any route is invalid or the
    /// initializer fails.
    #[instrument(skip_all, fields(address = %args.address, owner = %args.owner, modules = args.modules.len()))]
    pub fn deploy(args: DeployArgs, host: H) -> Result<Self, RouterError> {
        if args.address.is_null() {
            return Err(RouterError::InvalidModule {
                module: args.address,
            });
        }

        let entries: Vec<CutEntry> = args
            .modules
            .into_iter()
            .map(|group| CutEntry::add(group.module, group.functions))
            .collect();
        let index = stage_cut(&RouteIndex::new(), args.address, &entries, |module| {
            has_code(&host, args.address, module)
        })?;
        let storage = run_initializer(
            &host,
            args.address,
            args.owner,
            &Storage::new(),
            &args.init,
        )?;

        let cut = Cut::new(entries).with_init(args.init);
        let events = vec![
            RouterEvent::OwnershipTransferred {
                previous: ModuleAddress::NULL,
                current: args.owner,
            },
            RouterEvent::CutApplied { cut },
        ];
        info!(routes = index.len(), "router deployed");

        Ok(Self {
            address: args.address,
            gate: OwnershipGate::new(args.owner),
            index,
            storage,
            host,
            events,
        })
    }

    /// Rebuild a router from persisted state. No initializer runs and no
    /// events are recorded.
    pub fn restore(snapshot: RouterSnapshot, host: H) -> Result<Self, RouterError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RouterError::CorruptState {
                reason: format!(
                    "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            });
        }
        if snapshot.address.is_null() {
            return Err(RouterError::CorruptState {
                reason: "router address is null".to_string(),
            });
        }
        let errors = validate_groups(&snapshot.modules);
        if !errors.is_empty() {
            return Err(RouterError::CorruptState {
                reason: errors.join("; "),
            });
        }

        let index = RouteIndex::from_groups(&snapshot.modules);
        debug!(address = %snapshot.address, routes = index.len(), "router restored");
        Ok(Self {
            address: snapshot.address,
            gate: OwnershipGate::new(snapshot.owner),
            index,
            storage: snapshot.storage,
            host,
            events: Vec::new(),
        })
    }

    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            version: SNAPSHOT_VERSION,
            address: self.address,
            owner: self.gate.owner(),
            modules: self.index.groups(),
            storage: self.storage.clone(),
        }
    }

    /// Apply `cut` atomically on behalf of `caller`.
    ///
    /// Order of checks: ownership, then entries in order, then identifiers in
    /// order, then the initializer. The first failure is returned and nothing
    /// is committed.
    #[instrument(skip_all, fields(caller = %caller, entries = cut.entries.len(), init = cut.init.is_some()))]
    pub fn apply_cut(&mut self, caller: ModuleAddress, cut: Cut) -> Result<(), RouterError> {
        self.gate.require_owner(caller).inspect_err(|err| {
            warn!(error = %err, "cut rejected");
        })?;

        let staged = stage_cut(&self.index, self.address, &cut.entries, |module| {
            has_code(&self.host, self.address, module)
        })?;
        let storage = match &cut.init {
            Some(init) => Some(run_initializer(
                &self.host,
                self.address,
                caller,
                &self.storage,
                init,
            )?),
            None => None,
        };

        self.index = staged;
        if let Some(storage) = storage {
            self.storage = storage;
        }
        info!(routes = self.index.len(), modules = self.index.modules().len(), "cut applied");
        self.events.push(RouterEvent::CutApplied { cut });
        Ok(())
    }

    #[instrument(skip_all, fields(caller = %caller, new_owner = %new_owner))]
    pub fn transfer_ownership(
        &mut self,
        caller: ModuleAddress,
        new_owner: ModuleAddress,
    ) -> Result<(), RouterError> {
        let event = self.gate.transfer(caller, new_owner)?;
        info!("ownership transferred");
        self.events.push(event);
        Ok(())
    }

    /// Forward `args` to the module routed for `id`, running its code against
    /// this router's storage. A failing call leaves storage unchanged and its
    /// failure is returned as-is.
    #[instrument(skip_all, fields(caller = %caller, function = %id))]
    pub fn dispatch(
        &mut self,
        caller: ModuleAddress,
        id: FunctionId,
        args: Value,
    ) -> Result<Value, RouterError> {
        let module = self.module_of(&id)?;
        let call = Call::new(id, args);
        let (output, storage) =
            forward(&self.host, self.address, caller, module, &self.storage, &call)?;
        self.storage = storage;
        Ok(output)
    }

    pub fn address(&self) -> ModuleAddress {
        self.address
    }

    pub fn owner(&self) -> ModuleAddress {
        self.gate.owner()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Identifiers routed to the router itself.
    pub fn immutable_functions(&self) -> Vec<FunctionId> {
        immutable_functions(&self.index, self.address)
    }

    /// Notifications recorded so far, oldest first.
    pub fn events(&self) -> &[RouterEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<RouterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Module code lives outside the router; deploying new code does not
    /// touch routes.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H> Loupe for Router<H> {
    fn route_index(&self) -> &RouteIndex {
        &self.index
    }
}

/// The router's own address always counts as code.
fn has_code<H: ModuleSource>(host: &H, router: ModuleAddress, module: &ModuleAddress) -> bool {
    *module == router || host.code_at(module).is_some()
}

/// Run `call` on `module`'s code against a scratch copy of `storage`.
///
/// Returns the output and the updated copy on success.
fn forward<H: ModuleSource>(
    host: &H,
    router: ModuleAddress,
    caller: ModuleAddress,
    module: ModuleAddress,
    storage: &Storage,
    call: &Call,
) -> Result<(Value, Storage), RouterError> {
    let code = host
        .code_at(&module)
        .ok_or(RouterError::InvalidModule { module })?;
    let mut scratch = storage.clone();
    let mut ctx = ExecutionContext {
        caller,
        router,
        state: &mut scratch,
    };
    match code.execute(&mut ctx, call) {
        Ok(output) => Ok((output, scratch)),
        Err(failure) => {
            debug!(module = %module, function = %call.function, failure = %failure, "forwarded call failed");
            Err(RouterError::Reverted {
                module,
                message: failure.message,
            })
        }
    }
}

/// Forward an initializer. A failure without a message becomes
/// [`RouterError::InitializationFailed`].
fn run_initializer<H: ModuleSource>(
    host: &H,
    router: ModuleAddress,
    caller: ModuleAddress,
    storage: &Storage,
    init: &Initializer,
) -> Result<Storage, RouterError> {
    match forward(host, router, caller, init.module, storage, &init.call) {
        Ok((_, storage)) => Ok(storage),
        Err(RouterError::Reverted {
            module,
            message: None,
        }) => Err(RouterError::InitializationFailed {
            module,
            call: init.call.clone(),
        }),
        Err(err) => Err(err),
    }
}
