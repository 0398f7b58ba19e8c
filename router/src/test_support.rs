//! Test-only fixtures: deterministic addresses, identifiers and modules.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::core::types::{Call, FunctionId, Initializer, ModuleAddress, ModuleRoutes};
use crate::module::{Executable, ExecutionContext, ExecutionFailure, ModuleHost, StateAccess};
use crate::router::{DeployArgs, Router};

/// The router's own address in fixtures.
pub const ROUTER: ModuleAddress = ModuleAddress::from_low_u64(0xd1a0);
/// Owner account used by [`scenario_router`].
pub const OWNER: ModuleAddress = ModuleAddress::from_low_u64(0x0a11);
/// An address with no code deployed.
pub const ACCOUNT: ModuleAddress = ModuleAddress::from_low_u64(99);

/// Entry point of [`KeyValueInit`].
pub const INITIALIZE: FunctionId = FunctionId::new(*b"init");
/// Entry point of [`SetZ`].
pub const SET_Z: FunctionId = FunctionId::new(*b"setz");

/// Module `X` in [`scenario_router`]: reads `x`.
pub const MODULE_X: ModuleAddress = ModuleAddress::from_low_u64(1);
/// Module `Y` in [`scenario_router`]: reads `y`.
pub const MODULE_Y: ModuleAddress = ModuleAddress::from_low_u64(2);
/// Deployed but unrouted in [`scenario_router`]: runs [`SetZ`].
pub const MODULE_Z: ModuleAddress = ModuleAddress::from_low_u64(3);
/// Deployed but unrouted in [`scenario_router`]: runs [`KeyValueInit`].
pub const MODULE_INIT: ModuleAddress = ModuleAddress::from_low_u64(4);

pub const fn addr(n: u64) -> ModuleAddress {
    ModuleAddress::from_low_u64(n)
}

pub const fn fid(n: u32) -> FunctionId {
    FunctionId::new(n.to_be_bytes())
}

/// Writes every key of an object argument into router storage.
pub struct KeyValueInit;

impl Executable for KeyValueInit {
    fn execute(&self, ctx: &mut ExecutionContext<'_>, call: &Call) -> Result<Value, ExecutionFailure> {
        let Value::Object(entries) = &call.args else {
            return Err(ExecutionFailure::with_message("initializer expects an object"));
        };
        for (key, value) in entries {
            ctx.state.write(key, value.clone());
        }
        Ok(Value::Null)
    }
}

/// Returns one storage key, or `0` when unset.
pub struct Getter {
    key: String,
}

impl Getter {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl Executable for Getter {
    fn execute(&self, ctx: &mut ExecutionContext<'_>, _call: &Call) -> Result<Value, ExecutionFailure> {
        Ok(ctx.state.read(&self.key).cloned().unwrap_or(json!(0)))
    }
}

/// Stores `z`. Rejects `0` with a message and `1337` without one.
pub struct SetZ;

impl Executable for SetZ {
    fn execute(&self, ctx: &mut ExecutionContext<'_>, call: &Call) -> Result<Value, ExecutionFailure> {
        match call.args.as_i64() {
            Some(0) => Err(ExecutionFailure::with_message("cannot set z to zero")),
            Some(1337) => Err(ExecutionFailure::silent()),
            Some(z) => {
                ctx.state.write("z", json!(z));
                Ok(Value::Null)
            }
            None => Err(ExecutionFailure::with_message("z must be an integer")),
        }
    }
}

/// Always fails, optionally with a message.
pub struct Failing(pub Option<&'static str>);

impl Executable for Failing {
    fn execute(&self, _ctx: &mut ExecutionContext<'_>, _call: &Call) -> Result<Value, ExecutionFailure> {
        Err(ExecutionFailure {
            message: self.0.map(str::to_string),
        })
    }
}

/// Host with the fixture modules deployed.
pub fn scenario_host() -> ModuleHost {
    ModuleHost::new()
        .with(MODULE_X, Arc::new(Getter::new("x")))
        .with(MODULE_Y, Arc::new(Getter::new("y")))
        .with(MODULE_Z, Arc::new(SetZ))
        .with(MODULE_INIT, Arc::new(KeyValueInit))
}

/// Initializer that sets `z` through [`SetZ`] deployed at `module`.
pub fn set_z_init(module: ModuleAddress, z: i64) -> Initializer {
    Initializer {
        module,
        call: Call::new(SET_Z, json!(z)),
    }
}

pub fn scenario_args() -> DeployArgs {
    DeployArgs {
        address: ROUTER,
        owner: OWNER,
        modules: vec![
            ModuleRoutes::new(MODULE_X, vec![fid(1), fid(2)]),
            ModuleRoutes::new(MODULE_Y, vec![fid(3)]),
        ],
        init: Initializer {
            module: MODULE_INIT,
            call: Call::new(INITIALIZE, json!({ "x": 123, "y": 456 })),
        },
    }
}

/// Router with `X: [1, 2]`, `Y: [3]` and storage `x = 123`, `y = 456`.
pub fn scenario_router() -> Router {
    match Router::deploy(scenario_args(), scenario_host()) {
        Ok(router) => router,
        Err(err) => panic!("scenario router failed to deploy: {err}"),
    }
}
