use thiserror::Error;

use crate::core::types::{Call, CutAction, FunctionId, ModuleAddress};

/// Failures surfaced by router entry points.
///
/// Every variant except [`RouterError::Reverted`] and
/// [`RouterError::InitializationFailed`] is detected before any state changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("caller {caller} is not the owner ({owner})")]
    NotOwner {
        caller: ModuleAddress,
        owner: ModuleAddress,
    },
    #[error("no function ids provided for module {module}")]
    EmptySelectorSet { module: ModuleAddress },
    #[error("cannot add function ids {} from the null module", join_ids(.ids))]
    AddFromNullModule { ids: Vec<FunctionId> },
    #[error("cannot replace function ids {} with the null module", join_ids(.ids))]
    ReplaceWithNullModule { ids: Vec<FunctionId> },
    #[error("remove target must be the null module, got {module}")]
    RemoveTargetMustBeNull { module: ModuleAddress },
    #[error("no code at module {module}")]
    InvalidModule { module: ModuleAddress },
    #[error("function id {id} already exists")]
    AlreadyExists { id: FunctionId },
    #[error("cannot {action} function id {id}: no such route")]
    NoSuchRoute { action: CutAction, id: FunctionId },
    #[error("cannot {action} immutable function id {id}")]
    Immutable { action: CutAction, id: FunctionId },
    #[error("cannot replace function id {id} with the module it already routes to")]
    SameModule { id: FunctionId },
    #[error("initializer {call} on module {module} failed")]
    InitializationFailed { module: ModuleAddress, call: Call },
    #[error("{}", .message.as_deref().unwrap_or("call reverted without a message"))]
    Reverted {
        module: ModuleAddress,
        message: Option<String>,
    },
    #[error("function {id} not found")]
    RouteNotFound { id: FunctionId },
    #[error("corrupt router state: {reason}")]
    CorruptState { reason: String },
}

impl RouterError {
    /// True for the caller-is-not-owner failure.
    pub fn is_authorization(&self) -> bool {
        matches!(self, RouterError::NotOwner { .. })
    }
}

fn join_ids(ids: &[FunctionId]) -> String {
    let parts: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
