//! The seam between the queue and the protected resource.

use thiserror::Error;

use agora_types::AccountAddress;

use crate::action::Action;

/// Failure reported by the protected resource for one call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("call to {target} failed: {reason}")]
pub struct CallError {
    pub target: AccountAddress,
    pub reason: String,
}

/// Dispatches executed actions to the protected resource.
///
/// The queue invokes this only from execution paths, after the delay and grace
/// windows have passed their checks. The queue guarantees that its own
/// scheduled-action records are all-or-nothing across a batch; a host that
/// also needs the resource-side effects of a partially failed batch rolled
/// back must make its implementation transactional.
pub trait CallExecutor {
    fn call(&mut self, action: &Action) -> Result<(), CallError>;
}
