//! Error taxonomy shared across crates.

use thiserror::Error;

use crate::address::AccountAddress;

/// Classification of every rejection the engines can produce.
///
/// Callers that do not care about the precise variant can branch on the kind:
/// retrying an `ExecutionFailure` makes sense, retrying an `Authorization`
/// rejection does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks a required role or weight threshold.
    Authorization,
    /// Operation is invalid for the proposal's current derived state.
    Lifecycle,
    /// Structurally invalid input.
    Malformed,
    /// Too early or too late relative to a tick or timestamp boundary.
    Timing,
    /// Proposer already has a live proposal, or an identical action is
    /// already scheduled.
    Duplicate,
    /// The underlying call to the protected resource failed.
    ExecutionFailure,
    /// Infrastructure fault (snapshot serialization and the like), not an
    /// operation rejection.
    Internal,
}

/// Rejections from the two-step role handover.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandoverError {
    #[error("caller {0} does not hold the role")]
    NotHolder(AccountAddress),

    #[error("caller {0} is not the pending holder")]
    NotPending(AccountAddress),
}
