use thiserror::Error;

use agora_timelock::TimelockError;
use agora_types::{AccountAddress, ErrorKind, Tick};

use crate::proposal::{ProposalId, ProposalState};

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} does not exist")]
    UnknownProposal(ProposalId),

    #[error("proposer weight {have} does not exceed the creation threshold {need}")]
    InsufficientPower { have: u128, need: u128 },

    #[error("proposal must bundle between 1 and {max} actions, got {got}")]
    MalformedProposal { got: usize, max: usize },

    #[error("proposer already has a live proposal ({0})")]
    DuplicateLiveProposal(ProposalId),

    #[error("proposal {0} is already approved or canceled")]
    AlreadyApproved(ProposalId),

    #[error("approval window for proposal {id} closed at {closed_at}")]
    ApprovalWindowClosed { id: ProposalId, closed_at: Tick },

    #[error("approver weight {have} does not exceed the approval threshold {need}")]
    BelowApprovalThreshold { have: u128, need: u128 },

    #[error("voting on proposal {0} is closed")]
    VotingClosed(ProposalId),

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: AccountAddress },

    #[error("vote tally overflow")]
    TallyOverflow,

    #[error("proposal {id} is {actual}, expected {expected}")]
    InvalidState {
        id: ProposalId,
        actual: ProposalState,
        expected: ProposalState,
    },

    #[error("proposal {0} missed its execution window")]
    ProposalExpired(ProposalId),

    #[error("cannot cancel executed proposal {0}")]
    CannotCancelExecuted(ProposalId),

    #[error("proposer of {0} still holds threshold weight")]
    ProposerAboveThreshold(ProposalId),

    #[error("{0} is not the administrator")]
    NotAdmin(AccountAddress),

    #[error("{0} is not the pending administrator")]
    NotPendingAdmin(AccountAddress),

    #[error("{0} is not the guardian")]
    NotGuardian(AccountAddress),

    #[error("{name} value {value} outside [{min}, {max}]")]
    ParamOutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error(transparent)]
    Timelock(#[from] TimelockError),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(String),
}

impl GovernanceError {
    /// Coarse classification for callers that branch on failure class
    /// rather than on the exact variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientPower { .. }
            | Self::BelowApprovalThreshold { .. }
            | Self::ProposerAboveThreshold(_)
            | Self::NotAdmin(_)
            | Self::NotPendingAdmin(_)
            | Self::NotGuardian(_) => ErrorKind::Authorization,
            Self::AlreadyApproved(_)
            | Self::VotingClosed(_)
            | Self::AlreadyVoted { .. }
            | Self::InvalidState { .. }
            | Self::CannotCancelExecuted(_) => ErrorKind::Lifecycle,
            Self::UnknownProposal(_)
            | Self::MalformedProposal { .. }
            | Self::ParamOutOfRange { .. } => ErrorKind::Malformed,
            Self::ApprovalWindowClosed { .. } | Self::ProposalExpired(_) => ErrorKind::Timing,
            Self::DuplicateLiveProposal(_) => ErrorKind::Duplicate,
            Self::Timelock(inner) => inner.kind(),
            Self::TallyOverflow | Self::Snapshot(_) => ErrorKind::Internal,
        }
    }
}
