//! Weighted-stakeholder governance over a time-locked execution queue.
//!
//! Lifecycle: propose → approve → vote → queue → execute (or cancel).
//! Creation needs weight above a proposer threshold, approval opens the
//! voting window, votes count snapshot weight, and a winning tally is
//! handed to the timelock where it waits out the enforced delay.
//!
//! Weight itself lives behind [`VotingPowerSource`]; this crate never
//! mints, moves, or delegates it.

pub mod engine;
pub mod error;
pub mod params;
pub mod power;
pub mod proposal;

pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use params::{
    GovernanceParams, MAX_PROPOSAL_ACTIONS, MAX_VOTING_DELAY_TICKS, MAX_VOTING_PERIOD_TICKS,
    MIN_VOTING_DELAY_TICKS, MIN_VOTING_PERIOD_TICKS,
};
pub use power::VotingPowerSource;
pub use proposal::{Proposal, ProposalId, ProposalState, VoteReceipt};
