//! Read-only interface to the stakeholder weight ledger.

use agora_types::{AccountAddress, Tick, VoteWeight};

/// Source of voting weight consulted by the governance engine.
///
/// The engine only ever reads through this trait; weight accounting lives
/// entirely on the other side of it. Implementations are expected to keep an
/// append-only checkpoint log of `(tick, weight)` pairs per account so that
/// `prior_votes` answers from finalized history. The engine always queries
/// ticks strictly before the current one, which keeps snapshot reads immune
/// to same-tick weight movements.
pub trait VotingPowerSource {
    /// Voting weight of `account` as of the end of `tick`.
    fn prior_votes(&self, account: &AccountAddress, tick: Tick) -> VoteWeight;

    /// Live voting weight of `account` at the current tick.
    fn current_votes(&self, account: &AccountAddress) -> VoteWeight;

    /// Total weight in circulation, the base for quorum and threshold math.
    fn total_supply(&self) -> VoteWeight;
}
