//! Proposal records and their derived lifecycle state.

use serde::{Deserialize, Serialize};

use agora_timelock::Action;
use agora_types::{AccountAddress, Tick, Timestamp, VoteWeight};

/// Sequential proposal identifier, starting at 1.
pub type ProposalId = u64;

/// The 8 lifecycle states a proposal can be observed in.
///
/// State is never stored. It is derived on demand from the proposal record
/// and the two time sources, so every reader at the same `(tick, now)` sees
/// the same answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created, waiting for approval or for its voting window to open.
    Pending,
    /// Inside the voting window.
    Active,
    /// Canceled by the proposer, the guardian, or a sweep.
    Canceled,
    /// Voting closed without majority or quorum.
    Defeated,
    /// Voting won, not yet handed to the timelock.
    Succeeded,
    /// Scheduled on the timelock, waiting out the delay.
    Queued,
    /// Missed its approval window or its execution grace window.
    Expired,
    /// All bundled actions ran.
    Executed,
}

impl ProposalState {
    /// True for states that end the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Defeated | Self::Expired | Self::Executed)
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Defeated => "defeated",
            Self::Succeeded => "succeeded",
            Self::Queued => "queued",
            Self::Expired => "expired",
            Self::Executed => "executed",
        };
        write!(f, "{name}")
    }
}

/// One stakeholder's recorded vote on one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// True for a vote in favor.
    pub support: bool,
    /// Weight counted, snapshotted at the tick before the window opened.
    pub weight: VoteWeight,
}

/// A governance proposal.
///
/// The window fields stay `None` until approval fixes them; `eta` stays
/// `None` until the proposal is queued. The two terminal flags are the only
/// stored lifecycle facts, everything else is derived.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    /// Who opened it.
    pub proposer: AccountAddress,
    /// Actions handed to the timelock on queue, executed in order.
    pub actions: Vec<Action>,
    /// Free-form rationale shown to voters.
    pub description: String,
    /// Tick the proposal was created at.
    pub created_at_tick: Tick,
    /// Who seconded it, once someone has.
    pub approver: Option<AccountAddress>,
    /// Last tick before the voting window, fixed at approval.
    pub start_tick: Option<Tick>,
    /// Last tick of the voting window, fixed at approval.
    pub end_tick: Option<Tick>,
    /// Earliest execution time, fixed when queued.
    pub eta: Option<Timestamp>,
    pub for_votes: VoteWeight,
    pub against_votes: VoteWeight,
    pub canceled: bool,
    pub executed: bool,
}

impl Proposal {
    /// Tick whose weight snapshot decides votes on this proposal.
    pub fn voting_snapshot_tick(&self) -> Option<Tick> {
        self.start_tick.map(|start| start.prior())
    }

    /// Derive the lifecycle state at `(tick, now)`.
    ///
    /// Checks run in precedence order: the stored terminal flags first, then
    /// the approval window, then tick position against the voting window,
    /// then the tally, then the execution grace window.
    pub fn derive_state(
        &self,
        tick: Tick,
        now: Timestamp,
        approval_window_ticks: u64,
        grace_period_secs: u64,
        quorum_votes: VoteWeight,
    ) -> ProposalState {
        if self.canceled {
            return ProposalState::Canceled;
        }
        if self.executed {
            return ProposalState::Executed;
        }
        let (start, end) = match (self.start_tick, self.end_tick) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                // Never approved: only the approval window matters.
                let closes_at = self.created_at_tick.plus(approval_window_ticks);
                return if tick > closes_at {
                    ProposalState::Expired
                } else {
                    ProposalState::Pending
                };
            }
        };
        if tick <= start {
            return ProposalState::Pending;
        }
        if tick <= end {
            return ProposalState::Active;
        }
        if self.for_votes <= self.against_votes || self.for_votes < quorum_votes {
            return ProposalState::Defeated;
        }
        match self.eta {
            None => ProposalState::Succeeded,
            Some(eta) if eta.has_expired(grace_period_secs, now) => ProposalState::Expired,
            Some(_) => ProposalState::Queued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 100;
    const GRACE: u64 = 1_000;

    fn addr(name: &str) -> AccountAddress {
        AccountAddress::new(format!("agr_{name}"))
    }

    fn bare_proposal() -> Proposal {
        Proposal {
            id: 1,
            proposer: addr("alice"),
            actions: vec![Action::new(addr("treasury"), 0, "noop", Vec::new())],
            description: "test".to_string(),
            created_at_tick: Tick::new(10),
            approver: None,
            start_tick: None,
            end_tick: None,
            eta: None,
            for_votes: VoteWeight::ZERO,
            against_votes: VoteWeight::ZERO,
            canceled: false,
            executed: false,
        }
    }

    fn approved_proposal() -> Proposal {
        let mut proposal = bare_proposal();
        proposal.approver = Some(addr("bob"));
        proposal.start_tick = Some(Tick::new(20));
        proposal.end_tick = Some(Tick::new(120));
        proposal
    }

    fn state_at(proposal: &Proposal, tick: u64, now: u64, quorum: u128) -> ProposalState {
        proposal.derive_state(
            Tick::new(tick),
            Timestamp::new(now),
            WINDOW,
            GRACE,
            VoteWeight::new(quorum),
        )
    }

    #[test]
    fn test_canceled_wins_over_everything() {
        let mut proposal = approved_proposal();
        proposal.canceled = true;
        proposal.executed = true;
        assert_eq!(state_at(&proposal, 500, 0, 1), ProposalState::Canceled);
    }

    #[test]
    fn test_executed_wins_over_time_checks() {
        let mut proposal = approved_proposal();
        proposal.executed = true;
        assert_eq!(state_at(&proposal, 500, u64::MAX, 1), ProposalState::Executed);
    }

    #[test]
    fn test_unapproved_pending_until_window_closes() {
        let proposal = bare_proposal();
        // Created at tick 10, window 100: approvable through tick 110.
        assert_eq!(state_at(&proposal, 10, 0, 1), ProposalState::Pending);
        assert_eq!(state_at(&proposal, 110, 0, 1), ProposalState::Pending);
        assert_eq!(state_at(&proposal, 111, 0, 1), ProposalState::Expired);
    }

    #[test]
    fn test_pending_through_start_tick() {
        let proposal = approved_proposal();
        assert_eq!(state_at(&proposal, 19, 0, 1), ProposalState::Pending);
        assert_eq!(state_at(&proposal, 20, 0, 1), ProposalState::Pending);
        assert_eq!(state_at(&proposal, 21, 0, 1), ProposalState::Active);
    }

    #[test]
    fn test_active_through_end_tick() {
        let proposal = approved_proposal();
        assert_eq!(state_at(&proposal, 120, 0, 1), ProposalState::Active);
        assert_eq!(state_at(&proposal, 121, 0, 1), ProposalState::Defeated);
    }

    #[test]
    fn test_tie_is_defeated() {
        let mut proposal = approved_proposal();
        proposal.for_votes = VoteWeight::new(50);
        proposal.against_votes = VoteWeight::new(50);
        assert_eq!(state_at(&proposal, 121, 0, 10), ProposalState::Defeated);
    }

    #[test]
    fn test_majority_below_quorum_is_defeated() {
        let mut proposal = approved_proposal();
        proposal.for_votes = VoteWeight::new(9);
        proposal.against_votes = VoteWeight::new(1);
        assert_eq!(state_at(&proposal, 121, 0, 10), ProposalState::Defeated);
    }

    #[test]
    fn test_quorum_met_exactly_succeeds() {
        let mut proposal = approved_proposal();
        proposal.for_votes = VoteWeight::new(10);
        proposal.against_votes = VoteWeight::new(1);
        assert_eq!(state_at(&proposal, 121, 0, 10), ProposalState::Succeeded);
    }

    #[test]
    fn test_queued_until_grace_deadline() {
        let mut proposal = approved_proposal();
        proposal.for_votes = VoteWeight::new(100);
        proposal.eta = Some(Timestamp::new(5_000));
        // Grace runs to eta + 1_000; the deadline itself reads as expired.
        assert_eq!(state_at(&proposal, 121, 5_999, 10), ProposalState::Queued);
        assert_eq!(state_at(&proposal, 121, 6_000, 10), ProposalState::Expired);
    }

    #[test]
    fn test_is_terminal() {
        assert!(ProposalState::Canceled.is_terminal());
        assert!(ProposalState::Defeated.is_terminal());
        assert!(ProposalState::Expired.is_terminal());
        assert!(ProposalState::Executed.is_terminal());
        assert!(!ProposalState::Pending.is_terminal());
        assert!(!ProposalState::Active.is_terminal());
        assert!(!ProposalState::Succeeded.is_terminal());
        assert!(!ProposalState::Queued.is_terminal());
    }

    #[test]
    fn test_voting_snapshot_tick_is_start_prior() {
        let proposal = approved_proposal();
        assert_eq!(proposal.voting_snapshot_tick(), Some(Tick::new(19)));
        assert_eq!(bare_proposal().voting_snapshot_tick(), None);
    }
}
