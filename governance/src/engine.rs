//! The proposal lifecycle engine.
//!
//! Owns the proposal table, the vote receipts, and the two privileged
//! roles. Time and voting weight are always passed in: every operation
//! takes the current `Tick` and/or `Timestamp` plus a [`VotingPowerSource`],
//! so the engine itself holds no clock and no balances.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use agora_timelock::{Action, CallExecutor, TimelockQueue, GRACE_PERIOD_SECS};
use agora_types::{
    AccountAddress, HandoverError, RoleHandover, Tick, Timestamp, VoteWeight, MAX_BPS,
};

use crate::error::GovernanceError;
use crate::params::{
    self, GovernanceParams, MAX_PROPOSAL_ACTIONS, MAX_VOTING_DELAY_TICKS,
    MAX_VOTING_PERIOD_TICKS, MIN_VOTING_DELAY_TICKS, MIN_VOTING_PERIOD_TICKS,
};
use crate::power::VotingPowerSource;
use crate::proposal::{Proposal, ProposalId, ProposalState, VoteReceipt};

pub struct GovernanceEngine {
    /// Address this engine acts under when talking to the timelock.
    identity: AccountAddress,
    params: GovernanceParams,
    admin: RoleHandover,
    guardian: Option<AccountAddress>,
    proposals: HashMap<ProposalId, Proposal>,
    /// Highest id handed out so far; ids start at 1.
    proposal_count: u64,
    latest_proposal: HashMap<AccountAddress, ProposalId>,
    receipts: HashMap<(ProposalId, AccountAddress), VoteReceipt>,
}

impl GovernanceEngine {
    /// Create an engine with `deployer` holding both privileged roles.
    ///
    /// The deployer keeps the administrator role until it is handed over
    /// through `set_pending_admin`/`accept_admin`, and the guardian role
    /// until `abdicate`.
    pub fn new(
        identity: AccountAddress,
        deployer: AccountAddress,
        params: GovernanceParams,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            identity,
            params,
            admin: RoleHandover::new(deployer.clone()),
            guardian: Some(deployer),
            proposals: HashMap::new(),
            proposal_count: 0,
            latest_proposal: HashMap::new(),
            receipts: HashMap::new(),
        })
    }

    // ── Derived thresholds ───────────────────────────────────────────────

    /// Weight the winning tally must reach for a vote to count.
    pub fn quorum_votes(&self, power: &dyn VotingPowerSource) -> VoteWeight {
        power.total_supply().scale_bps(self.params.quorum_bps)
    }

    /// Weight an approver must exceed to second a proposal.
    pub fn approve_votes(&self, power: &dyn VotingPowerSource) -> VoteWeight {
        power.total_supply().scale_bps(self.params.approve_bps)
    }

    /// Weight a proposer must exceed to open a proposal.
    pub fn create_votes(&self, power: &dyn VotingPowerSource) -> VoteWeight {
        power.total_supply().scale_bps(self.params.create_bps)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Open a new proposal bundling `actions`.
    ///
    /// The caller's live weight must exceed the creation threshold, the
    /// bundle must hold between 1 and [`MAX_PROPOSAL_ACTIONS`] actions, and
    /// the caller's previous proposal (if any) must have reached a terminal
    /// state.
    pub fn propose(
        &mut self,
        caller: &AccountAddress,
        actions: Vec<Action>,
        description: String,
        power: &dyn VotingPowerSource,
        tick: Tick,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let threshold = self.create_votes(power);
        let have = power.current_votes(caller);
        if have <= threshold {
            return Err(GovernanceError::InsufficientPower {
                have: have.raw(),
                need: threshold.raw(),
            });
        }
        if actions.is_empty() || actions.len() > MAX_PROPOSAL_ACTIONS {
            return Err(GovernanceError::MalformedProposal {
                got: actions.len(),
                max: MAX_PROPOSAL_ACTIONS,
            });
        }
        if let Some(&prior_id) = self.latest_proposal.get(caller) {
            if let Some(prior) = self.proposals.get(&prior_id) {
                if !self.state_of(prior, tick, now, power).is_terminal() {
                    return Err(GovernanceError::DuplicateLiveProposal(prior_id));
                }
            }
        }
        let id = self.proposal_count + 1;
        self.proposals.insert(
            id,
            Proposal {
                id,
                proposer: caller.clone(),
                actions,
                description,
                created_at_tick: tick,
                approver: None,
                start_tick: None,
                end_tick: None,
                eta: None,
                for_votes: VoteWeight::ZERO,
                against_votes: VoteWeight::ZERO,
                canceled: false,
                executed: false,
            },
        );
        self.proposal_count = id;
        self.latest_proposal.insert(caller.clone(), id);
        tracing::info!(id, proposer = %caller, "proposal created");
        Ok(id)
    }

    /// Second a pending proposal, fixing its voting window.
    ///
    /// The approver's weight is read at the tick before creation, so weight
    /// moved after the proposal appeared cannot be used to approve it. The
    /// window opens after the configured delay: voting runs over
    /// `(approve_tick + voting_delay + 1, start + voting_period]`.
    pub fn approve(
        &mut self,
        caller: &AccountAddress,
        id: ProposalId,
        power: &dyn VotingPowerSource,
        tick: Tick,
    ) -> Result<(), GovernanceError> {
        let threshold = self.approve_votes(power);
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        if proposal.approver.is_some() || proposal.canceled {
            return Err(GovernanceError::AlreadyApproved(id));
        }
        let closed_at = proposal.created_at_tick.plus(self.params.approval_window_ticks);
        if tick > closed_at {
            return Err(GovernanceError::ApprovalWindowClosed { id, closed_at });
        }
        let have = power.prior_votes(caller, proposal.created_at_tick.prior());
        if have <= threshold {
            return Err(GovernanceError::BelowApprovalThreshold {
                have: have.raw(),
                need: threshold.raw(),
            });
        }
        let start = tick.plus(self.params.voting_delay_ticks + 1);
        let end = start.plus(self.params.voting_period_ticks);
        proposal.approver = Some(caller.clone());
        proposal.start_tick = Some(start);
        proposal.end_tick = Some(end);
        tracing::info!(id, approver = %caller, %start, %end, "proposal approved");
        Ok(())
    }

    /// Record a vote for or against an active proposal.
    ///
    /// Weight is read at the tick before the voting window opened and the
    /// counted amount is returned. One receipt per voter per proposal.
    pub fn cast_vote(
        &mut self,
        caller: &AccountAddress,
        id: ProposalId,
        support: bool,
        power: &dyn VotingPowerSource,
        tick: Tick,
        now: Timestamp,
    ) -> Result<VoteWeight, GovernanceError> {
        let quorum = self.quorum_votes(power);
        let window = self.params.approval_window_ticks;
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        let state = proposal.derive_state(tick, now, window, GRACE_PERIOD_SECS, quorum);
        if state != ProposalState::Active {
            return Err(GovernanceError::VotingClosed(id));
        }
        if self.receipts.contains_key(&(id, caller.clone())) {
            return Err(GovernanceError::AlreadyVoted {
                id,
                voter: caller.clone(),
            });
        }
        // Active guarantees the window fields are set.
        let snapshot_tick = proposal
            .voting_snapshot_tick()
            .ok_or(GovernanceError::VotingClosed(id))?;
        let weight = power.prior_votes(caller, snapshot_tick);
        if support {
            proposal.for_votes = proposal
                .for_votes
                .checked_add(weight)
                .ok_or(GovernanceError::TallyOverflow)?;
        } else {
            proposal.against_votes = proposal
                .against_votes
                .checked_add(weight)
                .ok_or(GovernanceError::TallyOverflow)?;
        }
        self.receipts
            .insert((id, caller.clone()), VoteReceipt { support, weight });
        tracing::debug!(id, voter = %caller, support, %weight, "vote recorded");
        Ok(weight)
    }

    /// Hand a succeeded proposal to the timelock.
    ///
    /// Every bundled action is scheduled at `now + delay`; scheduling is
    /// all-or-nothing, so a collision with an already queued action leaves
    /// the proposal untouched. Callable by anyone, the state check is the
    /// gate. Returns the eta.
    pub fn queue(
        &mut self,
        timelock: &mut TimelockQueue,
        id: ProposalId,
        power: &dyn VotingPowerSource,
        tick: Tick,
        now: Timestamp,
    ) -> Result<Timestamp, GovernanceError> {
        let state = self.state(id, tick, now, power)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::InvalidState {
                id,
                actual: state,
                expected: ProposalState::Succeeded,
            });
        }
        let eta = now.plus_secs(timelock.delay_secs());
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        timelock.schedule_batch(&self.identity, &proposal.actions, eta, now)?;
        proposal.eta = Some(eta);
        tracing::info!(id, %eta, "proposal queued");
        Ok(eta)
    }

    /// Execute a queued proposal whose eta has arrived.
    ///
    /// Runs the bundled actions in order through the timelock. Any failure
    /// aborts the whole attempt: the proposal stays Queued, every action
    /// stays scheduled, and the call can be retried inside the grace
    /// window. Callable by anyone.
    pub fn execute(
        &mut self,
        timelock: &mut TimelockQueue,
        id: ProposalId,
        power: &dyn VotingPowerSource,
        tick: Tick,
        now: Timestamp,
        executor: &mut dyn CallExecutor,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get(id)?;
        let state = self.state_of(proposal, tick, now, power);
        if state == ProposalState::Expired {
            return Err(GovernanceError::ProposalExpired(id));
        }
        let eta = match (state, proposal.eta) {
            (ProposalState::Queued, Some(eta)) => eta,
            _ => {
                return Err(GovernanceError::InvalidState {
                    id,
                    actual: state,
                    expected: ProposalState::Queued,
                })
            }
        };
        timelock.execute_batch(&self.identity, &proposal.actions, eta, now, executor)?;
        let record = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        record.executed = true;
        tracing::info!(id, "proposal executed");
        Ok(())
    }

    /// Cancel a proposal and clear anything it scheduled on the timelock.
    ///
    /// The guardian and the proposer may always cancel. Anyone else may
    /// sweep only once the proposer's live weight has dropped below the
    /// creation threshold. Executed proposals cannot be canceled.
    pub fn cancel(
        &mut self,
        timelock: &mut TimelockQueue,
        caller: &AccountAddress,
        id: ProposalId,
        power: &dyn VotingPowerSource,
    ) -> Result<(), GovernanceError> {
        let threshold = self.create_votes(power);
        let proposal = self.get(id)?;
        if proposal.executed {
            return Err(GovernanceError::CannotCancelExecuted(id));
        }
        let privileged =
            self.guardian.as_ref() == Some(caller) || &proposal.proposer == caller;
        if !privileged && power.current_votes(&proposal.proposer) >= threshold {
            return Err(GovernanceError::ProposerAboveThreshold(id));
        }
        if let Some(eta) = proposal.eta {
            timelock.cancel_batch(&self.identity, &proposal.actions, eta)?;
        }
        let record = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        record.canceled = true;
        tracing::info!(id, canceled_by = %caller, "proposal canceled");
        Ok(())
    }

    /// Derived lifecycle state of a proposal at `(tick, now)`.
    pub fn state(
        &self,
        id: ProposalId,
        tick: Tick,
        now: Timestamp,
        power: &dyn VotingPowerSource,
    ) -> Result<ProposalState, GovernanceError> {
        let proposal = self.get(id)?;
        Ok(self.state_of(proposal, tick, now, power))
    }

    fn state_of(
        &self,
        proposal: &Proposal,
        tick: Tick,
        now: Timestamp,
        power: &dyn VotingPowerSource,
    ) -> ProposalState {
        proposal.derive_state(
            tick,
            now,
            self.params.approval_window_ticks,
            GRACE_PERIOD_SECS,
            self.quorum_votes(power),
        )
    }

    fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::UnknownProposal(id))
    }

    // ── Administrator surface ────────────────────────────────────────────

    /// Update the delay between approval and voting. Administrator-only.
    pub fn set_voting_delay(
        &mut self,
        caller: &AccountAddress,
        ticks: u64,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin(caller)?;
        params::check_range(
            "voting_delay_ticks",
            ticks,
            MIN_VOTING_DELAY_TICKS,
            MAX_VOTING_DELAY_TICKS,
        )?;
        self.params.voting_delay_ticks = ticks;
        tracing::info!(ticks, "voting delay updated");
        Ok(())
    }

    /// Update the voting window length. Administrator-only.
    pub fn set_voting_period(
        &mut self,
        caller: &AccountAddress,
        ticks: u64,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin(caller)?;
        params::check_range(
            "voting_period_ticks",
            ticks,
            MIN_VOTING_PERIOD_TICKS,
            MAX_VOTING_PERIOD_TICKS,
        )?;
        self.params.voting_period_ticks = ticks;
        tracing::info!(ticks, "voting period updated");
        Ok(())
    }

    /// Update the quorum threshold. Administrator-only.
    pub fn set_quorum_bps(
        &mut self,
        caller: &AccountAddress,
        bps: u32,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin(caller)?;
        params::check_range("quorum_bps", u64::from(bps), 1, u64::from(MAX_BPS))?;
        self.params.quorum_bps = bps;
        tracing::info!(bps, "quorum threshold updated");
        Ok(())
    }

    /// Update the approval threshold. Administrator-only.
    pub fn set_approve_bps(
        &mut self,
        caller: &AccountAddress,
        bps: u32,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin(caller)?;
        params::check_range("approve_bps", u64::from(bps), 1, u64::from(MAX_BPS))?;
        self.params.approve_bps = bps;
        tracing::info!(bps, "approval threshold updated");
        Ok(())
    }

    /// Nominate a pending administrator. Administrator-only.
    pub fn set_pending_admin(
        &mut self,
        caller: &AccountAddress,
        next: AccountAddress,
    ) -> Result<(), GovernanceError> {
        self.admin.begin(caller, next.clone()).map_err(map_handover)?;
        tracing::info!(pending = %next, "pending administrator nominated");
        Ok(())
    }

    /// Claim the administrator role. Pending-administrator-only.
    pub fn accept_admin(&mut self, caller: &AccountAddress) -> Result<(), GovernanceError> {
        self.admin.accept(caller).map_err(map_handover)?;
        tracing::info!(admin = %caller, "administrator transferred");
        Ok(())
    }

    fn ensure_admin(&self, caller: &AccountAddress) -> Result<(), GovernanceError> {
        if self.admin.is_holder(caller) {
            Ok(())
        } else {
            Err(GovernanceError::NotAdmin(caller.clone()))
        }
    }

    // ── Guardian surface ─────────────────────────────────────────────────

    /// Permanently relinquish the guardian role. Guardian-only, one-way.
    pub fn abdicate(&mut self, caller: &AccountAddress) -> Result<(), GovernanceError> {
        self.ensure_guardian(caller)?;
        self.guardian = None;
        tracing::info!(guardian = %caller, "guardian role abdicated");
        Ok(())
    }

    /// Accept a pending handover of the timelock's administrator role to
    /// this engine. Guardian-only bootstrap step.
    pub fn accept_timelock_admin(
        &self,
        timelock: &mut TimelockQueue,
        caller: &AccountAddress,
    ) -> Result<(), GovernanceError> {
        self.ensure_guardian(caller)?;
        timelock.accept_admin(&self.identity)?;
        tracing::info!("timelock administrator role accepted");
        Ok(())
    }

    /// Schedule a handover of the timelock's administrator role without a
    /// proposal. Guardian-only escape hatch for a wedged governance.
    pub fn queue_timelock_handover(
        &self,
        timelock: &mut TimelockQueue,
        caller: &AccountAddress,
        new_pending: &AccountAddress,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.ensure_guardian(caller)?;
        let action = timelock.set_pending_admin_action(new_pending);
        timelock.schedule(&self.identity, &action, eta, now)?;
        tracing::info!(pending = %new_pending, %eta, "timelock handover scheduled");
        Ok(())
    }

    /// Execute a handover scheduled by [`Self::queue_timelock_handover`].
    pub fn execute_timelock_handover(
        &self,
        timelock: &mut TimelockQueue,
        caller: &AccountAddress,
        new_pending: &AccountAddress,
        eta: Timestamp,
        now: Timestamp,
        executor: &mut dyn CallExecutor,
    ) -> Result<(), GovernanceError> {
        self.ensure_guardian(caller)?;
        let action = timelock.set_pending_admin_action(new_pending);
        timelock.execute(&self.identity, &action, eta, now, executor)?;
        tracing::info!(pending = %new_pending, "timelock handover executed");
        Ok(())
    }

    fn ensure_guardian(&self, caller: &AccountAddress) -> Result<(), GovernanceError> {
        if self.guardian.as_ref() == Some(caller) {
            Ok(())
        } else {
            Err(GovernanceError::NotGuardian(caller.clone()))
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn identity(&self) -> &AccountAddress {
        &self.identity
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn admin(&self) -> &AccountAddress {
        self.admin.holder()
    }

    pub fn pending_admin(&self) -> Option<&AccountAddress> {
        self.admin.pending()
    }

    pub fn guardian(&self) -> Option<&AccountAddress> {
        self.guardian.as_ref()
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn receipt(&self, id: ProposalId, voter: &AccountAddress) -> Option<&VoteReceipt> {
        self.receipts.get(&(id, voter.clone()))
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    pub fn latest_proposal_id(&self, proposer: &AccountAddress) -> Option<ProposalId> {
        self.latest_proposal.get(proposer).copied()
    }
}

fn map_handover(err: HandoverError) -> GovernanceError {
    match err {
        HandoverError::NotHolder(who) => GovernanceError::NotAdmin(who),
        HandoverError::NotPending(who) => GovernanceError::NotPendingAdmin(who),
    }
}

/// Serialized form of the engine.
#[derive(Serialize, Deserialize)]
struct EngineSnapshot {
    identity: AccountAddress,
    params: GovernanceParams,
    admin: RoleHandover,
    guardian: Option<AccountAddress>,
    proposals: HashMap<ProposalId, Proposal>,
    proposal_count: u64,
    latest_proposal: HashMap<AccountAddress, ProposalId>,
    receipts: HashMap<(ProposalId, AccountAddress), VoteReceipt>,
}

impl GovernanceEngine {
    /// Serialize the full engine state to a byte blob.
    pub fn snapshot(&self) -> Result<Vec<u8>, GovernanceError> {
        let snapshot = EngineSnapshot {
            identity: self.identity.clone(),
            params: self.params.clone(),
            admin: self.admin.clone(),
            guardian: self.guardian.clone(),
            proposals: self.proposals.clone(),
            proposal_count: self.proposal_count,
            latest_proposal: self.latest_proposal.clone(),
            receipts: self.receipts.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Rebuild an engine from a blob produced by [`Self::snapshot`].
    pub fn restore(bytes: &[u8]) -> Result<Self, GovernanceError> {
        let snapshot: EngineSnapshot =
            bincode::deserialize(bytes).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        Ok(Self {
            identity: snapshot.identity,
            params: snapshot.params,
            admin: snapshot.admin,
            guardian: snapshot.guardian,
            proposals: snapshot.proposals,
            proposal_count: snapshot.proposal_count,
            latest_proposal: snapshot.latest_proposal,
            receipts: snapshot.receipts,
        })
    }
}
