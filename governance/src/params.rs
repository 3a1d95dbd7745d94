//! Governance configuration and its bounds.

use serde::{Deserialize, Serialize};

use agora_types::MAX_BPS;

use crate::error::GovernanceError;

/// Most actions a single proposal may bundle.
pub const MAX_PROPOSAL_ACTIONS: usize = 10;

/// Bounds for the administrator-settable window parameters, in ticks.
pub const MIN_VOTING_DELAY_TICKS: u64 = 1;
pub const MAX_VOTING_DELAY_TICKS: u64 = 40_320;
pub const MIN_VOTING_PERIOD_TICKS: u64 = 5_760;
pub const MAX_VOTING_PERIOD_TICKS: u64 = 80_640;

/// Tunable parameters of the proposal lifecycle.
///
/// Window lengths are measured in ticks, thresholds in basis points of the
/// total supply reported by the voting power source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Ticks between approval and the voting window opening.
    pub voting_delay_ticks: u64,
    /// Length of the voting window in ticks.
    pub voting_period_ticks: u64,
    /// Ticks after creation during which a proposal may still be approved.
    pub approval_window_ticks: u64,
    /// Share of total supply the winning tally must reach.
    pub quorum_bps: u32,
    /// Weight an approver must exceed to second a proposal.
    pub approve_bps: u32,
    /// Weight a proposer must exceed to open a proposal.
    pub create_bps: u32,
}

impl GovernanceParams {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        check_range(
            "voting_delay_ticks",
            self.voting_delay_ticks,
            MIN_VOTING_DELAY_TICKS,
            MAX_VOTING_DELAY_TICKS,
        )?;
        check_range(
            "voting_period_ticks",
            self.voting_period_ticks,
            MIN_VOTING_PERIOD_TICKS,
            MAX_VOTING_PERIOD_TICKS,
        )?;
        check_range("approval_window_ticks", self.approval_window_ticks, 1, u64::MAX)?;
        check_range("quorum_bps", u64::from(self.quorum_bps), 1, u64::from(MAX_BPS))?;
        check_range("approve_bps", u64::from(self.approve_bps), 1, u64::from(MAX_BPS))?;
        check_range("create_bps", u64::from(self.create_bps), 1, u64::from(MAX_BPS))?;
        Ok(())
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            voting_delay_ticks: 1,
            voting_period_ticks: 17_280, // ~3 days of 15s ticks
            approval_window_ticks: 5_760, // ~1 day of 15s ticks
            quorum_bps: 400,  // 4% of total supply
            approve_bps: 100, // 1%
            create_bps: 100,  // 1%
        }
    }
}

pub(crate) fn check_range(
    name: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), GovernanceError> {
    if value < min || value > max {
        return Err(GovernanceError::ParamOutOfRange { name, value, min, max });
    }
    Ok(())
}
