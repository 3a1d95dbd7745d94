//! Nullable voting power — a checkpoint-log weight source for testing.

use std::collections::HashMap;

use agora_governance::VotingPowerSource;
use agora_types::{AccountAddress, Tick, VoteWeight};

/// An in-memory checkpoint log implementing [`VotingPowerSource`].
///
/// Each account holds an ordered list of `(tick, weight)` checkpoints;
/// `prior_votes` binary-searches for the latest checkpoint at or before the
/// queried tick. This is the reference shape of the contract the trait
/// documents, driven programmatically instead of by a ledger.
pub struct NullPowerSource {
    checkpoints: HashMap<AccountAddress, Vec<(Tick, VoteWeight)>>,
    total: VoteWeight,
}

impl NullPowerSource {
    pub fn new(total: VoteWeight) -> Self {
        Self {
            checkpoints: HashMap::new(),
            total,
        }
    }

    /// Record `account` holding `weight` as of the end of `tick`.
    ///
    /// Recording at an existing tick replaces that checkpoint; the log
    /// stays sorted regardless of write order.
    pub fn record(&mut self, account: &AccountAddress, tick: Tick, weight: VoteWeight) {
        let log = self.checkpoints.entry(account.clone()).or_default();
        match log.binary_search_by_key(&tick, |(t, _)| *t) {
            Ok(idx) => log[idx].1 = weight,
            Err(idx) => log.insert(idx, (tick, weight)),
        }
    }

    pub fn set_total_supply(&mut self, total: VoteWeight) {
        self.total = total;
    }
}

impl VotingPowerSource for NullPowerSource {
    fn prior_votes(&self, account: &AccountAddress, tick: Tick) -> VoteWeight {
        self.checkpoints
            .get(account)
            .map(|log| {
                let idx = log.partition_point(|(t, _)| *t <= tick);
                if idx == 0 {
                    VoteWeight::ZERO
                } else {
                    log[idx - 1].1
                }
            })
            .unwrap_or(VoteWeight::ZERO)
    }

    fn current_votes(&self, account: &AccountAddress) -> VoteWeight {
        self.checkpoints
            .get(account)
            .and_then(|log| log.last())
            .map(|(_, weight)| *weight)
            .unwrap_or(VoteWeight::ZERO)
    }

    fn total_supply(&self) -> VoteWeight {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(name: &str) -> AccountAddress {
        AccountAddress::new(format!("agr_{name}"))
    }

    #[test]
    fn test_prior_votes_picks_latest_at_or_before() {
        let mut power = NullPowerSource::new(VoteWeight::new(1_000));
        power.record(&addr("alice"), Tick::new(5), VoteWeight::new(100));
        power.record(&addr("alice"), Tick::new(10), VoteWeight::new(250));

        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(4)), VoteWeight::ZERO);
        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(5)), VoteWeight::new(100));
        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(7)), VoteWeight::new(100));
        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(10)), VoteWeight::new(250));
        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(99)), VoteWeight::new(250));
    }

    #[test]
    fn test_unknown_account_is_zero() {
        let power = NullPowerSource::new(VoteWeight::new(1_000));
        assert_eq!(power.prior_votes(&addr("ghost"), Tick::new(5)), VoteWeight::ZERO);
        assert_eq!(power.current_votes(&addr("ghost")), VoteWeight::ZERO);
    }

    #[test]
    fn test_record_at_same_tick_replaces() {
        let mut power = NullPowerSource::new(VoteWeight::new(1_000));
        power.record(&addr("alice"), Tick::new(5), VoteWeight::new(100));
        power.record(&addr("alice"), Tick::new(5), VoteWeight::new(40));
        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(5)), VoteWeight::new(40));
    }

    #[test]
    fn test_out_of_order_records_stay_sorted() {
        let mut power = NullPowerSource::new(VoteWeight::new(1_000));
        power.record(&addr("alice"), Tick::new(10), VoteWeight::new(250));
        power.record(&addr("alice"), Tick::new(5), VoteWeight::new(100));
        assert_eq!(power.prior_votes(&addr("alice"), Tick::new(7)), VoteWeight::new(100));
        assert_eq!(power.current_votes(&addr("alice")), VoteWeight::new(250));
    }

    #[test]
    fn test_total_supply_is_settable() {
        let mut power = NullPowerSource::new(VoteWeight::new(1_000));
        assert_eq!(power.total_supply(), VoteWeight::new(1_000));
        power.set_total_supply(VoteWeight::new(2_000));
        assert_eq!(power.total_supply(), VoteWeight::new(2_000));
    }
}
