//! The time-locked execution queue.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use agora_types::{AccountAddress, HandoverError, RoleHandover, Timestamp};

use crate::action::{Action, ActionKey};
use crate::error::TimelockError;
use crate::executor::{CallError, CallExecutor};

/// Seconds past the eta during which a scheduled action remains executable.
pub const GRACE_PERIOD_SECS: u64 = 14 * 24 * 60 * 60;
/// Smallest configurable scheduling delay.
pub const MINIMUM_DELAY_SECS: u64 = 24 * 60 * 60;
/// Largest configurable scheduling delay.
pub const MAXIMUM_DELAY_SECS: u64 = 30 * 24 * 60 * 60;

/// Selector recognized on actions targeting the queue itself: change the delay.
pub const SELECTOR_SET_DELAY: &str = "set_delay";
/// Selector recognized on actions targeting the queue itself: nominate a
/// pending administrator.
pub const SELECTOR_SET_PENDING_ADMIN: &str = "set_pending_admin";

/// The execution queue.
///
/// Scheduling, cancellation and execution are administrator-only; the
/// administrator is the governance engine once bootstrapped, so every path
/// into the queue runs through a passed proposal (or the guardian escape
/// hatches the engine exposes). The queue holds no clock: callers supply
/// `now`, and the queue only compares it against etas.
#[derive(Debug)]
pub struct TimelockQueue {
    identity: AccountAddress,
    admin: RoleHandover,
    delay_secs: u64,
    queued: HashSet<ActionKey>,
}

impl TimelockQueue {
    /// Create a queue with its own identity, an initial administrator, and a
    /// scheduling delay within the allowed bounds.
    pub fn new(
        identity: AccountAddress,
        admin: AccountAddress,
        delay_secs: u64,
    ) -> Result<Self, TimelockError> {
        Self::check_delay(delay_secs)?;
        Ok(Self {
            identity,
            admin: RoleHandover::new(admin),
            delay_secs,
            queued: HashSet::new(),
        })
    }

    fn check_delay(delay_secs: u64) -> Result<(), TimelockError> {
        if !(MINIMUM_DELAY_SECS..=MAXIMUM_DELAY_SECS).contains(&delay_secs) {
            return Err(TimelockError::DelayOutOfRange {
                requested: delay_secs,
                min: MINIMUM_DELAY_SECS,
                max: MAXIMUM_DELAY_SECS,
            });
        }
        Ok(())
    }

    fn ensure_admin(&self, caller: &AccountAddress) -> Result<(), TimelockError> {
        if self.admin.is_holder(caller) {
            Ok(())
        } else {
            Err(TimelockError::NotAdmin(caller.clone()))
        }
    }

    // ── Scheduling ───────────────────────────────────────────────────────

    /// Schedule one action for execution at `eta`.
    pub fn schedule(
        &mut self,
        caller: &AccountAddress,
        action: &Action,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<ActionKey, TimelockError> {
        self.ensure_admin(caller)?;
        self.check_eta(eta, now)?;
        let key = action.key(eta);
        if self.queued.contains(&key) {
            return Err(TimelockError::AlreadyScheduled(key));
        }
        self.queued.insert(key);
        tracing::info!(%action.target, %action.selector, %eta, "action scheduled");
        Ok(key)
    }

    /// Schedule a group of actions under one eta, all or nothing.
    ///
    /// Every key is checked (against the queue and against the rest of the
    /// batch) before any is inserted, so a duplicate anywhere leaves the
    /// queue untouched.
    pub fn schedule_batch(
        &mut self,
        caller: &AccountAddress,
        actions: &[Action],
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<Vec<ActionKey>, TimelockError> {
        self.ensure_admin(caller)?;
        self.check_eta(eta, now)?;
        let mut keys = Vec::with_capacity(actions.len());
        for action in actions {
            let key = action.key(eta);
            if self.queued.contains(&key) || keys.contains(&key) {
                return Err(TimelockError::AlreadyScheduled(key));
            }
            keys.push(key);
        }
        self.queued.extend(keys.iter().copied());
        tracing::info!(count = actions.len(), %eta, "action batch scheduled");
        Ok(keys)
    }

    fn check_eta(&self, eta: Timestamp, now: Timestamp) -> Result<(), TimelockError> {
        let earliest = now.plus_secs(self.delay_secs);
        if eta < earliest {
            return Err(TimelockError::EtaTooSoon { eta, earliest });
        }
        Ok(())
    }

    // ── Cancellation ─────────────────────────────────────────────────────

    /// Clear one scheduled action. Idempotent if the key is absent.
    pub fn cancel(
        &mut self,
        caller: &AccountAddress,
        action: &Action,
        eta: Timestamp,
    ) -> Result<(), TimelockError> {
        self.ensure_admin(caller)?;
        let key = action.key(eta);
        if self.queued.remove(&key) {
            tracing::info!(%action.target, %action.selector, %eta, "action canceled");
        }
        Ok(())
    }

    /// Clear a group of scheduled actions sharing one eta. Absent keys are
    /// skipped.
    pub fn cancel_batch(
        &mut self,
        caller: &AccountAddress,
        actions: &[Action],
        eta: Timestamp,
    ) -> Result<(), TimelockError> {
        self.ensure_admin(caller)?;
        let mut cleared = 0usize;
        for action in actions {
            if self.queued.remove(&action.key(eta)) {
                cleared += 1;
            }
        }
        if cleared > 0 {
            tracing::info!(cleared, %eta, "action batch canceled");
        }
        Ok(())
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Execute one scheduled action.
    ///
    /// The key is cleared only when the call succeeds; a failing call leaves
    /// the action scheduled so the request can be retried.
    pub fn execute(
        &mut self,
        caller: &AccountAddress,
        action: &Action,
        eta: Timestamp,
        now: Timestamp,
        executor: &mut dyn CallExecutor,
    ) -> Result<(), TimelockError> {
        self.ensure_admin(caller)?;
        let key = action.key(eta);
        self.ensure_executable(key, eta, now)?;
        if let Err(err) = self.dispatch(action, executor) {
            tracing::warn!(%action.target, %action.selector, %err, "action execution failed");
            return Err(err);
        }
        self.queued.remove(&key);
        tracing::info!(%action.target, %action.selector, "action executed");
        Ok(())
    }

    /// Execute a group of scheduled actions sharing one eta, in order, all or
    /// nothing from the queue's point of view.
    ///
    /// Every action's window is validated first; keys are cleared only after
    /// the last call succeeds. A failure at any position leaves every key
    /// scheduled.
    pub fn execute_batch(
        &mut self,
        caller: &AccountAddress,
        actions: &[Action],
        eta: Timestamp,
        now: Timestamp,
        executor: &mut dyn CallExecutor,
    ) -> Result<(), TimelockError> {
        self.ensure_admin(caller)?;
        let keys: Vec<ActionKey> = actions.iter().map(|a| a.key(eta)).collect();
        for key in &keys {
            self.ensure_executable(*key, eta, now)?;
        }
        for action in actions {
            if let Err(err) = self.dispatch(action, executor) {
                tracing::warn!(%action.target, %action.selector, %err, "batch execution aborted");
                return Err(err);
            }
        }
        for key in &keys {
            self.queued.remove(key);
        }
        tracing::info!(count = actions.len(), "action batch executed");
        Ok(())
    }

    fn ensure_executable(
        &self,
        key: ActionKey,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<(), TimelockError> {
        if !self.queued.contains(&key) {
            return Err(TimelockError::NotScheduled(key));
        }
        if now < eta {
            return Err(TimelockError::TooEarly { eta, now });
        }
        let deadline = eta.plus_secs(GRACE_PERIOD_SECS);
        if now > deadline {
            return Err(TimelockError::Stale { deadline, now });
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        action: &Action,
        executor: &mut dyn CallExecutor,
    ) -> Result<(), TimelockError> {
        if action.target == self.identity {
            self.apply_self_call(action)?;
        } else {
            executor.call(action)?;
        }
        Ok(())
    }

    /// Actions targeting the queue itself reconfigure it with administrative
    /// authority; any failure is reported as a failed call, exactly like an
    /// external target rejecting the action.
    fn apply_self_call(&mut self, action: &Action) -> Result<(), CallError> {
        let fail = |reason: String| CallError {
            target: action.target.clone(),
            reason,
        };
        match action.selector.as_str() {
            SELECTOR_SET_DELAY => {
                let delay: u64 = bincode::deserialize(&action.payload)
                    .map_err(|e| fail(format!("bad {SELECTOR_SET_DELAY} payload: {e}")))?;
                Self::check_delay(delay).map_err(|e| fail(e.to_string()))?;
                self.delay_secs = delay;
                tracing::info!(delay_secs = delay, "delay updated via self-call");
                Ok(())
            }
            SELECTOR_SET_PENDING_ADMIN => {
                let next: AccountAddress = bincode::deserialize(&action.payload)
                    .map_err(|e| fail(format!("bad {SELECTOR_SET_PENDING_ADMIN} payload: {e}")))?;
                let holder = self.admin.holder().clone();
                self.admin
                    .begin(&holder, next.clone())
                    .map_err(|e| fail(e.to_string()))?;
                tracing::info!(pending = %next, "pending administrator nominated via self-call");
                Ok(())
            }
            other => Err(fail(format!("unknown self-call selector {other:?}"))),
        }
    }

    /// Action that changes this queue's delay when executed through the queue.
    pub fn set_delay_action(&self, delay_secs: u64) -> Action {
        let payload = bincode::serialize(&delay_secs).unwrap_or_default();
        Action::new(self.identity.clone(), 0, SELECTOR_SET_DELAY, payload)
    }

    /// Action that nominates a pending administrator when executed through
    /// the queue.
    pub fn set_pending_admin_action(&self, next: &AccountAddress) -> Action {
        let payload = bincode::serialize(next).unwrap_or_default();
        Action::new(self.identity.clone(), 0, SELECTOR_SET_PENDING_ADMIN, payload)
    }

    // ── Administrator handover ───────────────────────────────────────────

    /// Nominate a pending administrator. Administrator-only.
    pub fn set_pending_admin(
        &mut self,
        caller: &AccountAddress,
        next: AccountAddress,
    ) -> Result<(), TimelockError> {
        self.admin.begin(caller, next.clone()).map_err(map_handover)?;
        tracing::info!(pending = %next, "pending administrator nominated");
        Ok(())
    }

    /// Promote the pending administrator. Callable only by the pending
    /// identity itself.
    pub fn accept_admin(&mut self, caller: &AccountAddress) -> Result<(), TimelockError> {
        self.admin.accept(caller).map_err(map_handover)?;
        tracing::info!(admin = %caller, "administrator transferred");
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn identity(&self) -> &AccountAddress {
        &self.identity
    }

    pub fn admin(&self) -> &AccountAddress {
        self.admin.holder()
    }

    pub fn pending_admin(&self) -> Option<&AccountAddress> {
        self.admin.pending()
    }

    pub fn delay_secs(&self) -> u64 {
        self.delay_secs
    }

    pub fn is_scheduled(&self, key: &ActionKey) -> bool {
        self.queued.contains(key)
    }

    pub fn scheduled_len(&self) -> usize {
        self.queued.len()
    }
}

fn map_handover(err: HandoverError) -> TimelockError {
    match err {
        HandoverError::NotHolder(who) => TimelockError::NotAdmin(who),
        HandoverError::NotPending(who) => TimelockError::NotPendingAdmin(who),
    }
}

/// Serializable image of the queue state.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct QueueSnapshot {
    identity: AccountAddress,
    admin: RoleHandover,
    delay_secs: u64,
    queued: HashSet<ActionKey>,
}

impl TimelockQueue {
    /// Serialize the full queue state to bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>, TimelockError> {
        let snapshot = QueueSnapshot {
            identity: self.identity.clone(),
            admin: self.admin.clone(),
            delay_secs: self.delay_secs,
            queued: self.queued.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| TimelockError::Snapshot(e.to_string()))
    }

    /// Restore a queue from serialized bytes.
    ///
    /// Corrupt bytes are an error, not an empty queue; silently dropping
    /// scheduled actions would be indistinguishable from mass cancellation.
    pub fn restore(bytes: &[u8]) -> Result<Self, TimelockError> {
        let snapshot: QueueSnapshot =
            bincode::deserialize(bytes).map_err(|e| TimelockError::Snapshot(e.to_string()))?;
        Ok(Self {
            identity: snapshot.identity,
            admin: snapshot.admin,
            delay_secs: snapshot.delay_secs,
            queued: snapshot.queued,
        })
    }
}
