//! Nullable call executor — record executed actions without a resource.

use std::collections::HashSet;

use agora_timelock::{Action, CallError, CallExecutor};
use agora_types::AccountAddress;

/// An executor that records every call instead of dispatching it.
///
/// Targets can be marked as failing to exercise the all-or-nothing
/// execution path. Recorded calls keep their order, so a test can replay
/// them against the real recipient afterwards.
pub struct NullExecutor {
    calls: Vec<Action>,
    failing: HashSet<AccountAddress>,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            failing: HashSet::new(),
        }
    }

    /// Make every call to `target` fail until [`Self::repair`] is called.
    pub fn break_target(&mut self, target: AccountAddress) {
        self.failing.insert(target);
    }

    /// Clear a previously broken target.
    pub fn repair(&mut self, target: &AccountAddress) {
        self.failing.remove(target);
    }

    /// All successfully recorded calls, in execution order.
    pub fn calls(&self) -> &[Action] {
        &self.calls
    }

    /// Drop the recorded calls.
    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl Default for NullExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CallExecutor for NullExecutor {
    fn call(&mut self, action: &Action) -> Result<(), CallError> {
        if self.failing.contains(&action.target) {
            return Err(CallError {
                target: action.target.clone(),
                reason: "target marked as failing".to_string(),
            });
        }
        self.calls.push(action.clone());
        Ok(())
    }
}
