//! Time-locked execution queue.
//!
//! Administrative actions are scheduled with an execution-not-before timestamp
//! (the eta), deduplicated by a deterministic key, and may only run inside the
//! window between the eta and the end of the grace period. The queue's own
//! administrator role moves through a two-step handover, and the queue's own
//! configuration is changed by actions that target the queue itself.

pub mod action;
pub mod error;
pub mod executor;
pub mod queue;

pub use action::{Action, ActionKey};
pub use error::TimelockError;
pub use executor::{CallError, CallExecutor};
pub use queue::{
    TimelockQueue, GRACE_PERIOD_SECS, MAXIMUM_DELAY_SECS, MINIMUM_DELAY_SECS,
    SELECTOR_SET_DELAY, SELECTOR_SET_PENDING_ADMIN,
};
