use thiserror::Error;

use agora_types::{AccountAddress, ErrorKind, Timestamp};

use crate::action::ActionKey;
use crate::executor::CallError;

#[derive(Debug, Error)]
pub enum TimelockError {
    #[error("caller {0} is not the timelock administrator")]
    NotAdmin(AccountAddress),

    #[error("caller {0} is not the pending administrator")]
    NotPendingAdmin(AccountAddress),

    #[error("delay {requested}s outside [{min}s, {max}s]")]
    DelayOutOfRange { requested: u64, min: u64, max: u64 },

    #[error("eta {eta} is before the earliest allowed execution time {earliest}")]
    EtaTooSoon { eta: Timestamp, earliest: Timestamp },

    #[error("action {0:?} is already scheduled")]
    AlreadyScheduled(ActionKey),

    #[error("action {0:?} is not scheduled")]
    NotScheduled(ActionKey),

    #[error("eta {eta} has not been reached at {now}")]
    TooEarly { eta: Timestamp, now: Timestamp },

    #[error("action went stale at {deadline}, now {now}")]
    Stale { deadline: Timestamp, now: Timestamp },

    #[error(transparent)]
    ExecutionFailed(#[from] CallError),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(String),
}

impl TimelockError {
    /// Position of this rejection in the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin(_) | Self::NotPendingAdmin(_) => ErrorKind::Authorization,
            Self::DelayOutOfRange { .. } => ErrorKind::Malformed,
            Self::EtaTooSoon { .. } | Self::TooEarly { .. } | Self::Stale { .. } => {
                ErrorKind::Timing
            }
            Self::AlreadyScheduled(_) => ErrorKind::Duplicate,
            Self::NotScheduled(_) => ErrorKind::Lifecycle,
            Self::ExecutionFailed(_) => ErrorKind::ExecutionFailure,
            Self::Snapshot(_) => ErrorKind::Internal,
        }
    }
}
