//! Poll outcome types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcome of a single polling run
///
/// `Ok(value)` means the probe produced a value before the deadline.
pub type PollResult<T> = std::result::Result<T, PollerError>;

/// Reasons a polling run ended without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PollerError {
    /// `stop_polling` was called before a value or the deadline
    #[error("polling was stopped")]
    Stopped,

    /// The deadline elapsed before the probe produced a value
    #[error("polling timed out")]
    TimedOut,

    /// Terminal state not otherwise classified
    #[error("polling outcome undetermined")]
    Undetermined,

    /// Another polling loop already owns this poller
    #[error("poller is already polling")]
    AlreadyPolling,
}

impl PollerError {
    /// Short lowercase tag, used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::TimedOut => "timed_out",
            Self::Undetermined => "undetermined",
            Self::AlreadyPolling => "already_polling",
        }
    }

    /// Whether this outcome came from an explicit cancellation
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether this outcome came from the deadline expiring
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}
