use thiserror::Error;

use lockstep_shared::LockstepError;

/// Raised by a [`Network`](crate::Network) that could not accept outgoing bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TransportError {
    pub reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A recorded error escalated by [`ErrorPolicy::Fatal`](crate::ErrorPolicy::Fatal).
/// The sequencer should not be driven any further after this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Fatal lockstep error: {error}")]
pub struct FatalError {
    #[source]
    pub error: LockstepError,
}
