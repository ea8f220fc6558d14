use thiserror::Error;

/// Raised by the `try_` builder methods of [`Protocol`](crate::Protocol)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The type catalog was frozen by `lock()`
    #[error("Protocol is already locked and cannot be modified. No further types may be registered after Protocol.lock()")]
    AlreadyLocked,
}
