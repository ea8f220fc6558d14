use thiserror::Error;

use crate::ValueMismatch;

/// Errors raised while registering or invoking a remote procedure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Identifier does not split into exactly three non-empty dot-separated names
    #[error("Malformed remote procedure identifier {identifier:?}. Expected \"<object>.<component>.<method>\"")]
    MalformedIdentifier { identifier: String },

    /// A procedure is already registered under this identifier
    #[error("A remote procedure is already registered as {identifier}")]
    DuplicateProcedure { identifier: String },

    /// No procedure is registered under this identifier
    #[error("No remote procedure is registered as {identifier}. Register it on every participant before the session starts")]
    UnknownTarget { identifier: String },

    /// The call carried the wrong number of arguments
    #[error("Remote procedure expected {expected} arguments but received {found}")]
    ArgumentCount { expected: usize, found: usize },

    /// An argument could not be converted to the parameter type
    #[error("Remote procedure argument {index} has the wrong type: {source}")]
    ArgumentType { index: usize, source: ValueMismatch },

    /// The procedure ran and reported a failure of its own
    #[error("Remote procedure failed: {reason}")]
    Invocation { reason: String },
}
