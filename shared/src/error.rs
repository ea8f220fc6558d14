use lockstep_serde::SerdeErr;
use thiserror::Error;

use crate::{dispatch::RpcError, SequenceId, ValueMismatch};

/// A recorded failure. Codec, dispatch and sequencing never unwind on bad
/// input; they push one of these into an [`ErrorBuffer`](crate::ErrorBuffer)
/// and carry on with whatever part of the work is still well defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockstepError {
    /// A type was registered twice; the first registration is kept
    #[error("Type {type_name} is already registered. The existing registration is kept")]
    DuplicateType { type_name: &'static str },

    /// Every 24 bit type id is taken
    #[error("Cannot register {type_name}: the type registry is full")]
    RegistryFull { type_name: &'static str },

    /// A value of an unregistered type was serialized as an unknown-type chunk
    #[error("Cannot serialize a value of unregistered type {type_name}. Register it with Protocol before use")]
    SerializeUnknownType { type_name: &'static str },

    /// The stream named a type id that the local registry does not know
    #[error("Cannot deserialize unknown type id {net_id:#08x}. Both sides must register the same types in the same order")]
    DeserializeUnknownType { net_id: u32 },

    /// A chunk started with a byte that is not a chunk tag
    #[error("Illegal chunk tag {tag} at offset {offset}")]
    IllegalChunkTag { tag: u8, offset: usize },

    /// An id-ref chunk pointed at an index that was never assigned
    #[error("Reference index {index} does not name an object read earlier in this stream")]
    UnknownReference { index: u16 },

    /// A session wrote more distinct objects than a reference index can name
    #[error("Too many objects in one serialization session; {type_name} cannot be referenced again")]
    ReferenceLimitExceeded { type_name: &'static str },

    /// The input ended early or declared impossible lengths
    #[error("Malformed stream: {source}")]
    MalformedStream { source: SerdeErr },

    /// A schema field received a value of the wrong type
    #[error("Field {type_name}.{field} rejected the decoded value: {source}")]
    FieldTypeMismatch {
        type_name: &'static str,
        field: &'static str,
        source: ValueMismatch,
    },

    /// The serializer registered for a type could not handle a value of it
    #[error("Serializer for {type_name} cannot encode the value: {source}")]
    SerializerMismatch {
        type_name: &'static str,
        source: ValueMismatch,
    },

    /// An object could not be borrowed while it was being encoded or filled
    #[error("Object of type {type_name} is already mutably borrowed")]
    ObjectBorrowed { type_name: &'static str },

    /// A message older than the next expected one arrived
    #[error("Received message {sequence_id} from the past, expected {expected}. The message is discarded")]
    SequenceFromPast {
        sequence_id: SequenceId,
        expected: SequenceId,
    },

    /// A buffered message became stale before it could run
    #[error("Discarded stale buffered message {sequence_id}, expected {expected}")]
    StaleBufferedMessage {
        sequence_id: SequenceId,
        expected: SequenceId,
    },

    /// A remote call named its target with a malformed identifier
    #[error("Malformed remote call identifier {identifier:?}. Expected \"<object>.<component>.<method>\"")]
    MalformedRpcIdentifier { identifier: String },

    /// A required value was null
    #[error("Null argument passed to {operation}")]
    NullArgument { operation: &'static str },

    /// Resolving or running a remote call failed
    #[error("Remote call to {target} failed: {source}")]
    RemoteCallFailed { target: String, source: RpcError },

    /// A received batch did not decode to a lockstep message
    #[error("Expected a lockstep message but decoded {type_name}")]
    UnexpectedPayload { type_name: &'static str },

    /// The transport refused outgoing bytes
    #[error("Failed to send to {destination}: {reason}")]
    SendFailed { destination: String, reason: String },
}
