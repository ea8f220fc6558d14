//! # Lockstep Shared
//! Everything both roles of a lockstep session agree on: the type registry,
//! the reference-deduplicating object codec, the batch and payload types and
//! the dispatch tables that executed payload items are delivered to.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use lockstep_serde::{
    ChunkType, RefIndex, Serde, SerdeErr, StreamReader, StreamWriter, UnsignedInteger24,
};

pub mod codec;
pub mod dispatch;
pub mod messages;

mod error;
mod error_buffer;
mod kind;
mod protocol;
mod registry;
mod sequence_list;
mod types;
mod value;

pub use error::LockstepError;
pub use error_buffer::ErrorBuffer;
pub use kind::Kind;
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use registry::{NetId, TypeRegistry};
pub use sequence_list::SequenceList;
pub use types::{PeerId, SequenceId, FIRST_SEQUENCE_ID, NO_OP_SEQUENCE_ID};
pub use value::{ObjectRef, Value, ValueMismatch};
