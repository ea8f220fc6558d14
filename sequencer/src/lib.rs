//! # Lockstep Sequencer
//! Drives a deterministic lockstep session: items queued on any participant
//! are gathered by the host once per tick, stamped with a sequence id and
//! executed by every participant in exactly that order.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use lockstep_shared::{
        codec, dispatch, messages, ErrorBuffer, Kind, LockstepError, ObjectRef, PeerId, Protocol,
        ProtocolPlugin, SequenceId, Value, FIRST_SEQUENCE_ID, NO_OP_SEQUENCE_ID,
    };
}

mod config;
mod error;
mod network;
mod sequencer;

pub use config::{ErrorPolicy, SequencerConfig};
pub use error::{FatalError, TransportError};
pub use network::{Network, OfflineNetwork};
pub use sequencer::Sequencer;
