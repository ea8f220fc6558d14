/// Position of a lockstep batch in the host's canonical order
pub type SequenceId = i32;

/// Sequence id carried by batches that hold no data (or that come from a
/// participant, which never assigns ids). Never executed on receipt.
pub const NO_OP_SEQUENCE_ID: SequenceId = SequenceId::MIN;

/// First id the host hands out and every receiver expects
pub const FIRST_SEQUENCE_ID: SequenceId = NO_OP_SEQUENCE_ID + 1;

/// Identifies one connection as seen by the local transport
pub type PeerId = u32;

