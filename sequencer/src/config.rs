use std::default::Default;

/// What the sequencer does with errors recorded during an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Drop them silently
    Ignore,
    /// Drain them into `warn!`
    Log,
    /// Return the first one as a [`FatalError`](crate::FatalError)
    Fatal,
    /// Leave them in the buffer for the caller to drain
    Retain,
}

/// Contains Config properties which will be used by the Sequencer
#[derive(Clone, Debug)]
pub struct SequencerConfig {
    /// On the host, move every peer's tick interval halfway towards the
    /// average round trip time after each tick
    pub adaptive_interval: bool,
    /// Reaction to errors recorded by each public operation
    pub error_policy: ErrorPolicy,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            adaptive_interval: false,
            error_policy: ErrorPolicy::Log,
        }
    }
}
