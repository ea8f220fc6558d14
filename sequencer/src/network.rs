use std::time::Duration;

use lockstep_shared::PeerId;

use crate::TransportError;

/// The transport and session layer the sequencer runs on top of.
///
/// Incoming bytes are not pulled through this trait; the owner hands them to
/// [`Sequencer::receive_from_host`](crate::Sequencer::receive_from_host) or
/// [`Sequencer::receive_from_participant`](crate::Sequencer::receive_from_participant)
/// on the same thread that drives the tick loop.
pub trait Network {
    /// Currently connected peers. On the host this includes its own loopback
    /// connection. Empty when playing on a single device.
    fn peers(&self) -> Vec<PeerId>;

    /// Whether this device is the authority that orders batches
    fn is_host(&self) -> bool;

    /// Whether `peer` is the host's connection to itself
    fn is_loopback(&self, _peer: PeerId) -> bool {
        false
    }

    fn send_to_peer(&mut self, peer: PeerId, bytes: &[u8]) -> Result<(), TransportError>;

    fn send_to_host(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Current round trip estimate for `peer`, if the transport measures one
    fn rtt(&self, _peer: PeerId) -> Option<Duration> {
        None
    }

    /// Tick interval the host last assigned to this device
    fn adjusted_interval(&self) -> Option<Duration> {
        None
    }

    /// Hands `peer` a new tick interval. Only called on the host.
    fn set_adjusted_interval(&mut self, _peer: PeerId, _interval: Duration) {}
}

/// A single device with no connections; it is always the host and executes
/// its own batches directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineNetwork;

impl Network for OfflineNetwork {
    fn peers(&self) -> Vec<PeerId> {
        Vec::new()
    }

    fn is_host(&self) -> bool {
        true
    }

    fn send_to_peer(&mut self, peer: PeerId, _bytes: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::new(format!(
            "offline, no connection to peer {}",
            peer
        )))
    }

    fn send_to_host(&mut self, _bytes: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::new("offline, no connection to a host"))
    }
}
