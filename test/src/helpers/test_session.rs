use std::{rc::Rc, time::Duration};

use lockstep_sequencer::{FatalError, Sequencer, SequencerConfig};
use lockstep_shared::PeerId;

use super::{Counter, Journal, Recorder};
use crate::{
    local_network::{LocalNetwork, LoopbackHub},
    test_protocol::protocol,
};

/// One device of a [`TestSession`] with its observers already attached
pub struct TestParticipant {
    pub sequencer: Sequencer,
    pub network: LocalNetwork,
    pub recorder: Rc<Recorder>,
    pub counter: Counter,
    pub journal: Journal,
}

impl TestParticipant {
    pub fn new(config: SequencerConfig, network: LocalNetwork) -> Self {
        let mut sequencer = Sequencer::new(config, protocol());
        let journal = Journal::default();
        let recorder = Rc::new(Recorder::new(journal.clone()));
        sequencer.add_observer(recorder.clone());
        let counter = Counter::default();
        counter.attach(&mut sequencer, &journal);

        Self {
            sequencer,
            network,
            recorder,
            counter,
            journal,
        }
    }

    pub fn peer(&self) -> PeerId {
        self.network.peer()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    pub fn flush(&mut self) -> Result<(), FatalError> {
        self.sequencer.flush(&mut self.network)
    }

    pub fn update(&mut self, elapsed: Duration) -> Result<(), FatalError> {
        self.sequencer.update(elapsed, &mut self.network)
    }
}

/// A host plus `n` participants connected through one [`LoopbackHub`]
pub struct TestSession {
    pub hub: LoopbackHub,
    pub host: TestParticipant,
    pub clients: Vec<TestParticipant>,
}

impl TestSession {
    pub fn new(clients: usize, config: SequencerConfig) -> Self {
        let hub = LoopbackHub::new();
        let host = TestParticipant::new(config.clone(), hub.host());
        let clients = (0..clients)
            .map(|_| TestParticipant::new(config.clone(), hub.join()))
            .collect();
        Self { hub, host, clients }
    }

    pub fn participants(&self) -> impl Iterator<Item = &TestParticipant> {
        std::iter::once(&self.host).chain(self.clients.iter())
    }

    pub fn participants_mut(&mut self) -> impl Iterator<Item = &mut TestParticipant> {
        std::iter::once(&mut self.host).chain(self.clients.iter_mut())
    }

    /// Clients send to the host, the host broadcasts, everyone executes
    pub fn round(&mut self) -> Result<(), FatalError> {
        self.flush_clients()?;
        self.deliver_to_host()?;
        self.host.flush()?;
        self.deliver_to_peers()
    }

    pub fn flush_clients(&mut self) -> Result<(), FatalError> {
        for client in self.clients.iter_mut() {
            client.flush()?;
        }
        Ok(())
    }

    pub fn deliver_to_host(&mut self) -> Result<(), FatalError> {
        for (_, bytes) in self.hub.take_for_host() {
            self.host.sequencer.receive_from_participant(&bytes)?;
        }
        Ok(())
    }

    pub fn deliver_to_peers(&mut self) -> Result<(), FatalError> {
        let hub = self.hub.clone();
        for participant in self.participants_mut() {
            for bytes in hub.take_for_peer(participant.peer()) {
                participant.sequencer.receive_from_host(&bytes)?;
            }
        }
        Ok(())
    }
}
