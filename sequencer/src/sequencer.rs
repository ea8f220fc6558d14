use std::{rc::Rc, time::Duration};

use log::{debug, trace, warn};

use lockstep_shared::{
    dispatch::{
        Dispatcher, EventDispatcher, RawDataObserver, RemoteProcedures, RpcError, RpcTarget,
    },
    messages::{DomainEvent, LockStepMessage, NetworkData, RawData, RemoteCall},
    ErrorBuffer, LockstepError, Protocol, SequenceId, SequenceList, TypeRegistry, Value,
    FIRST_SEQUENCE_ID,
};

use crate::{ErrorPolicy, FatalError, Network, SequencerConfig};

/// Collects locally originated items each tick, agrees on one order for them
/// through the host and executes every batch exactly once, in sequence.
///
/// The host stamps each non-empty batch with the next sequence id and sends it
/// to every peer, itself included. Participants forward their items to the
/// host and only execute what comes back. With no peers at all the device is
/// its own host and executes batches directly.
pub struct Sequencer {
    registry: TypeRegistry,
    tick_interval: Duration,
    config: SequencerConfig,
    dispatcher: Dispatcher,
    errors: ErrorBuffer,
    // Items originated here since the last flush
    outgoing: Vec<NetworkData>,
    // Host only: items received from participants since the last flush
    pending: Vec<NetworkData>,
    // Batches that arrived ahead of `expected_next`
    reorder_buffer: SequenceList<LockStepMessage>,
    next_to_send: SequenceId,
    expected_next: SequenceId,
    accumulated: Duration,
}

impl Sequencer {
    /// Create a new Sequencer. Registration errors collected by the protocol
    /// are carried over into the error buffer.
    pub fn new<P: Into<Protocol>>(config: SequencerConfig, protocol: P) -> Self {
        let protocol: Protocol = protocol.into();
        let (registry, tick_interval, errors) = protocol.into_parts();

        Self {
            registry,
            tick_interval,
            config,
            dispatcher: Dispatcher::new(),
            errors,
            outgoing: Vec::new(),
            pending: Vec::new(),
            reorder_buffer: SequenceList::new(),
            next_to_send: FIRST_SEQUENCE_ID,
            expected_next: FIRST_SEQUENCE_ID,
            accumulated: Duration::ZERO,
        }
    }

    // Dispatch

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn add_observer(&mut self, observer: Rc<dyn RawDataObserver>) {
        self.dispatcher.add_observer(observer);
    }

    pub fn remove_observer(&mut self, observer: &Rc<dyn RawDataObserver>) -> bool {
        self.dispatcher.remove_observer(observer)
    }

    pub fn procedures_mut(&mut self) -> &mut RemoteProcedures {
        self.dispatcher.procedures_mut()
    }

    pub fn set_event_dispatcher<D: EventDispatcher + 'static>(&mut self, events: D) {
        self.dispatcher.set_event_dispatcher(events);
    }

    // Outgoing

    /// Queues values for every raw data observer on every participant
    pub fn send_raw(&mut self, values: Vec<Value>) -> Result<(), FatalError> {
        debug!("send_raw values={:?}", values);
        self.outgoing.push(RawData::new(values).into());
        self.react_to_errors()
    }

    /// Queues a call of `<object>.<component>.<method>` on every participant.
    /// Malformed or locally unregistered targets are recorded and dropped.
    pub fn call_remote(&mut self, identifier: &str, args: Vec<Value>) -> Result<(), FatalError> {
        debug!("call_remote identifier={} args={:?}", identifier, args);
        match RpcTarget::parse(identifier) {
            Ok(target) => self.enqueue_call(target, args),
            Err(_) => self.errors.push(LockstepError::MalformedRpcIdentifier {
                identifier: identifier.to_string(),
            }),
        }
        self.react_to_errors()
    }

    pub fn call_remote_target(
        &mut self,
        target: RpcTarget,
        args: Vec<Value>,
    ) -> Result<(), FatalError> {
        debug!("call_remote target={} args={:?}", target, args);
        self.enqueue_call(target, args);
        self.react_to_errors()
    }

    /// Queues a domain event for the event dispatcher on every participant
    pub fn trigger_event(&mut self, event: Value) -> Result<(), FatalError> {
        self.enqueue_event(event);
        self.react_to_errors()
    }

    pub fn trigger_events<I: IntoIterator<Item = Value>>(
        &mut self,
        events: I,
    ) -> Result<(), FatalError> {
        for event in events {
            self.enqueue_event(event);
        }
        self.react_to_errors()
    }

    // Tick loop

    /// Advances the tick clock by `elapsed`. Once a full interval has built up
    /// the outgoing batch is flushed; time beyond the interval carries over.
    pub fn update(&mut self, elapsed: Duration, network: &mut dyn Network) -> Result<(), FatalError> {
        self.accumulated += elapsed;
        let interval = self.current_interval(network);
        if self.accumulated >= interval {
            self.accumulated = remainder(self.accumulated, interval);
            self.send_lock_step(network);
            self.adapt_interval(network);
        }
        self.react_to_errors()
    }

    /// Sends the outgoing batch now, regardless of the tick clock
    pub fn flush(&mut self, network: &mut dyn Network) -> Result<(), FatalError> {
        self.send_lock_step(network);
        self.react_to_errors()
    }

    // Incoming

    /// Handles a batch broadcast by the host. The host calls this for its own
    /// loopback copy too.
    pub fn receive_from_host(&mut self, bytes: &[u8]) -> Result<(), FatalError> {
        trace!("receive_from_host bytes={}", bytes.len());
        if let Some(message) = LockStepMessage::decode(&self.registry, &mut self.errors, bytes) {
            self.process(message);
        }
        self.react_to_errors()
    }

    /// Host side: holds a participant's items for the next broadcast
    pub fn receive_from_participant(&mut self, bytes: &[u8]) -> Result<(), FatalError> {
        trace!("receive_from_participant bytes={}", bytes.len());
        if let Some(mut message) = LockStepMessage::decode(&self.registry, &mut self.errors, bytes)
        {
            debug!("holding {} items from participant", message.payload.len());
            self.pending.append(&mut message.payload);
        }
        self.react_to_errors()
    }

    /// Runs the ordering protocol on an already decoded batch
    pub fn process_message(&mut self, message: LockStepMessage) -> Result<(), FatalError> {
        self.process(message);
        self.react_to_errors()
    }

    // Inspection

    pub fn is_authority(&self, network: &dyn Network) -> bool {
        network.peers().is_empty() || network.is_host()
    }

    /// The interval the tick clock currently runs at
    pub fn current_interval(&self, network: &dyn Network) -> Duration {
        if network.peers().is_empty() {
            return self.tick_interval;
        }
        network.adjusted_interval().unwrap_or(self.tick_interval)
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn expected_sequence_id(&self) -> SequenceId {
        self.expected_next
    }

    /// Host only: id the next non-empty batch will carry
    pub fn next_sequence_id(&self) -> SequenceId {
        self.next_to_send
    }

    pub fn buffered_count(&self) -> usize {
        self.reorder_buffer.len()
    }

    pub fn outgoing_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn errors(&self) -> &ErrorBuffer {
        &self.errors
    }

    pub fn drain_errors(&mut self) -> Vec<LockstepError> {
        self.errors.drain()
    }

    // Private

    fn enqueue_call(&mut self, target: RpcTarget, args: Vec<Value>) {
        if !self.dispatcher.procedures().contains(&target) {
            let identifier = target.to_string();
            self.errors.push(LockstepError::RemoteCallFailed {
                target: identifier.clone(),
                source: RpcError::UnknownTarget { identifier },
            });
            return;
        }
        self.outgoing.push(RemoteCall::new(&target, args).into());
    }

    fn enqueue_event(&mut self, event: Value) {
        if event.is_null() {
            self.errors.push(LockstepError::NullArgument {
                operation: "trigger_event",
            });
            return;
        }
        debug!("trigger_event event={}", event.type_name());
        self.outgoing.push(DomainEvent::new(event).into());
    }

    fn send_lock_step(&mut self, network: &mut dyn Network) {
        let peers = network.peers();
        let is_authority = peers.is_empty() || network.is_host();
        trace!("send_lock_step authority={}", is_authority);

        if !is_authority {
            // participants never consume sequence ids
            let message = LockStepMessage::no_op(std::mem::take(&mut self.outgoing));
            let bytes = message.encode(&self.registry, &mut self.errors);
            if let Err(error) = network.send_to_host(&bytes) {
                self.errors.push(LockstepError::SendFailed {
                    destination: "host".to_string(),
                    reason: error.reason,
                });
            }
            return;
        }

        let mut payload = std::mem::take(&mut self.pending);
        payload.append(&mut self.outgoing);
        let message = self.build_host_message(payload);

        if peers.is_empty() {
            self.process(message);
            return;
        }

        let bytes = message.encode(&self.registry, &mut self.errors);
        for peer in peers {
            if let Err(error) = network.send_to_peer(peer, &bytes) {
                self.errors.push(LockstepError::SendFailed {
                    destination: format!("peer {}", peer),
                    reason: error.reason,
                });
            }
        }
    }

    fn build_host_message(&mut self, payload: Vec<NetworkData>) -> LockStepMessage {
        if payload.is_empty() {
            trace!("built no-op message");
            return LockStepMessage::no_op(payload);
        }
        let sequence_id = self.next_to_send;
        self.next_to_send += 1;
        trace!(
            "built message sequence_id={} items={}",
            sequence_id,
            payload.len()
        );
        LockStepMessage::new(sequence_id, payload)
    }

    fn process(&mut self, message: LockStepMessage) {
        if message.is_no_op() {
            return;
        }

        let sequence_id = message.sequence_id;
        if sequence_id == self.expected_next {
            self.execute(message);
            self.drain_reorder_buffer();
        } else if sequence_id > self.expected_next {
            self.reorder_buffer.insert_scan_from_back(sequence_id, message);
            debug!(
                "buffered message sequence_id={} buffered={}",
                sequence_id,
                self.reorder_buffer.len()
            );
        } else {
            self.errors.push(LockstepError::SequenceFromPast {
                sequence_id,
                expected: self.expected_next,
            });
        }
    }

    fn drain_reorder_buffer(&mut self) {
        while let Some(sequence_id) = self.reorder_buffer.front_id() {
            if sequence_id > self.expected_next {
                break;
            }
            let Some((_, message)) = self.reorder_buffer.pop_front() else {
                break;
            };
            if sequence_id < self.expected_next {
                self.errors.push(LockstepError::StaleBufferedMessage {
                    sequence_id,
                    expected: self.expected_next,
                });
            } else {
                self.execute(message);
            }
        }
    }

    fn execute(&mut self, message: LockStepMessage) {
        trace!(
            "executing message sequence_id={} items={}",
            message.sequence_id,
            message.payload.len()
        );
        self.expected_next += 1;
        for item in &message.payload {
            item.apply(&mut self.dispatcher, &mut self.errors);
        }
    }

    fn adapt_interval(&mut self, network: &mut dyn Network) {
        if !self.config.adaptive_interval || !network.is_host() {
            return;
        }
        let peers = network.peers();
        if peers.len() < 2 {
            return;
        }

        let rtts: Vec<Duration> = peers
            .iter()
            .filter(|peer| !network.is_loopback(**peer))
            .filter_map(|peer| network.rtt(*peer))
            .collect();
        if rtts.is_empty() {
            return;
        }

        let average_millis =
            rtts.iter().map(|rtt| rtt.as_secs_f64() * 1000.0).sum::<f64>() / rtts.len() as f64;
        let current_millis = self.current_interval(network).as_secs_f64() * 1000.0;
        let next_millis = ((current_millis + average_millis) as i64) / 2;
        if next_millis <= 0 {
            return;
        }

        let interval = Duration::from_millis(next_millis as u64);
        debug!(
            "adjusted tick interval to {:?} (average rtt {:.1}ms)",
            interval, average_millis
        );
        for peer in peers {
            network.set_adjusted_interval(peer, interval);
        }
    }

    fn react_to_errors(&mut self) -> Result<(), FatalError> {
        match self.config.error_policy {
            ErrorPolicy::Retain => Ok(()),
            ErrorPolicy::Ignore => {
                self.errors.drain();
                Ok(())
            }
            ErrorPolicy::Log => {
                for error in self.errors.drain() {
                    warn!("Lockstep Error: {}", error);
                }
                Ok(())
            }
            ErrorPolicy::Fatal => {
                let mut errors = self.errors.drain().into_iter();
                let Some(error) = errors.next() else {
                    return Ok(());
                };
                for other in errors {
                    warn!("Lockstep Error: {}", other);
                }
                Err(FatalError { error })
            }
        }
    }
}

// Time left over once every whole `interval` is taken out of `accumulated`
fn remainder(accumulated: Duration, interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }
    let nanos = accumulated.as_nanos() % interval.as_nanos();
    Duration::new(
        (nanos / 1_000_000_000) as u64,
        (nanos % 1_000_000_000) as u32,
    )
}
