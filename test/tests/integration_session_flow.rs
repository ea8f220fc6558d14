/// End-to-end tests: a host and its participants exchanging batches over the
/// in-memory network. Every participant must execute the same items in the
/// same order, exactly once.

use lockstep_sequencer::{ErrorPolicy, SequencerConfig};
use lockstep_shared::{LockstepError, Value, FIRST_SEQUENCE_ID};
use lockstep_test::{
    init_logging, DoubleCounterEvent, Node, SetCounterEvent, TestSession, ADD_PROCEDURE, HOST_PEER,
};

fn retaining() -> SequencerConfig {
    SequencerConfig {
        error_policy: ErrorPolicy::Retain,
        ..Default::default()
    }
}

fn assert_same_journals(session: &TestSession) {
    let expected = session.host.journal();
    for client in &session.clients {
        assert_eq!(client.journal(), expected, "peer {} diverged", client.peer());
    }
}

fn assert_no_errors(session: &mut TestSession) {
    assert!(session.host.sequencer.drain_errors().is_empty());
    for client in session.clients.iter_mut() {
        assert!(client.sequencer.drain_errors().is_empty());
    }
}

#[test]
fn items_from_every_participant_execute_everywhere() {
    init_logging();
    let mut session = TestSession::new(2, retaining());

    session.host.sequencer.send_raw(vec![Value::I32(0)]).unwrap();
    session.clients[0].sequencer.send_raw(vec![Value::I32(1)]).unwrap();
    session.clients[1].sequencer.send_raw(vec![Value::I32(2)]).unwrap();
    session.round().unwrap();

    // participants' items come before the host's own
    assert_eq!(session.host.journal(), vec!["raw[1]", "raw[2]", "raw[0]"]);
    assert_same_journals(&session);
    for participant in session.participants() {
        assert_eq!(
            participant.sequencer.expected_sequence_id(),
            FIRST_SEQUENCE_ID + 1
        );
    }
    assert_eq!(session.host.sequencer.next_sequence_id(), FIRST_SEQUENCE_ID + 1);
    assert_no_errors(&mut session);
}

#[test]
fn participants_never_execute_their_own_items_directly() {
    let mut session = TestSession::new(1, retaining());

    session.clients[0].sequencer.send_raw(vec![Value::from("move")]).unwrap();
    session.flush_clients().unwrap();
    assert!(session.clients[0].journal().is_empty());
    assert_eq!(session.clients[0].sequencer.outgoing_count(), 0);

    session.deliver_to_host().unwrap();
    assert_eq!(session.host.sequencer.pending_count(), 1);
    assert!(session.host.journal().is_empty());

    session.host.flush().unwrap();
    session.deliver_to_peers().unwrap();
    assert_eq!(session.clients[0].journal(), vec!["raw[\"move\"]"]);
    assert_same_journals(&session);
}

#[test]
fn empty_rounds_consume_no_sequence_ids() {
    let mut session = TestSession::new(2, retaining());

    session.flush_clients().unwrap();
    // participants report in even with nothing to say
    assert_eq!(session.hub.take_for_host().len(), 2);

    for _ in 0..3 {
        session.round().unwrap();
    }

    assert_eq!(session.host.sequencer.next_sequence_id(), FIRST_SEQUENCE_ID);
    for participant in session.participants() {
        assert_eq!(participant.sequencer.expected_sequence_id(), FIRST_SEQUENCE_ID);
        assert!(participant.journal().is_empty());
    }
    assert_no_errors(&mut session);
}

#[test]
fn remote_calls_and_events_keep_state_in_step() {
    init_logging();
    let mut session = TestSession::new(2, retaining());

    session
        .host
        .sequencer
        .trigger_event(Value::object(SetCounterEvent { value: 3 }))
        .unwrap();
    session.round().unwrap();

    session.clients[0]
        .sequencer
        .call_remote(ADD_PROCEDURE, vec![Value::I32(5)])
        .unwrap();
    session.clients[1]
        .sequencer
        .trigger_event(Value::object(DoubleCounterEvent))
        .unwrap();
    session.round().unwrap();

    assert_eq!(session.host.journal(), vec!["set(3)", "add(5)", "double"]);
    assert_same_journals(&session);
    for participant in session.participants() {
        assert_eq!(participant.counter.get(), 16);
    }
    assert_no_errors(&mut session);
}

#[test]
fn mixed_batch_keeps_enqueue_order() {
    let mut session = TestSession::new(1, retaining());
    let host = &mut session.host.sequencer;

    host.send_raw(vec![Value::I32(1)]).unwrap();
    host.call_remote(ADD_PROCEDURE, vec![Value::I32(2)]).unwrap();
    host.trigger_events(vec![
        Value::object(DoubleCounterEvent),
        Value::object(SetCounterEvent { value: 7 }),
    ])
    .unwrap();
    host.send_raw(vec![Value::I32(3), Value::from("end")]).unwrap();
    session.round().unwrap();

    assert_eq!(
        session.clients[0].journal(),
        vec!["raw[1]", "add(2)", "double", "set(7)", "raw[3,\"end\"]"]
    );
    assert_same_journals(&session);
    assert_eq!(session.clients[0].counter.get(), 7);
}

#[test]
fn badly_typed_remote_call_fails_on_execution_everywhere() {
    let mut session = TestSession::new(1, retaining());

    session.clients[0]
        .sequencer
        .call_remote(ADD_PROCEDURE, vec![Value::from("five")])
        .unwrap();
    session.clients[0].sequencer.send_raw(vec![Value::I32(1)]).unwrap();
    session.round().unwrap();

    // the failing item does not stop the rest of the batch
    for participant in session.participants_mut() {
        assert_eq!(participant.journal(), vec!["raw[1]"]);
        let errors = participant.sequencer.drain_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LockstepError::RemoteCallFailed { .. }));
    }
}

#[test]
fn objects_inside_raw_data_arrive_intact() {
    let mut session = TestSession::new(1, retaining());
    let node = Node::new(11);
    let shared = Value::from(node);

    session.clients[0]
        .sequencer
        .send_raw(vec![shared.clone(), shared])
        .unwrap();
    session.round().unwrap();

    let seen = session.host.recorder.seen();
    assert_eq!(seen.len(), 2);
    let first = seen[0].as_object().unwrap();
    assert!(first.ptr_eq(seen[1].as_object().unwrap()));
    assert_eq!(first.borrow::<Node>().unwrap().value, 11);
}

#[test]
fn failed_send_is_reported_and_others_still_receive() {
    let mut session = TestSession::new(2, retaining());
    let lost = session.clients[0].peer();
    session.hub.disconnect(lost);

    session.host.sequencer.send_raw(vec![Value::I32(4)]).unwrap();
    session.round().unwrap();

    let errors = session.host.sequencer.drain_errors();
    assert_eq!(
        errors,
        vec![LockstepError::SendFailed {
            destination: format!("peer {}", lost),
            reason: format!("peer {} disconnected", lost),
        }]
    );
    assert_eq!(session.clients[1].journal(), vec!["raw[4]"]);
    assert!(session.clients[0].journal().is_empty());
}

#[test]
fn participant_without_host_reports_send_failure() {
    let mut session = TestSession::new(1, retaining());
    session.hub.disconnect(HOST_PEER);

    session.clients[0].sequencer.send_raw(vec![Value::I32(4)]).unwrap();
    session.flush_clients().unwrap();

    let errors = session.clients[0].sequencer.drain_errors();
    assert!(matches!(
        &errors[..],
        [LockstepError::SendFailed { destination, .. }] if destination == "host"
    ));
}

#[test]
fn host_loopback_executes_host_batches() {
    let mut session = TestSession::new(0, retaining());
    assert_eq!(session.hub.peers(), vec![HOST_PEER]);

    session.host.sequencer.send_raw(vec![Value::Bool(true)]).unwrap();
    session.host.flush().unwrap();
    // nothing runs until the loopback copy is delivered
    assert!(session.host.journal().is_empty());
    assert_eq!(session.hub.queued_for_peer(HOST_PEER), 1);

    session.deliver_to_peers().unwrap();
    assert_eq!(session.host.journal(), vec!["raw[true]"]);
}
