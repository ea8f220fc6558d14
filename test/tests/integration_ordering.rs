/// Integration tests for delivery the transport does not keep in order:
/// batches arriving late, early, twice, or all at once.

use lockstep_sequencer::{ErrorPolicy, SequencerConfig};
use lockstep_shared::{LockstepError, Value, FIRST_SEQUENCE_ID};
use lockstep_test::{init_logging, TestSession};

fn retaining() -> SequencerConfig {
    SequencerConfig {
        error_policy: ErrorPolicy::Retain,
        ..Default::default()
    }
}

/// Host broadcasts `count` batches, one raw item each, without delivering them
fn broadcast(session: &mut TestSession, count: i32) {
    for index in 0..count {
        session.host.sequencer.send_raw(vec![Value::I32(index)]).unwrap();
        session.host.flush().unwrap();
    }
}

#[test]
fn reversed_delivery_executes_in_sequence() {
    init_logging();
    let mut session = TestSession::new(1, retaining());
    broadcast(&mut session, 3);

    let peer = session.clients[0].peer();
    let mut batches = session.hub.take_for_peer(peer);
    assert_eq!(batches.len(), 3);
    batches.reverse();

    let client = &mut session.clients[0];
    client.sequencer.receive_from_host(&batches[0]).unwrap();
    client.sequencer.receive_from_host(&batches[1]).unwrap();
    assert_eq!(client.sequencer.buffered_count(), 2);
    assert!(client.journal().is_empty());

    client.sequencer.receive_from_host(&batches[2]).unwrap();
    assert_eq!(client.journal(), vec!["raw[0]", "raw[1]", "raw[2]"]);
    assert_eq!(client.sequencer.buffered_count(), 0);
    assert_eq!(client.sequencer.expected_sequence_id(), FIRST_SEQUENCE_ID + 3);
    assert!(client.sequencer.drain_errors().is_empty());
}

#[test]
fn gap_holds_everything_behind_it() {
    let mut session = TestSession::new(1, retaining());
    broadcast(&mut session, 4);

    let peer = session.clients[0].peer();
    let batches = session.hub.take_for_peer(peer);
    let client = &mut session.clients[0];

    client.sequencer.receive_from_host(&batches[0]).unwrap();
    client.sequencer.receive_from_host(&batches[2]).unwrap();
    client.sequencer.receive_from_host(&batches[3]).unwrap();
    assert_eq!(client.journal(), vec!["raw[0]"]);
    assert_eq!(client.sequencer.buffered_count(), 2);

    client.sequencer.receive_from_host(&batches[1]).unwrap();
    assert_eq!(
        client.journal(),
        vec!["raw[0]", "raw[1]", "raw[2]", "raw[3]"]
    );
}

#[test]
fn redelivered_batch_is_discarded() {
    let mut session = TestSession::new(1, retaining());
    broadcast(&mut session, 1);

    let peer = session.clients[0].peer();
    let batches = session.hub.take_for_peer(peer);
    let client = &mut session.clients[0];

    client.sequencer.receive_from_host(&batches[0]).unwrap();
    client.sequencer.receive_from_host(&batches[0]).unwrap();

    assert_eq!(client.journal(), vec!["raw[0]"]);
    assert_eq!(
        client.sequencer.drain_errors(),
        vec![LockstepError::SequenceFromPast {
            sequence_id: FIRST_SEQUENCE_ID,
            expected: FIRST_SEQUENCE_ID + 1,
        }]
    );
}

#[test]
fn early_duplicate_goes_stale_once_the_gap_fills() {
    let mut session = TestSession::new(1, retaining());
    broadcast(&mut session, 2);

    let peer = session.clients[0].peer();
    let batches = session.hub.take_for_peer(peer);
    let client = &mut session.clients[0];

    client.sequencer.receive_from_host(&batches[1]).unwrap();
    client.sequencer.receive_from_host(&batches[1]).unwrap();
    assert_eq!(client.sequencer.buffered_count(), 2);

    client.sequencer.receive_from_host(&batches[0]).unwrap();

    assert_eq!(client.journal(), vec!["raw[0]", "raw[1]"]);
    assert_eq!(client.sequencer.buffered_count(), 0);
    assert_eq!(
        client.sequencer.drain_errors(),
        vec![LockstepError::StaleBufferedMessage {
            sequence_id: FIRST_SEQUENCE_ID + 1,
            expected: FIRST_SEQUENCE_ID + 2,
        }]
    );
}

#[test]
fn garbage_from_the_host_is_reported_and_skipped() {
    let mut session = TestSession::new(1, retaining());
    let client = &mut session.clients[0];

    client.sequencer.receive_from_host(&[99, 1, 2, 3]).unwrap();

    assert!(client.journal().is_empty());
    assert_eq!(client.sequencer.expected_sequence_id(), FIRST_SEQUENCE_ID);
    assert_eq!(
        client.sequencer.drain_errors(),
        vec![LockstepError::IllegalChunkTag { tag: 99, offset: 0 }]
    );
}

#[test]
fn empty_batches_are_reported_on_both_sides() {
    let mut session = TestSession::new(1, retaining());

    session.clients[0].sequencer.receive_from_host(&[]).unwrap();
    session.host.sequencer.receive_from_participant(&[]).unwrap();

    let empty = vec![LockstepError::UnexpectedPayload { type_name: "nothing" }];
    assert_eq!(session.clients[0].sequencer.drain_errors(), empty);
    assert_eq!(session.host.sequencer.drain_errors(), empty);
    assert_eq!(session.host.sequencer.pending_count(), 0);
}

#[test]
fn late_joiner_buffers_until_it_sees_the_next_expected_batch() {
    let mut session = TestSession::new(1, retaining());
    broadcast(&mut session, 2);
    // the first two batches are lost on the way
    let peer = session.clients[0].peer();
    session.hub.take_for_peer(peer);

    session.host.sequencer.send_raw(vec![Value::I32(9)]).unwrap();
    session.round().unwrap();

    let client = &session.clients[0];
    assert!(client.journal().is_empty());
    assert_eq!(client.sequencer.buffered_count(), 1);
    assert_eq!(
        session.host.journal(),
        vec!["raw[0]", "raw[1]", "raw[9]"]
    );
}
