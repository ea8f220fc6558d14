/// Integration tests for the tick clock and the host's adaptive interval

use std::time::Duration;

use lockstep_sequencer::{ErrorPolicy, Network, OfflineNetwork, Sequencer, SequencerConfig};
use lockstep_shared::{Protocol, Value, FIRST_SEQUENCE_ID};
use lockstep_test::{init_logging, TestSession, HOST_PEER};

fn adaptive() -> SequencerConfig {
    SequencerConfig {
        adaptive_interval: true,
        error_policy: ErrorPolicy::Retain,
    }
}

fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn interval_moves_halfway_to_average_rtt() {
    init_logging();
    let mut session = TestSession::new(2, adaptive());
    let first = session.clients[0].peer();
    let second = session.clients[1].peer();
    session.hub.set_rtt(first, millis(100));
    session.hub.set_rtt(second, millis(300));
    // the loopback connection is never averaged in
    session.hub.set_rtt(HOST_PEER, millis(1));

    session.host.update(millis(250)).unwrap();

    for peer in session.hub.peers() {
        assert_eq!(session.hub.interval_of(peer), Some(millis(225)));
    }
    assert_eq!(
        session
            .host
            .sequencer
            .current_interval(&session.host.network),
        millis(225)
    );

    // (225 + 200) / 2, truncated
    session.host.update(millis(225)).unwrap();
    assert_eq!(session.hub.interval_of(first), Some(millis(212)));
}

#[test]
fn fractional_rtt_is_truncated_before_halving() {
    let mut session = TestSession::new(2, adaptive());
    session
        .hub
        .set_rtt(session.clients[0].peer(), Duration::from_micros(10_700));
    session
        .hub
        .set_rtt(session.clients[1].peer(), Duration::from_micros(10_700));

    session.host.update(millis(250)).unwrap();

    // trunc(250 + 10.7) / 2 = 130
    assert_eq!(session.hub.interval_of(HOST_PEER), Some(millis(130)));
}

#[test]
fn interval_is_left_alone_without_measurements() {
    let mut session = TestSession::new(2, adaptive());

    session.host.update(millis(250)).unwrap();

    for peer in session.hub.peers() {
        assert_eq!(session.hub.interval_of(peer), None);
    }
}

#[test]
fn interval_is_left_alone_with_a_single_peer() {
    let mut session = TestSession::new(0, adaptive());
    session.hub.set_rtt(HOST_PEER, millis(80));

    session.host.update(millis(250)).unwrap();

    assert_eq!(session.hub.interval_of(HOST_PEER), None);
}

#[test]
fn interval_is_left_alone_when_disabled() {
    let config = SequencerConfig {
        adaptive_interval: false,
        ..adaptive()
    };
    let mut session = TestSession::new(2, config);
    session.hub.set_rtt(session.clients[0].peer(), millis(100));

    session.host.update(millis(250)).unwrap();

    assert_eq!(session.hub.interval_of(HOST_PEER), None);
}

#[test]
fn participants_only_adapt_on_the_host() {
    let mut session = TestSession::new(2, adaptive());
    session.hub.set_rtt(session.clients[0].peer(), millis(100));

    session.clients[0].update(millis(250)).unwrap();

    assert_eq!(session.hub.interval_of(HOST_PEER), None);
}

#[test]
fn participants_tick_at_the_assigned_interval() {
    let mut session = TestSession::new(1, adaptive());
    let peer = session.clients[0].peer();
    let mut host_network = session.hub.host();
    host_network.set_adjusted_interval(peer, millis(100));

    let client = &mut session.clients[0];
    assert_eq!(client.sequencer.current_interval(&client.network), millis(100));

    client.update(millis(60)).unwrap();
    assert!(session.hub.take_for_host().is_empty());

    let client = &mut session.clients[0];
    client.update(millis(60)).unwrap();
    assert_eq!(session.hub.take_for_host().len(), 1);
    assert_eq!(session.clients[0].sequencer.accumulated(), millis(20));
}

#[test]
fn long_frame_flushes_once_and_keeps_the_remainder() {
    let mut sequencer = Sequencer::new(
        SequencerConfig::default(),
        Protocol::builder().tick_interval(millis(100)).build(),
    );
    let mut network = OfflineNetwork;
    sequencer.send_raw(vec![Value::I32(1)]).unwrap();

    sequencer.update(millis(350), &mut network).unwrap();

    assert_eq!(sequencer.accumulated(), millis(50));
    assert_eq!(sequencer.next_sequence_id(), FIRST_SEQUENCE_ID + 1);
    assert_eq!(sequencer.expected_sequence_id(), FIRST_SEQUENCE_ID + 1);
}

#[test]
fn offline_device_is_its_own_authority() {
    let sequencer = Sequencer::new(SequencerConfig::default(), Protocol::builder().build());
    let network = OfflineNetwork;

    assert!(sequencer.is_authority(&network));
    assert_eq!(sequencer.current_interval(&network), millis(250));
    assert_eq!(sequencer.tick_interval(), millis(250));
}

#[test]
fn only_the_host_is_authority_in_a_session() {
    let session = TestSession::new(1, adaptive());

    assert!(session.host.sequencer.is_authority(&session.host.network));
    assert!(!session.clients[0]
        .sequencer
        .is_authority(&session.clients[0].network));
}
