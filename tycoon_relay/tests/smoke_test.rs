// Integration smoke test for the relay server.
//
// Starts a relay on localhost, connects real TCP clients, and exercises the
// routing rules end to end: roster upsert and broadcast, shared-state
// rebroadcast with sender exclusion, requester-only replies, counter-play
// fan-out, and disconnect handling.
//
// Each client is a `NetClient` from the relay crate — no game session code
// involved.

use std::time::Duration;

use tycoon_engine::{Player, RentRequest, RentResponse, Turn};
use tycoon_protocol::message::Message;
use tycoon_relay::client::NetClient;
use tycoon_relay::server::{RelayConfig, start_relay};

const RECV_WAIT: Duration = Duration::from_secs(5);

fn local_relay(max_players: u32) -> (tycoon_relay::server::RelayHandle, String) {
    let config = RelayConfig {
        port: 0, // OS picks a free port
        max_players,
    };
    let (handle, addr) = start_relay(config).unwrap();
    // Give the listener thread a moment to start.
    std::thread::sleep(Duration::from_millis(50));
    (handle, addr.to_string())
}

fn expect_roster(client: &NetClient, names: &[&str]) {
    match client.recv_timeout(RECV_WAIT) {
        Some(Message::UpdatePlayerList(roster)) => {
            let got: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(got, names);
        }
        other => panic!("expected UpdatePlayerList, got {other:?}"),
    }
}

#[test]
fn roster_and_state_routing() {
    let (handle, addr) = local_relay(4);

    let mut alice = NetClient::connect(&addr).unwrap();
    let mut bob = NetClient::connect(&addr).unwrap();
    // Let the relay register both connections before the first broadcast.
    std::thread::sleep(Duration::from_millis(100));

    // Alice joins; both clients see the one-player roster.
    alice
        .send(&Message::UpdatePlayer(Player::new("Alice")))
        .unwrap();
    expect_roster(&alice, &["Alice"]);
    expect_roster(&bob, &["Alice"]);

    // Bob joins; roster keeps join order.
    bob.send(&Message::UpdatePlayer(Player::new("Bob"))).unwrap();
    expect_roster(&alice, &["Alice", "Bob"]);
    expect_roster(&bob, &["Alice", "Bob"]);

    // Alice publishes a turn; only Bob receives the rebroadcast.
    let turn = Turn {
        current_owner: 0,
        actions_remaining: 3,
        game_over: false,
    };
    alice.send(&Message::UpdateTurn(turn)).unwrap();
    assert_eq!(bob.recv_timeout(RECV_WAIT), Some(Message::UpdateTurn(turn)));
    assert!(alice.recv_timeout(Duration::from_millis(200)).is_none());

    // Bob asks for the roster; only Bob gets the reply.
    bob.send(&Message::RequestPlayerList).unwrap();
    expect_roster(&bob, &["Alice", "Bob"]);
    assert!(alice.recv_timeout(Duration::from_millis(200)).is_none());

    handle.stop();
}

#[test]
fn rent_round_trip_between_clients() {
    let (handle, addr) = local_relay(4);

    let mut alice = NetClient::connect(&addr).unwrap();
    let mut bob = NetClient::connect(&addr).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    alice
        .send(&Message::UpdatePlayer(Player::new("Alice")))
        .unwrap();
    bob.send(&Message::UpdatePlayer(Player::new("Bob"))).unwrap();
    // Drain the roster broadcasts.
    for client in [&alice, &bob] {
        assert!(client.recv_timeout(RECV_WAIT).is_some());
        assert!(client.recv_timeout(RECV_WAIT).is_some());
    }

    // Alice demands rent; the relay hands it to Bob untouched.
    let request = RentRequest {
        renter: "Alice".into(),
        rentees: vec!["Bob".into()],
        amount: 3,
        doubled: false,
    };
    alice.send(&Message::RentRequest(request.clone())).unwrap();
    assert_eq!(
        bob.recv_timeout(RECV_WAIT),
        Some(Message::RentRequest(request))
    );

    // Bob pays; Alice receives the response.
    let response = RentResponse {
        renter: "Alice".into(),
        rentee: "Bob".into(),
        assets_given: Vec::new(),
        accepted: true,
    };
    bob.send(&Message::RentResponse(response.clone())).unwrap();
    assert_eq!(
        alice.recv_timeout(RECV_WAIT),
        Some(Message::RentResponse(response))
    );

    handle.stop();
}

#[test]
fn deck_request_after_disconnect() {
    let (handle, addr) = local_relay(4);

    let mut alice = NetClient::connect(&addr).unwrap();
    alice
        .send(&Message::UpdatePlayer(Player::new("Alice")))
        .unwrap();
    assert!(alice.recv_timeout(RECV_WAIT).is_some());

    // Alice publishes an empty deck and leaves.
    alice.send(&Message::UpdateDeck(Vec::new())).unwrap();
    alice.disconnect();
    std::thread::sleep(Duration::from_millis(100));

    // A later client still gets the stored deck and roster.
    let mut carol = NetClient::connect(&addr).unwrap();
    carol.send(&Message::RequestDeck).unwrap();
    assert_eq!(
        carol.recv_timeout(RECV_WAIT),
        Some(Message::UpdateDeck(Vec::new()))
    );
    carol.send(&Message::RequestPlayerList).unwrap();
    expect_roster(&carol, &["Alice"]);

    handle.stop();
}

#[test]
fn lobby_signals_fan_out() {
    let (handle, addr) = local_relay(4);

    let mut host = NetClient::connect(&addr).unwrap();
    let guest = NetClient::connect(&addr).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    host.send(&Message::TimeToConnect).unwrap();
    assert_eq!(guest.recv_timeout(RECV_WAIT), Some(Message::TimeToConnect));

    host.send(&Message::LaunchGame).unwrap();
    assert_eq!(guest.recv_timeout(RECV_WAIT), Some(Message::LaunchGame));

    handle.stop();
}
