// Session state for the relay server.
//
// `Session` is the central data structure that `server.rs` drives. It tracks
// connected clients, the player roster, and the last-seen shared game state
// (deck, discard pile, turn). All mutation happens through methods called
// from the server's single-threaded main loop — no internal locking.
//
// The relay is a message broker, not a referee. It never validates a play,
// computes rent, or advances a turn on its own. Its routing rules are:
//
// - `UpdatePlayer`: upsert the roster by player name, bind the sending
//   connection to that name, and broadcast the full roster to everyone.
// - `UpdateDeck` / `UpdateDiscardPile` / `UpdateTurn`: remember the payload
//   and rebroadcast it verbatim to every client except the sender.
// - `RequestDeck` / `RequestPlayerList`: answer the requester alone with the
//   stored state.
// - Everything else (rent, theft, lobby signals): fan out to every client
//   except the sender, untouched.
//
// Writing to client streams: `Session` holds cloned `TcpStream` write halves
// wrapped in `BufWriter`. Write errors on a single client are swallowed —
// the reader thread for that client will detect the broken pipe and send a
// `Disconnected` event.

use std::collections::BTreeMap;
use std::io::BufWriter;
use std::net::TcpStream;

use tycoon_engine::{Card, Player, Turn};
use tycoon_protocol::framing::write_frame;
use tycoon_protocol::message::Message;

/// Identifies one TCP connection for the lifetime of the session. Distinct
/// from player names: a connection has no name until its first
/// `UpdatePlayer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

struct Connection {
    /// Player name claimed by this connection's first `UpdatePlayer`.
    name: Option<String>,
    writer: BufWriter<TcpStream>,
}

/// Relay session managing a single multiplayer game.
pub struct Session {
    connections: BTreeMap<ConnectionId, Connection>,
    next_connection_id: u32,
    max_players: u32,

    // Shared state mirrored for late requests. The relay stores whatever the
    // clients last sent; it never edits these.
    roster: Vec<Player>,
    deck: Vec<Card>,
    discard: Vec<Card>,
    turn: Option<Turn>,
}

impl Session {
    pub fn new(max_players: u32) -> Self {
        Self {
            connections: BTreeMap::new(),
            next_connection_id: 0,
            max_players,
            roster: Vec::new(),
            deck: Vec::new(),
            discard: Vec::new(),
            turn: None,
        }
    }

    /// Attempt to register a new connection. Returns the assigned connection
    /// ID, or an error reason when the session is full.
    ///
    /// The returned `ConnectionId` tags the reader thread for this
    /// connection so that subsequent `MessageFrom` events carry the correct
    /// ID.
    pub fn add_connection(&mut self, stream: TcpStream) -> Result<ConnectionId, String> {
        if self.connections.len() as u32 >= self.max_players {
            return Err("session is full".into());
        }

        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;
        self.connections.insert(
            id,
            Connection {
                name: None,
                writer: BufWriter::new(stream),
            },
        );
        Ok(id)
    }

    /// Drop a connection. The roster entry for its player survives — state
    /// belongs to the game, not the socket, and a reconnecting client
    /// reclaims it by sending `UpdatePlayer` under the same name.
    pub fn remove_connection(&mut self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Route one decoded message from a client.
    pub fn handle_message(&mut self, from: ConnectionId, message: Message) {
        match message {
            Message::UpdatePlayer(player) => self.upsert_player(from, player),
            Message::UpdateDeck(cards) => {
                self.deck = cards.clone();
                self.broadcast_except(from, &Message::UpdateDeck(cards));
            }
            Message::UpdateDiscardPile(cards) => {
                self.discard = cards.clone();
                self.broadcast_except(from, &Message::UpdateDiscardPile(cards));
            }
            Message::UpdateTurn(turn) => {
                self.turn = Some(turn);
                self.broadcast_except(from, &Message::UpdateTurn(turn));
            }
            Message::RequestDeck => {
                self.send_to(from, &Message::UpdateDeck(self.deck.clone()));
            }
            Message::RequestPlayerList => {
                self.send_to(from, &Message::UpdatePlayerList(self.roster.clone()));
            }
            // Counter-play traffic and lobby signals: pure fan-out. The
            // clients correlate requests and responses by player name.
            Message::RentRequest(_)
            | Message::RentResponse(_)
            | Message::TheftRequest(_)
            | Message::TheftResponse(_)
            | Message::TimeToConnect
            | Message::LaunchGame => {
                self.broadcast_except(from, &message);
            }
            // Only the relay produces roster broadcasts.
            Message::UpdatePlayerList(_) => {}
        }
    }

    /// Upsert the roster by name and broadcast the authoritative list to
    /// everyone, sender included — the sender learns its join position from
    /// the same broadcast as everyone else.
    fn upsert_player(&mut self, from: ConnectionId, player: Player) {
        if let Some(conn) = self.connections.get_mut(&from) {
            conn.name = Some(player.name.clone());
        }
        match self.roster.iter_mut().find(|p| p.name == player.name) {
            Some(existing) => *existing = player,
            None => self.roster.push(player),
        }
        self.broadcast(&Message::UpdatePlayerList(self.roster.clone()));
    }

    /// Returns the number of connected clients.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The roster in join order.
    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    /// The last stored turn state, if any client has published one.
    pub fn turn(&self) -> Option<Turn> {
        self.turn
    }

    /// Send a message to a specific connection. Silently ignores write
    /// errors (the reader thread will detect the broken pipe).
    fn send_to(&mut self, id: ConnectionId, msg: &Message) {
        if let Some(conn) = self.connections.get_mut(&id) {
            let _ = write_frame(&mut conn.writer, &msg.encode());
        }
    }

    /// Broadcast a message to all connections.
    fn broadcast(&mut self, msg: &Message) {
        let bytes = msg.encode();
        for conn in self.connections.values_mut() {
            let _ = write_frame(&mut conn.writer, &bytes);
        }
    }

    /// Broadcast a message to all connections except `from`.
    fn broadcast_except(&mut self, from: ConnectionId, msg: &Message) {
        let bytes = msg.encode();
        for (id, conn) in self.connections.iter_mut() {
            if *id != from {
                let _ = write_frame(&mut conn.writer, &bytes);
            }
        }
    }
}
