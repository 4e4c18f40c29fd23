// The client-side game session.
//
// `GameSession` owns the relay connection and this client's view of the
// table. Architecture:
// - `connect()` opens the TCP stream, announces the player with
//   `UpdatePlayer`, and spawns the dispatch thread.
// - The **dispatch thread** is the session's receive loop: it reads frames,
//   decodes messages, and applies them — roster/deck/turn updates, the
//   rentee and victim sides of the counter-play protocols, and resolution
//   of our own outstanding demands via the rendezvous in `pending.rs`.
// - The **caller's thread** drives play through `play_card` / `end_turn`.
//   Rent and theft plays block inside the call until every targeted
//   opponent has answered; the dispatch thread wakes them.
//
// Locking: `TableState` sits behind one mutex shared by both threads. The
// writer half of the stream sits behind its own mutex so the dispatch
// thread can answer demands while a caller blocks in a rendezvous. Lock
// order is always state before writer, and no lock is held across a
// rendezvous wait.
//
// Every local mutation of our player, the deck, the discard pile, or the
// turn is followed by the matching `Update*` send so the relay's copies
// stay authoritative.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tycoon_engine::{
    ActionKind, Card, CardId, Deck, GameConfig, GameRng, Player, Turn,
};
use tycoon_protocol::framing::{read_frame, write_frame};
use tycoon_protocol::message::Message;

use crate::hooks::{Decisions, SessionEvent};
use crate::pending::{ProtocolError, RentRendezvous, TheftRendezvous};
use crate::state::TableState;
use crate::{rent, theft};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not part of the current roster")]
    NotJoined,
    #[error("the game has not been launched")]
    NotLaunched,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("no actions remaining this turn")]
    NoActionsRemaining,
    #[error("card {0} is not in hand")]
    CardNotInHand(CardId),
    #[error("hand holds {held} cards, limit is {limit}")]
    HandLimit { held: usize, limit: usize },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// How a `play_card` call ended. `Cancelled` means a precondition failed or
/// a decision hook declined: nothing was sent, no action was spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    Cancelled,
}

/// Shared between the caller's thread and the dispatch thread.
pub(crate) struct Shared {
    pub(crate) name: String,
    pub(crate) config: GameConfig,
    pub(crate) state: Mutex<TableState>,
    pub(crate) rent: RentRendezvous,
    pub(crate) theft: TheftRendezvous,
    pub(crate) writer: Mutex<BufWriter<TcpStream>>,
    pub(crate) decisions: Box<dyn Decisions>,
    pub(crate) events: Sender<SessionEvent>,
}

impl Shared {
    /// Frame and send one message. Callers on the dispatch path swallow the
    /// result — a dead socket surfaces through the read side.
    pub(crate) fn send(&self, msg: &Message) -> Result<(), SessionError> {
        let mut writer = lock(&self.writer);
        write_frame(&mut *writer, &msg.encode())?;
        Ok(())
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

/// Mutex poisoning means another thread panicked mid-update; tests want the
/// panic, not a hang, so we keep going with whatever state is there.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct GameSession {
    shared: Arc<Shared>,
    events: Receiver<SessionEvent>,
    _dispatch: Option<JoinHandle<()>>,
}

impl GameSession {
    /// Connect to the relay, announce the player, and start the dispatch
    /// thread.
    pub fn connect(
        addr: &str,
        player_name: &str,
        config: GameConfig,
        decisions: Box<dyn Decisions>,
    ) -> Result<Self, SessionError> {
        let stream = TcpStream::connect(addr)?;
        let reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream);

        let (event_tx, event_rx) = mpsc::channel();
        let shared = Arc::new(Shared {
            name: player_name.to_string(),
            state: Mutex::new(TableState::new(&config, seed_from_name(player_name))),
            config,
            rent: RentRendezvous::new(),
            theft: TheftRendezvous::new(),
            writer: Mutex::new(writer),
            decisions,
            events: event_tx,
        });

        shared.send(&Message::UpdatePlayer(Player::new(player_name)))?;

        let dispatch_shared = shared.clone();
        let dispatch = thread::spawn(move || {
            dispatch_loop(&dispatch_shared, reader);
        });

        Ok(Self {
            shared,
            events: event_rx,
            _dispatch: Some(dispatch),
        })
    }

    /// Drain all pending events (non-blocking).
    pub fn poll_events(&self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<SessionEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn player_name(&self) -> &str {
        &self.shared.name
    }

    /// Snapshot of the current roster.
    pub fn roster(&self) -> Vec<Player> {
        lock(&self.shared.state).roster.clone()
    }

    /// Snapshot of our own player, if the roster already includes us.
    pub fn me(&self) -> Option<Player> {
        lock(&self.shared.state).player(&self.shared.name).cloned()
    }

    pub fn turn(&self) -> Turn {
        lock(&self.shared.state).turn
    }

    pub fn is_my_turn(&self) -> bool {
        lock(&self.shared.state).is_turn_of(&self.shared.name)
    }

    pub fn is_launched(&self) -> bool {
        lock(&self.shared.state).launched
    }

    /// Replace our own roster entry and announce it. The UI layer owns
    /// direct card arrangements (dragging a wild card between groups, say);
    /// every such change must be published or the other clients drift.
    pub fn publish_player(&self, player: Player) -> Result<(), SessionError> {
        let mut state = lock(&self.shared.state);
        match state.player_mut(&player.name) {
            Some(entry) => *entry = player.clone(),
            None => state.roster.push(player.clone()),
        }
        self.shared.send(&Message::UpdatePlayer(player))
    }

    /// Ask the relay for the authoritative roster.
    pub fn request_roster(&self) -> Result<(), SessionError> {
        self.shared.send(&Message::RequestPlayerList)
    }

    /// Ask the relay for the authoritative deck.
    pub fn request_deck(&self) -> Result<(), SessionError> {
        self.shared.send(&Message::RequestDeck)
    }

    /// Tell lobby clients to open their game connections.
    pub fn prompt_connect(&self) -> Result<(), SessionError> {
        self.shared.send(&Message::TimeToConnect)
    }

    /// Host only: build and shuffle the full card set, deal every player
    /// their opening hand, publish the shared state, and launch the game.
    /// The first roster player owns the first turn.
    pub fn launch_game(&self, seed: u64) -> Result<(), SessionError> {
        let shared = &self.shared;
        let mut state = lock(&shared.state);
        if state.roster.is_empty() {
            return Err(SessionError::NotJoined);
        }

        let mut rng = GameRng::new(seed);
        let mut deck = Deck::shuffled(&shared.config, &mut rng);
        let mut discard = Vec::new();
        for player in &mut state.roster {
            player.hand.clear();
            for _ in 0..5 {
                if let Some(card) = deck.draw(&mut discard, &mut rng) {
                    player.hand.push(card);
                }
            }
        }
        state.deck = deck;
        state.discard = discard;
        state.turn = Turn::new(&shared.config);
        state.launched = true;

        for player in state.roster.clone() {
            shared.send(&Message::UpdatePlayer(player))?;
        }
        publish_deck(shared, &state)?;
        publish_discard(shared, &state)?;
        shared.send(&Message::UpdateTurn(state.turn))?;
        shared.send(&Message::LaunchGame)?;
        shared.emit(SessionEvent::GameLaunched);

        // The relay excludes the sender from rebroadcasts, so the host's
        // own turn start is handled here.
        if state.is_turn_of(&shared.name) {
            state.was_my_turn = true;
            start_turn_draw(shared, &mut state);
        }
        Ok(())
    }

    /// Play a card from hand. Money and properties are placed directly;
    /// Pass Go draws; rent-like and theft actions run their protocols,
    /// blocking until the exchange settles. Reactive cards (Just Say No,
    /// Double The Rent) cannot be led and cancel.
    pub fn play_card(&self, card_id: CardId) -> Result<PlayOutcome, SessionError> {
        let shared = &self.shared;
        let card = {
            let state = lock(&shared.state);
            self.check_can_act(&state)?;
            state
                .player(&shared.name)
                .and_then(|p| p.hand.iter().find(|c| c.id == card_id))
                .cloned()
                .ok_or(SessionError::CardNotInHand(card_id))?
        };

        match card.action {
            Some(kind) if kind.is_rent_like() => rent::collect(shared, &card),
            Some(kind) if kind.is_theft() => theft::attempt(shared, &card, kind),
            Some(ActionKind::PassGo) => {
                let mut state = lock(&shared.state);
                if let Some(played) = state
                    .player_mut(&shared.name)
                    .and_then(|p| p.take_from_hand(card_id))
                {
                    state.discard.push(played);
                }
                let _ = publish_discard(shared, &state);
                draw_cards(shared, &mut state, shared.config.pass_go_draw);
                spend_action(shared, &mut state, 1);
                Ok(PlayOutcome::Played)
            }
            Some(ActionKind::JustSayNo | ActionKind::DoubleRent) => Ok(PlayOutcome::Cancelled),
            _ => {
                // Money, properties, enhancements, and any action card
                // banked for its cash value.
                let mut state = lock(&shared.state);
                let Some(played) = state
                    .player_mut(&shared.name)
                    .and_then(|p| p.take_from_hand(card_id))
                else {
                    return Err(SessionError::CardNotInHand(card_id));
                };
                place_played_card(shared, &mut state, played);
                let _ = publish_self(shared, &state);
                spend_action(shared, &mut state, 1);
                Ok(PlayOutcome::Played)
            }
        }
    }

    /// End the turn. Requires the hand to be at or under the limit; passes
    /// ownership to the next roster player with a fresh action budget.
    pub fn end_turn(&self) -> Result<(), SessionError> {
        let shared = &self.shared;
        let mut state = lock(&shared.state);
        if !state.launched {
            return Err(SessionError::NotLaunched);
        }
        if !state.is_turn_of(&shared.name) {
            return Err(SessionError::NotYourTurn);
        }
        let held = state
            .player(&shared.name)
            .map(|p| p.hand.len())
            .unwrap_or_default();
        let limit = shared.config.hand_limit;
        if held > limit {
            return Err(SessionError::HandLimit { held, limit });
        }

        let players = state.roster.len();
        state.turn.advance(players, &shared.config);
        shared.send(&Message::UpdateTurn(state.turn))?;
        shared.emit(SessionEvent::TurnChanged(state.turn));

        // With a single player the turn wraps straight back to us, and the
        // relay will not echo our own broadcast.
        let mine = state.is_turn_of(&shared.name);
        if mine && !state.was_my_turn {
            state.was_my_turn = true;
            start_turn_draw(shared, &mut state);
        } else {
            state.was_my_turn = mine;
        }
        Ok(())
    }

    /// Close the connection and wake anything blocked on a response.
    pub fn disconnect(&self) {
        {
            let writer = lock(&self.shared.writer);
            let _ = writer.get_ref().shutdown(Shutdown::Both);
        }
        self.shared.rent.cancel("disconnected");
        self.shared.theft.cancel("disconnected");
    }

    fn check_can_act(&self, state: &TableState) -> Result<(), SessionError> {
        if !state.launched {
            return Err(SessionError::NotLaunched);
        }
        if state.index_of(&self.shared.name).is_none() {
            return Err(SessionError::NotJoined);
        }
        if !state.is_turn_of(&self.shared.name) {
            return Err(SessionError::NotYourTurn);
        }
        if !state.turn.can_act() {
            return Err(SessionError::NoActionsRemaining);
        }
        Ok(())
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Place a card led from hand into our play area. Enhancements ride the
/// first monopoly group and are banked as money without one; anything that
/// is not a property is banked as money.
fn place_played_card(shared: &Shared, state: &mut TableState, card: Card) {
    let monopoly = state
        .player(&shared.name)
        .map(|p| p.monopoly_groups(&shared.config))
        .unwrap_or_default();
    let Some(me) = state.player_mut(&shared.name) else {
        return;
    };
    if card.is_property() {
        me.place_property(card);
    } else if card.is_enhancement() {
        match monopoly.first().copied() {
            Some(group) => me.in_play[group].push(card),
            None => me.place_as_money(card),
        }
    } else {
        me.place_as_money(card);
    }
}

// ---------------------------------------------------------------------------
// Shared mutation helpers, used by rent.rs and theft.rs too
// ---------------------------------------------------------------------------

pub(crate) fn publish_self(shared: &Shared, state: &TableState) -> Result<(), SessionError> {
    match state.player(&shared.name) {
        Some(me) => shared.send(&Message::UpdatePlayer(me.clone())),
        None => Ok(()),
    }
}

pub(crate) fn publish_deck(shared: &Shared, state: &TableState) -> Result<(), SessionError> {
    shared.send(&Message::UpdateDeck(state.deck.cards().to_vec()))
}

pub(crate) fn publish_discard(shared: &Shared, state: &TableState) -> Result<(), SessionError> {
    shared.send(&Message::UpdateDiscardPile(state.discard.clone()))
}

/// Spend `count` actions and publish the new turn state.
pub(crate) fn spend_action(shared: &Shared, state: &mut TableState, count: u32) {
    for _ in 0..count {
        state.turn.spend_action();
    }
    let _ = shared.send(&Message::UpdateTurn(state.turn));
    shared.emit(SessionEvent::TurnChanged(state.turn));
}

/// Move a held Just Say No to the discard pile and broadcast. Returns false
/// when none is in hand.
pub(crate) fn play_just_say_no(shared: &Shared, state: &mut TableState) -> bool {
    let id = match state
        .player(&shared.name)
        .and_then(|p| p.hand_action(ActionKind::JustSayNo))
        .map(|c| c.id)
    {
        Some(id) => id,
        None => return false,
    };
    if let Some(card) = state
        .player_mut(&shared.name)
        .and_then(|p| p.take_from_hand(id))
    {
        state.discard.push(card);
    }
    let _ = publish_self(shared, state);
    let _ = publish_discard(shared, state);
    true
}

/// Draw `n` cards into our hand, reshuffling the discard pile into the deck
/// if it runs dry, and broadcast everything that changed.
pub(crate) fn draw_cards(shared: &Shared, state: &mut TableState, n: usize) {
    let had_discard = !state.discard.is_empty();
    let mut drawn = Vec::new();
    for _ in 0..n {
        let TableState {
            deck,
            discard,
            rng,
            ..
        } = state;
        match deck.draw(discard, rng) {
            Some(card) => drawn.push(card),
            None => break,
        }
    }
    let count = drawn.len();
    if let Some(me) = state.player_mut(&shared.name) {
        me.hand.extend(drawn);
    }
    let _ = publish_self(shared, state);
    let _ = publish_deck(shared, state);
    if had_discard && state.discard.is_empty() {
        let _ = publish_discard(shared, state);
    }
    shared.emit(SessionEvent::CardsDrawn(count));
}

/// The turn-start draw: 2 cards, or 5 when the hand is empty.
pub(crate) fn start_turn_draw(shared: &Shared, state: &mut TableState) {
    let empty = state
        .player(&shared.name)
        .is_some_and(|p| p.hand.is_empty());
    let n = if empty {
        shared.config.draw_on_empty_hand
    } else {
        shared.config.draw_per_turn
    };
    draw_cards(shared, state, n);
}

/// Escalate a protocol invariant violation: report it and wake any waiter.
/// The session is not usable afterwards.
pub(crate) fn fatal(shared: &Shared, error: ProtocolError) {
    shared.emit(SessionEvent::Fatal(error.to_string()));
    shared.rent.cancel("protocol violation");
    shared.theft.cancel("protocol violation");
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The session's receive loop. Exits when the connection closes.
fn dispatch_loop(shared: &Arc<Shared>, mut reader: BufReader<TcpStream>) {
    loop {
        let bytes = match read_frame(&mut reader) {
            Ok(bytes) => bytes,
            Err(_) => {
                shared.rent.cancel("connection closed");
                shared.theft.cancel("connection closed");
                shared.emit(SessionEvent::Disconnected);
                return;
            }
        };
        match Message::decode(&bytes) {
            Ok(message) => handle_message(shared, message),
            Err(err) => {
                shared.emit(SessionEvent::Fatal(err.to_string()));
                shared.rent.cancel("undecodable message");
                shared.theft.cancel("undecodable message");
                return;
            }
        }
    }
}

fn handle_message(shared: &Arc<Shared>, message: Message) {
    match message {
        Message::UpdatePlayerList(mut roster) => {
            let mut state = lock(&shared.state);
            // Once the game is launched only this client writes its own
            // entry, so the local copy is authoritative. A relayed echo of
            // an earlier self-publish may still be in flight and must not
            // roll back a newer local hand. Before launch the host deals
            // every hand, so the broadcast wins.
            if state.launched {
                if let Some(mine) = state.player(&shared.name).cloned() {
                    match roster.iter_mut().find(|p| p.name == shared.name) {
                        Some(entry) => *entry = mine,
                        None => roster.push(mine),
                    }
                }
            }
            state.roster = roster;
            drop(state);
            shared.emit(SessionEvent::RosterChanged);
        }
        Message::UpdateDeck(cards) => {
            lock(&shared.state).deck = Deck::new(cards);
        }
        Message::UpdateDiscardPile(cards) => {
            lock(&shared.state).discard = cards;
        }
        Message::UpdateTurn(turn) => {
            let mut state = lock(&shared.state);
            state.turn = turn;
            shared.emit(SessionEvent::TurnChanged(turn));
            let mine = state.is_turn_of(&shared.name);
            if mine && !state.was_my_turn {
                state.was_my_turn = true;
                start_turn_draw(shared, &mut state);
            } else {
                state.was_my_turn = mine;
            }
        }
        Message::TimeToConnect => shared.emit(SessionEvent::ConnectPrompted),
        Message::LaunchGame => {
            lock(&shared.state).launched = true;
            shared.emit(SessionEvent::GameLaunched);
        }
        Message::RentRequest(request) => rent::handle_request(shared, &request),
        Message::RentResponse(response) => rent::handle_response(shared, response),
        Message::TheftRequest(request) => theft::handle_request(shared, &request),
        Message::TheftResponse(response) => theft::handle_response(shared, &response),
        // The relay consumes these; a client never receives them.
        Message::UpdatePlayer(_) | Message::RequestDeck | Message::RequestPlayerList => {}
    }
}

/// Stable per-player seed for the local reshuffle RNG. Shuffle results are
/// always broadcast, so clients need not agree on this.
fn seed_from_name(name: &str) -> u64 {
    let mut seed = 0xA076_1D64_78BD_642Fu64;
    for byte in name.bytes() {
        seed = (seed ^ u64::from(byte)).wrapping_mul(0x100_0000_01B3);
    }
    seed
}
