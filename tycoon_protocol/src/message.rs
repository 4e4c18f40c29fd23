// Message vocabulary and domain-type encodings.
//
// Every wire message is `[1-byte kind tag][kind-specific payload]`. The tag
// tells the relay how much to care (most messages are pure fan-out) and the
// recipient how to decode. The message set is small, fixed, and closed —
// decoding an unknown tag is a hard `DecodeError::UnknownTag`, never a skip.
//
// Domain payloads (Card, Player, Turn, the rent/theft requests and
// responses) are encoded field-by-field with the primitives in `wire.rs`.
// Field order is part of the protocol and must not change:
//
//   Card   = name, kind, value, color, alt_color, image_path, sound_path,
//            action (i32, -1 = none), id (u32), flipped
//   Player = name, in_play (count + groups, each a card list), hand
//   Turn   = current_owner (u32), actions_remaining (u32), game_over
//
// `TheftRequest.card_to_give` travels as a sentinel card with an empty name
// when there is nothing to give (Sly Deal, Dealbreaker).
//
// `decode(encode(m)) == m` field-for-field for every legal message; the
// round-trip suite in `lib.rs` pins this.

use crate::wire::{DecodeError, Reader, Writer};
use tycoon_engine::{
    ActionKind, Card, CardId, CardKind, Player, PropertyColor, RentRequest, RentResponse,
    TheftRequest, TheftResponse, Turn,
};

// Message kind tags. Part of the wire protocol — append only.
pub const TAG_UPDATE_PLAYER: u8 = 0x01;
pub const TAG_UPDATE_PLAYER_LIST: u8 = 0x02;
pub const TAG_UPDATE_DECK: u8 = 0x03;
pub const TAG_UPDATE_DISCARD_PILE: u8 = 0x04;
pub const TAG_UPDATE_TURN: u8 = 0x05;
pub const TAG_REQUEST_DECK: u8 = 0x06;
pub const TAG_REQUEST_PLAYER_LIST: u8 = 0x07;
pub const TAG_RENT_REQUEST: u8 = 0x08;
pub const TAG_RENT_RESPONSE: u8 = 0x09;
pub const TAG_THEFT_REQUEST: u8 = 0x0A;
pub const TAG_THEFT_RESPONSE: u8 = 0x0B;
pub const TAG_TIME_TO_CONNECT: u8 = 0x0C;
pub const TAG_LAUNCH_GAME: u8 = 0x0D;

/// The complete, closed message set exchanged between clients and the relay.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// A client announces or updates its own player state. The relay upserts
    /// the roster by name and answers with a full `UpdatePlayerList`.
    UpdatePlayer(Player),
    /// The authoritative roster, in join order.
    UpdatePlayerList(Vec<Player>),
    /// Replace the shared draw deck.
    UpdateDeck(Vec<Card>),
    /// Replace the shared discard pile.
    UpdateDiscardPile(Vec<Card>),
    /// Replace the shared turn state (also how a turn ends: the payload
    /// carries the next owner and a fresh action budget).
    UpdateTurn(Turn),
    /// Ask the relay for its current deck.
    RequestDeck,
    /// Ask the relay for its current roster.
    RequestPlayerList,
    /// A rent demand — fanned out, answered by each named rentee.
    RentRequest(RentRequest),
    /// One rentee's payment or rejection.
    RentResponse(RentResponse),
    /// A theft demand — fanned out, answered by the named victim.
    TheftRequest(TheftRequest),
    /// The victim's compliance or rejection.
    TheftResponse(TheftResponse),
    /// Lobby signal: clients should open their game connections.
    TimeToConnect,
    /// Lobby signal: the host has started the game.
    LaunchGame,
}

impl Message {
    /// The one-byte kind tag that leads this message on the wire.
    pub fn tag(&self) -> u8 {
        match self {
            Message::UpdatePlayer(_) => TAG_UPDATE_PLAYER,
            Message::UpdatePlayerList(_) => TAG_UPDATE_PLAYER_LIST,
            Message::UpdateDeck(_) => TAG_UPDATE_DECK,
            Message::UpdateDiscardPile(_) => TAG_UPDATE_DISCARD_PILE,
            Message::UpdateTurn(_) => TAG_UPDATE_TURN,
            Message::RequestDeck => TAG_REQUEST_DECK,
            Message::RequestPlayerList => TAG_REQUEST_PLAYER_LIST,
            Message::RentRequest(_) => TAG_RENT_REQUEST,
            Message::RentResponse(_) => TAG_RENT_RESPONSE,
            Message::TheftRequest(_) => TAG_THEFT_REQUEST,
            Message::TheftResponse(_) => TAG_THEFT_RESPONSE,
            Message::TimeToConnect => TAG_TIME_TO_CONNECT,
            Message::LaunchGame => TAG_LAUNCH_GAME,
        }
    }

    /// Encode to tag-prefixed bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u8(self.tag());
        match self {
            Message::UpdatePlayer(player) => put_player(&mut w, player),
            Message::UpdatePlayerList(players) => {
                w.put_u32(players.len() as u32);
                for player in players {
                    put_player(&mut w, player);
                }
            }
            Message::UpdateDeck(cards) | Message::UpdateDiscardPile(cards) => {
                put_cards(&mut w, cards);
            }
            Message::UpdateTurn(turn) => put_turn(&mut w, turn),
            Message::RequestDeck
            | Message::RequestPlayerList
            | Message::TimeToConnect
            | Message::LaunchGame => {}
            Message::RentRequest(req) => {
                w.put_str(&req.renter);
                w.put_u32(req.rentees.len() as u32);
                for rentee in &req.rentees {
                    w.put_str(rentee);
                }
                w.put_i32(req.amount);
                w.put_bool(req.doubled);
            }
            Message::RentResponse(resp) => {
                w.put_str(&resp.renter);
                w.put_str(&resp.rentee);
                put_cards(&mut w, &resp.assets_given);
                w.put_bool(resp.accepted);
            }
            Message::TheftRequest(req) => {
                w.put_str(&req.thief);
                w.put_str(&req.victim);
                w.put_i32(i32::from(req.action.ordinal()));
                match &req.card_to_give {
                    Some(card) => put_card(&mut w, card),
                    None => put_card(&mut w, &sentinel_card()),
                }
                put_cards(&mut w, &req.cards_to_take);
            }
            Message::TheftResponse(resp) => {
                w.put_str(&resp.thief);
                w.put_str(&resp.victim);
                w.put_bool(resp.accepted);
            }
        }
        w.into_bytes()
    }

    /// Decode a tag-prefixed payload. The entire buffer must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes);
        let tag = r.u8()?;
        let message = match tag {
            TAG_UPDATE_PLAYER => Message::UpdatePlayer(read_player(&mut r)?),
            TAG_UPDATE_PLAYER_LIST => {
                let count = r.len()?;
                let mut players = Vec::with_capacity(count);
                for _ in 0..count {
                    players.push(read_player(&mut r)?);
                }
                Message::UpdatePlayerList(players)
            }
            TAG_UPDATE_DECK => Message::UpdateDeck(read_cards(&mut r)?),
            TAG_UPDATE_DISCARD_PILE => Message::UpdateDiscardPile(read_cards(&mut r)?),
            TAG_UPDATE_TURN => Message::UpdateTurn(read_turn(&mut r)?),
            TAG_REQUEST_DECK => Message::RequestDeck,
            TAG_REQUEST_PLAYER_LIST => Message::RequestPlayerList,
            TAG_RENT_REQUEST => {
                let renter = r.str()?;
                let count = r.len()?;
                let mut rentees = Vec::with_capacity(count);
                for _ in 0..count {
                    rentees.push(r.str()?);
                }
                Message::RentRequest(RentRequest {
                    renter,
                    rentees,
                    amount: r.i32()?,
                    doubled: r.bool()?,
                })
            }
            TAG_RENT_RESPONSE => Message::RentResponse(RentResponse {
                renter: r.str()?,
                rentee: r.str()?,
                assets_given: read_cards(&mut r)?,
                accepted: r.bool()?,
            }),
            TAG_THEFT_REQUEST => {
                let thief = r.str()?;
                let victim = r.str()?;
                let action = read_theft_action(&mut r)?;
                let given = read_card(&mut r)?;
                let card_to_give = if given.name.is_empty() { None } else { Some(given) };
                Message::TheftRequest(TheftRequest {
                    thief,
                    victim,
                    action,
                    card_to_give,
                    cards_to_take: read_cards(&mut r)?,
                })
            }
            TAG_THEFT_RESPONSE => Message::TheftResponse(TheftResponse {
                thief: r.str()?,
                victim: r.str()?,
                accepted: r.bool()?,
            }),
            TAG_TIME_TO_CONNECT => Message::TimeToConnect,
            TAG_LAUNCH_GAME => Message::LaunchGame,
            other => return Err(DecodeError::UnknownTag(other)),
        };
        r.finish()?;
        Ok(message)
    }
}

// ---------------------------------------------------------------------------
// Domain-type encodings
// ---------------------------------------------------------------------------

/// The "no card" placeholder used where the wire format requires a card.
fn sentinel_card() -> Card {
    Card {
        id: CardId(u32::MAX),
        name: String::new(),
        kind: CardKind::Money,
        value: 0,
        color: PropertyColor::None,
        alt_color: PropertyColor::None,
        image_path: String::new(),
        sound_path: String::new(),
        action: None,
        flipped: false,
    }
}

fn put_card(w: &mut Writer, card: &Card) {
    w.put_str(&card.name);
    w.put_u8(card.kind.ordinal());
    w.put_i32(card.value);
    w.put_u8(card.color.ordinal());
    w.put_u8(card.alt_color.ordinal());
    w.put_str(&card.image_path);
    w.put_str(&card.sound_path);
    w.put_i32(card.action.map_or(-1, |a| i32::from(a.ordinal())));
    w.put_u32(card.id.0);
    w.put_bool(card.flipped);
}

fn read_card(r: &mut Reader<'_>) -> Result<Card, DecodeError> {
    let name = r.str()?;
    let kind_byte = r.u8()?;
    let kind = CardKind::from_ordinal(kind_byte).ok_or(DecodeError::UnknownOrdinal {
        what: "card kind",
        value: i64::from(kind_byte),
    })?;
    let value = r.i32()?;
    let color = read_color(r)?;
    let alt_color = read_color(r)?;
    let image_path = r.str()?;
    let sound_path = r.str()?;
    let action = read_action_id(r)?;
    let id = CardId(r.u32()?);
    let flipped = r.bool()?;
    Ok(Card {
        id,
        name,
        kind,
        value,
        color,
        alt_color,
        image_path,
        sound_path,
        action,
        flipped,
    })
}

fn read_color(r: &mut Reader<'_>) -> Result<PropertyColor, DecodeError> {
    let byte = r.u8()?;
    PropertyColor::from_ordinal(byte).ok_or(DecodeError::UnknownOrdinal {
        what: "property color",
        value: i64::from(byte),
    })
}

/// Action id: -1 means "not an action card", otherwise an `ActionKind`
/// ordinal.
fn read_action_id(r: &mut Reader<'_>) -> Result<Option<ActionKind>, DecodeError> {
    let id = r.i32()?;
    if id == -1 {
        return Ok(None);
    }
    u8::try_from(id)
        .ok()
        .and_then(ActionKind::from_ordinal)
        .map(Some)
        .ok_or(DecodeError::UnknownOrdinal {
            what: "action id",
            value: i64::from(id),
        })
}

/// A theft request's action must itself be a theft kind.
fn read_theft_action(r: &mut Reader<'_>) -> Result<ActionKind, DecodeError> {
    let id = r.i32()?;
    u8::try_from(id)
        .ok()
        .and_then(ActionKind::from_ordinal)
        .filter(|kind| kind.is_theft())
        .ok_or(DecodeError::UnknownOrdinal {
            what: "theft action id",
            value: i64::from(id),
        })
}

fn put_cards(w: &mut Writer, cards: &[Card]) {
    w.put_u32(cards.len() as u32);
    for card in cards {
        put_card(w, card);
    }
}

fn read_cards(r: &mut Reader<'_>) -> Result<Vec<Card>, DecodeError> {
    let count = r.len()?;
    let mut cards = Vec::with_capacity(count);
    for _ in 0..count {
        cards.push(read_card(r)?);
    }
    Ok(cards)
}

fn put_player(w: &mut Writer, player: &Player) {
    w.put_str(&player.name);
    w.put_u32(player.in_play.len() as u32);
    for group in &player.in_play {
        put_cards(w, group);
    }
    put_cards(w, &player.hand);
}

fn read_player(r: &mut Reader<'_>) -> Result<Player, DecodeError> {
    let name = r.str()?;
    let group_count = r.len()?;
    let mut in_play = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        in_play.push(read_cards(r)?);
    }
    let hand = read_cards(r)?;
    Ok(Player {
        name,
        hand,
        in_play,
    })
}

fn put_turn(w: &mut Writer, turn: &Turn) {
    w.put_u32(turn.current_owner);
    w.put_u32(turn.actions_remaining);
    w.put_bool(turn.game_over);
}

fn read_turn(r: &mut Reader<'_>) -> Result<Turn, DecodeError> {
    Ok(Turn {
        current_owner: r.u32()?,
        actions_remaining: r.u32()?,
        game_over: r.bool()?,
    })
}
