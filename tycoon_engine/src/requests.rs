// Transient demand/response value objects for the counter-play protocols.
//
// These are created at send time, travel through the relay, and are consumed
// once a terminal response is processed — they are never persisted. All
// correlation is by player name plus message kind: the transport provides no
// request/response pairing of its own.
//
// `TheftRequest::card_to_give` is `Option<Card>` here; on the wire the
// "no card" case is an empty-name sentinel card (see the protocol crate).

use crate::card::{ActionKind, Card};
use serde::{Deserialize, Serialize};

/// A rent demand from one renter to one or more rentees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RentRequest {
    pub renter: String,
    /// Snapshot of the targeted players' names at send time.
    pub rentees: Vec<String>,
    pub amount: i32,
    pub doubled: bool,
}

/// One rentee's answer to a rent demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RentResponse {
    pub renter: String,
    pub rentee: String,
    /// Payment cards, removed from the rentee's play area. Empty when the
    /// deal was rejected or the rentee had nothing to pay with.
    pub assets_given: Vec<Card>,
    /// False means a Just Say No was played against the demand.
    pub accepted: bool,
}

/// A property-theft demand (Sly Deal, Forced Deal, or Dealbreaker).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TheftRequest {
    pub thief: String,
    pub victim: String,
    /// One of `SlyDeal`, `ForcedDeal`, `Dealbreaker`.
    pub action: ActionKind,
    /// The property offered in exchange (Forced Deal only).
    pub card_to_give: Option<Card>,
    /// The properties demanded: one card, or a whole monopoly group for
    /// Dealbreaker.
    pub cards_to_take: Vec<Card>,
}

/// The victim's answer to a theft demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TheftResponse {
    pub thief: String,
    pub victim: String,
    /// False means a Just Say No was played against the demand.
    pub accepted: bool,
}
