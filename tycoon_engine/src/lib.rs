// tycoon_engine — game rules and domain model for Tycoon.
//
// This crate is the pure core of the game: card identities, player state,
// deck handling, the turn/action budget, and the rule checks that every
// client runs before (and after) the network protocols fire. It performs no
// I/O and knows nothing about the wire format or the relay — the protocol
// crate encodes these types, and the client crate drives them.
//
// Module overview:
// - `card.rs`:     `Card`, `CardId`, and the kind/color/action enums with
//                  their stable wire ordinals.
// - `player.rs`:   Hand and play-area model (money pile + property groups),
//                  monopoly detection.
// - `deck.rs`:     Card-set construction from config, draw deck with
//                  discard-pile reshuffling.
// - `turn.rs`:     Turn ownership and the per-turn action budget.
// - `config.rs`:   `GameConfig` — all tunables and the card-definition
//                  table, JSON-loadable, with a built-in standard set.
// - `rules.rs`:    Pure rule functions: rent amounts, theft preconditions,
//                  payment checks, asset placement.
// - `requests.rs`: Transient rent/theft request and response objects.
// - `rng.rs`:      Deterministic xoshiro256++ PRNG for shuffling.
//
// **Critical constraint: determinism.** Clients independently apply the same
// rules to the same broadcast state; everything here must be a pure function
// of (state, config), and shuffles draw only from `GameRng`.

pub mod card;
pub mod config;
pub mod deck;
pub mod player;
pub mod requests;
pub mod rng;
pub mod rules;
pub mod turn;

pub use card::{ActionKind, Card, CardId, CardKind, PropertyColor};
pub use config::{CardSpec, GameConfig};
pub use deck::{Deck, build_card_set};
pub use player::{MONEY_PILE, Player, group_color, is_monopoly, property_count};
pub use requests::{RentRequest, RentResponse, TheftRequest, TheftResponse};
pub use rng::GameRng;
pub use turn::Turn;
