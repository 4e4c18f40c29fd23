// Player state: hand and play area.
//
// A player's `in_play` is a list of card groups. Group 0 is always the money
// pile — everything in it counts only as currency, regardless of printed
// kind (this is how "played as money" is modeled; see `card.rs`). Groups 1
// and up are property sets: each holds properties of one color, plus wild
// properties and any enhancements (House/Hotel) attached to the set.
//
// The player's `name` is the correlation key for every protocol message —
// rent and theft requests and responses all identify parties by name, so
// names must be unique within a game.
//
// Monopoly rule: a property group is a monopoly iff its property-card count
// (enhancements excluded) equals the per-color requirement from `GameConfig`.
// Groups whose color cannot be determined (only wild cards) never complete.
//
// See also: `rules.rs` for rent computation, payment checks, and the
// asset-placement rules used when cards change owners.

use crate::card::{ActionKind, Card, CardId, PropertyColor};
use crate::config::GameConfig;
use serde::{Deserialize, Serialize};

/// Index of the money pile within `Player::in_play`.
pub const MONEY_PILE: usize = 0;

/// One player's complete visible and hidden card state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hand: Vec<Card>,
    /// Group 0 is the money pile; groups >= 1 are property sets.
    pub in_play: Vec<Vec<Card>>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            in_play: vec![Vec::new()],
        }
    }

    pub fn money_pile(&self) -> &[Card] {
        &self.in_play[MONEY_PILE]
    }

    /// Property groups with their `in_play` indices (money pile excluded).
    pub fn property_groups(&self) -> impl Iterator<Item = (usize, &Vec<Card>)> {
        self.in_play.iter().enumerate().skip(1)
    }

    /// Total value of everything in play — the ceiling on what this player
    /// can be made to pay. A player with zero total assets owes nothing.
    pub fn total_asset_value(&self) -> i32 {
        self.in_play
            .iter()
            .flatten()
            .map(|card| card.value)
            .sum()
    }

    /// True if any property set holds at least one property card.
    pub fn has_property(&self) -> bool {
        self.property_groups()
            .any(|(_, group)| group.iter().any(Card::is_property))
    }

    /// Indices of property groups that are complete monopolies.
    pub fn monopoly_groups(&self, config: &GameConfig) -> Vec<usize> {
        self.property_groups()
            .filter(|(_, group)| is_monopoly(group, config))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn has_monopoly(&self, config: &GameConfig) -> bool {
        self.property_groups()
            .any(|(_, group)| is_monopoly(group, config))
    }

    /// Remove a card from the hand by id.
    pub fn take_from_hand(&mut self, id: CardId) -> Option<Card> {
        let pos = self.hand.iter().position(|card| card.id == id)?;
        Some(self.hand.remove(pos))
    }

    /// Remove a card from wherever it sits in the play area. Property groups
    /// left empty are dropped (the money pile always remains).
    pub fn take_from_play(&mut self, id: CardId) -> Option<Card> {
        let (group_idx, pos) = self.in_play.iter().enumerate().find_map(|(gi, group)| {
            group
                .iter()
                .position(|card| card.id == id)
                .map(|pos| (gi, pos))
        })?;
        let card = self.in_play[group_idx].remove(pos);
        if group_idx != MONEY_PILE && self.in_play[group_idx].is_empty() {
            self.in_play.remove(group_idx);
        }
        Some(card)
    }

    /// Remove and return an entire property group (Dealbreaker).
    pub fn take_group(&mut self, index: usize) -> Vec<Card> {
        if index == MONEY_PILE || index >= self.in_play.len() {
            return Vec::new();
        }
        self.in_play.remove(index)
    }

    /// First hand card of the given action sub-kind, if any.
    pub fn hand_action(&self, kind: ActionKind) -> Option<&Card> {
        self.hand.iter().find(|card| card.is_action(kind))
    }

    pub fn holds_action(&self, kind: ActionKind) -> bool {
        self.hand_action(kind).is_some()
    }

    /// Put a card into the money pile.
    pub fn place_as_money(&mut self, card: Card) {
        self.in_play[MONEY_PILE].push(card);
    }

    /// Place a property card: merged into the first group of its active
    /// color, or — for a fully wild card — the first property group at all.
    /// Opens a new group when nothing matches.
    pub fn place_property(&mut self, card: Card) {
        let color = card.active_color();
        let target = self
            .in_play
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, group)| {
                if color == PropertyColor::Wild {
                    true
                } else {
                    group_color(group) == color || group_color(group) == PropertyColor::Wild
                }
            })
            .map(|(idx, _)| idx);
        match target {
            Some(idx) => self.in_play[idx].push(card),
            None => self.in_play.push(vec![card]),
        }
    }

    /// Append a whole group (a stolen monopoly arrives intact).
    pub fn place_group(&mut self, cards: Vec<Card>) {
        if !cards.is_empty() {
            self.in_play.push(cards);
        }
    }
}

/// The color a property group counts as: the active color of its first
/// non-wild property. Groups holding only wild cards report `Wild`.
pub fn group_color(group: &[Card]) -> PropertyColor {
    group
        .iter()
        .filter(|card| card.is_property())
        .map(Card::active_color)
        .find(|color| *color != PropertyColor::Wild)
        .unwrap_or(PropertyColor::Wild)
}

/// Property-card count, enhancements excluded.
pub fn property_count(group: &[Card]) -> usize {
    group.iter().filter(|card| card.is_property()).count()
}

/// A group is a monopoly iff its property count equals the color's
/// requirement. Wild-only groups have no determinable requirement and never
/// qualify.
pub fn is_monopoly(group: &[Card], config: &GameConfig) -> bool {
    let color = group_color(group);
    let required = config.monopoly_size(color);
    required > 0 && property_count(group) as u32 == required
}
