// Deck, discard pile, and card-set construction.
//
// `build_card_set` turns the config's card-definition table into the fixed
// full card set, assigning sequential `CardId`s in table order. That set is
// built exactly once per game; afterwards cards are only relocated between
// the deck, the discard pile, players' hands, and players' play areas —
// never created or destroyed. `Deck::draw` pulls from the front; when the
// deck runs dry, `draw` reshuffles the discard pile into a new deck using
// the deterministic `GameRng`.
//
// Image and sound paths are derived from the card name here so every copy
// of a card renders identically on every client.

use crate::card::{Card, CardId};
use crate::config::GameConfig;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// Build the full card set from the config's card table. Ids are assigned
/// sequentially so the set is identical on every client.
pub fn build_card_set(config: &GameConfig) -> Vec<Card> {
    let mut cards = Vec::new();
    let mut next_id = 0u32;
    for spec in &config.cards {
        let slug = slugify(&spec.name);
        for _ in 0..spec.count {
            cards.push(Card {
                id: CardId(next_id),
                name: spec.name.clone(),
                kind: spec.kind,
                value: spec.value,
                color: spec.color,
                alt_color: spec.alt_color,
                image_path: format!("art/{slug}.png"),
                sound_path: format!("audio/{slug}.ogg"),
                action: spec.action,
                flipped: false,
            });
            next_id += 1;
        }
    }
    cards
}

fn slugify(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' => Some(c),
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            ' ' | '/' | '-' => Some('_'),
            _ => None,
        })
        .collect()
}

/// The draw deck. Ordered; cards leave from the front.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Build, shuffle, and return the starting deck for a game.
    pub fn shuffled(config: &GameConfig, rng: &mut GameRng) -> Self {
        let mut cards = build_card_set(config);
        rng.shuffle(&mut cards);
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    /// Draw one card. When the deck is empty, the discard pile is shuffled
    /// into a fresh deck first. Returns `None` only when both are empty.
    pub fn draw(&mut self, discard: &mut Vec<Card>, rng: &mut GameRng) -> Option<Card> {
        if self.cards.is_empty() {
            if discard.is_empty() {
                return None;
            }
            self.cards = std::mem::take(discard);
            rng.shuffle(&mut self.cards);
        }
        Some(self.cards.remove(0))
    }
}
