// Data-driven game configuration.
//
// All tunable rule parameters live in `GameConfig`, loadable from JSON at
// startup. The rules code never uses magic numbers — rent amounts, monopoly
// sizes, draw counts, and flat-fee demands all read from the config. This
// enables balance iteration without recompilation, and every client in a game
// must use the same config for the clients' rule checks to agree.
//
// The card-definition table (`cards`) is the single source for building the
// full card set at game start: each `CardSpec` entry names a card, its printed
// kind, value, color pair, action sub-kind, and how many copies exist. See
// `deck.rs` for `build_card_set`, which assigns sequential `CardId`s in table
// order.
//
// `GameConfig::standard()` is the built-in full set; `from_json` loads a
// custom one.

use crate::card::{ActionKind, CardKind, PropertyColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the card-definition table. `count` copies of this card are
/// created when the set is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardSpec {
    pub name: String,
    pub kind: CardKind,
    pub value: i32,
    pub color: PropertyColor,
    pub alt_color: PropertyColor,
    pub action: Option<ActionKind>,
    pub count: u32,
}

/// Complete rule configuration for one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Actions granted at the start of each turn.
    pub actions_per_turn: u32,
    /// Maximum hand size allowed when ending a turn.
    pub hand_limit: usize,
    /// Cards drawn at the start of a normal turn.
    pub draw_per_turn: usize,
    /// Cards drawn instead when the owner's hand is empty.
    pub draw_on_empty_hand: usize,
    /// Cards drawn by playing a Pass Go card.
    pub pass_go_draw: usize,
    /// Flat fee demanded by a Birthday card (per target).
    pub birthday_amount: i32,
    /// Flat fee demanded by a Debt Collector card.
    pub debt_amount: i32,
    /// Rent added by a House on a monopoly.
    pub house_rent_bonus: i32,
    /// Rent added by a Hotel on a monopoly.
    pub hotel_rent_bonus: i32,
    /// Property-card count required for a monopoly, per color.
    pub monopoly_sizes: BTreeMap<PropertyColor, u32>,
    /// Rent owed per color, indexed by property count - 1.
    pub rent_table: BTreeMap<PropertyColor, Vec<i32>>,
    /// The card-definition table.
    pub cards: Vec<CardSpec>,
}

impl GameConfig {
    /// Load a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize to JSON (pretty, for writing a template config file).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Required property count for a monopoly of `color`. Zero for colors
    /// missing from the table (wild-only groups can never complete).
    pub fn monopoly_size(&self, color: PropertyColor) -> u32 {
        self.monopoly_sizes.get(&color).copied().unwrap_or(0)
    }

    /// Rent owed by a group of `color` holding `count` properties. Counts
    /// beyond the table's last entry clamp to the full-set rent.
    pub fn rent_for(&self, color: PropertyColor, count: usize) -> i32 {
        let Some(table) = self.rent_table.get(&color) else {
            return 0;
        };
        if count == 0 || table.is_empty() {
            return 0;
        }
        let idx = (count - 1).min(table.len() - 1);
        table[idx]
    }

    /// The built-in standard card set and rule constants.
    pub fn standard() -> Self {
        use ActionKind::*;
        use PropertyColor::*;

        let mut monopoly_sizes = BTreeMap::new();
        let mut rent_table = BTreeMap::new();
        for (color, size, rents) in [
            (Brown, 2, vec![1, 2]),
            (LightBlue, 3, vec![1, 2, 3]),
            (Pink, 3, vec![1, 2, 4]),
            (Orange, 3, vec![1, 3, 5]),
            (Red, 3, vec![2, 3, 6]),
            (Yellow, 3, vec![2, 4, 6]),
            (Green, 3, vec![2, 4, 7]),
            (DarkBlue, 2, vec![3, 8]),
            (Railroad, 4, vec![1, 2, 3, 4]),
            (Utility, 2, vec![1, 2]),
        ] {
            monopoly_sizes.insert(color, size);
            rent_table.insert(color, rents);
        }

        let mut cards = Vec::new();
        let mut money = |name: &str, value: i32, count: u32| {
            cards.push(CardSpec {
                name: name.into(),
                kind: CardKind::Money,
                value,
                color: None,
                alt_color: None,
                action: Option::None,
                count,
            });
        };
        money("1M", 1, 6);
        money("2M", 2, 5);
        money("3M", 3, 3);
        money("4M", 4, 3);
        money("5M", 5, 2);
        money("10M", 10, 1);

        let mut property = |name: &str, value: i32, color: PropertyColor, count: u32| {
            cards.push(CardSpec {
                name: name.into(),
                kind: CardKind::Property,
                value,
                color,
                alt_color: None,
                action: Option::None,
                count,
            });
        };
        property("Brown Property", 1, Brown, 2);
        property("Light Blue Property", 1, LightBlue, 3);
        property("Pink Property", 2, Pink, 3);
        property("Orange Property", 2, Orange, 3);
        property("Red Property", 3, Red, 3);
        property("Yellow Property", 3, Yellow, 3);
        property("Green Property", 4, Green, 3);
        property("Dark Blue Property", 4, DarkBlue, 2);
        property("Railroad", 2, Railroad, 4);
        property("Utility", 2, Utility, 2);

        let mut dual = |name: &str, value: i32, a: PropertyColor, b: PropertyColor, count: u32| {
            cards.push(CardSpec {
                name: name.into(),
                kind: CardKind::Property,
                value,
                color: a,
                alt_color: b,
                action: Option::None,
                count,
            });
        };
        dual("Dark Blue/Green Property", 4, DarkBlue, Green, 1);
        dual("Light Blue/Brown Property", 1, LightBlue, Brown, 1);
        dual("Light Blue/Railroad Property", 4, LightBlue, Railroad, 1);
        dual("Pink/Orange Property", 2, Pink, Orange, 2);
        dual("Railroad/Green Property", 4, Railroad, Green, 1);
        dual("Railroad/Utility Property", 2, Railroad, Utility, 1);
        dual("Red/Yellow Property", 3, Red, Yellow, 2);
        cards.push(CardSpec {
            name: "Wild Property".into(),
            kind: CardKind::Property,
            value: 0,
            color: Wild,
            alt_color: None,
            action: Option::None,
            count: 2,
        });

        let mut action = |name: &str, value: i32, kind: ActionKind, count: u32| {
            cards.push(CardSpec {
                name: name.into(),
                kind: CardKind::Action,
                value,
                color: None,
                alt_color: None,
                action: Some(kind),
                count,
            });
        };
        action("Deal Breaker", 5, Dealbreaker, 2);
        action("Just Say No", 4, JustSayNo, 3);
        action("Pass Go", 1, PassGo, 10);
        action("Forced Deal", 3, ForcedDeal, 3);
        action("Sly Deal", 3, SlyDeal, 3);
        action("Debt Collector", 3, DebtCollector, 3);
        action("It's My Birthday", 2, Birthday, 3);
        action("Double The Rent", 1, DoubleRent, 2);

        // Houses and hotels are enhancements: they sit in property groups and
        // raise that group's rent, but never count toward a monopoly.
        for (name, value, kind, count) in [("House", 3, House, 3), ("Hotel", 4, Hotel, 2)] {
            cards.push(CardSpec {
                name: name.into(),
                kind: CardKind::Enhancement,
                value,
                color: None,
                alt_color: None,
                action: Some(kind),
                count,
            });
        }

        // Rent cards: the color pair on the card selects which groups it can
        // charge. The wild rent matches every color.
        let mut rent = |name: &str, a: PropertyColor, b: PropertyColor, value: i32, count: u32| {
            cards.push(CardSpec {
                name: name.into(),
                kind: CardKind::Action,
                value,
                color: a,
                alt_color: b,
                action: Some(Rent),
                count,
            });
        };
        rent("Wild Rent", Wild, None, 3, 3);
        rent("Green/Dark Blue Rent", Green, DarkBlue, 1, 2);
        rent("Brown/Light Blue Rent", Brown, LightBlue, 1, 2);
        rent("Pink/Orange Rent", Pink, Orange, 1, 2);
        rent("Railroad/Utility Rent", Railroad, Utility, 1, 2);
        rent("Red/Yellow Rent", Red, Yellow, 1, 2);

        Self {
            actions_per_turn: 3,
            hand_limit: 7,
            draw_per_turn: 2,
            draw_on_empty_hand: 5,
            pass_go_draw: 2,
            birthday_amount: 2,
            debt_amount: 5,
            house_rent_bonus: 3,
            hotel_rent_bonus: 4,
            monopoly_sizes,
            rent_table,
            cards,
        }
    }
}
