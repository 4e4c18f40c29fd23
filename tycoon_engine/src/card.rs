// Card identity and classification.
//
// A `Card` is the atomic game object. Its `id` is assigned once when the full
// card set is built (see `deck.rs`) and never changes; every other system —
// payment selection, theft transfers, discard bookkeeping — refers to cards
// by `CardId`.
//
// The printed `kind` is immutable. The original game mutated a card's type
// when an action card was played "as money"; here that decision is positional
// instead: a card played as money simply lives in the money pile (group 0 of
// `Player::in_play`), and its printed kind is untouched. This keeps card
// identity unambiguous everywhere else in the system.
//
// Two-color property cards carry both `color` and `alt_color`; `flipped`
// selects which of the two is currently active. Single-color cards have
// `alt_color = None`. The fully wild property card has `color = Wild`.
//
// See also: `player.rs` for play-area grouping, `rules.rs` for how rent
// cards use their own color pair to select rentable groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, globally unique card identifier. Assigned at card-set construction
/// and never reused within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The printed kind of a card. Wire ordinal is the declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardKind {
    Money,
    Property,
    Enhancement,
    Action,
}

impl CardKind {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(b: u8) -> Option<Self> {
        match b {
            0 => Some(CardKind::Money),
            1 => Some(CardKind::Property),
            2 => Some(CardKind::Enhancement),
            3 => Some(CardKind::Action),
            _ => None,
        }
    }
}

/// Property group color. `None` marks non-property cards (and the unused
/// `alt_color` slot of single-color cards); `Wild` matches every color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyColor {
    None,
    Wild,
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
    Railroad,
    Utility,
}

impl PropertyColor {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(b: u8) -> Option<Self> {
        use PropertyColor::*;
        match b {
            0 => Some(None),
            1 => Some(Wild),
            2 => Some(Brown),
            3 => Some(LightBlue),
            4 => Some(Pink),
            5 => Some(Orange),
            6 => Some(Red),
            7 => Some(Yellow),
            8 => Some(Green),
            9 => Some(DarkBlue),
            10 => Some(Railroad),
            11 => Some(Utility),
            _ => Option::None,
        }
    }

    /// The ten real property colors, excluding the `None`/`Wild` sentinels.
    pub const COLORS: [PropertyColor; 10] = [
        PropertyColor::Brown,
        PropertyColor::LightBlue,
        PropertyColor::Pink,
        PropertyColor::Orange,
        PropertyColor::Red,
        PropertyColor::Yellow,
        PropertyColor::Green,
        PropertyColor::DarkBlue,
        PropertyColor::Railroad,
        PropertyColor::Utility,
    ];
}

/// Discriminates the action sub-kind of an action or enhancement card.
///
/// A `Rent` card's rentable colors are its own `color`/`alt_color` fields —
/// the wild rent card has `color = Wild` and matches every group. `Birthday`
/// and `DebtCollector` are flat-fee demands with amounts from `GameConfig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    PassGo,
    DoubleRent,
    JustSayNo,
    House,
    Hotel,
    SlyDeal,
    ForcedDeal,
    Dealbreaker,
    Rent,
    Birthday,
    DebtCollector,
}

impl ActionKind {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(b: u8) -> Option<Self> {
        use ActionKind::*;
        match b {
            0 => Some(PassGo),
            1 => Some(DoubleRent),
            2 => Some(JustSayNo),
            3 => Some(House),
            4 => Some(Hotel),
            5 => Some(SlyDeal),
            6 => Some(ForcedDeal),
            7 => Some(Dealbreaker),
            8 => Some(Rent),
            9 => Some(Birthday),
            10 => Some(DebtCollector),
            _ => None,
        }
    }

    /// True for the three property-theft actions.
    pub fn is_theft(self) -> bool {
        matches!(
            self,
            ActionKind::SlyDeal | ActionKind::ForcedDeal | ActionKind::Dealbreaker
        )
    }

    /// True for the actions that demand money (rent-like cards).
    pub fn is_rent_like(self) -> bool {
        matches!(
            self,
            ActionKind::Rent | ActionKind::Birthday | ActionKind::DebtCollector
        )
    }
}

/// A single game card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    /// Monetary worth when used as currency or counted as an asset.
    pub value: i32,
    pub color: PropertyColor,
    pub alt_color: PropertyColor,
    /// UI artwork path. Carried on the wire so all clients render alike.
    pub image_path: String,
    /// UI sound path, same deal as `image_path`.
    pub sound_path: String,
    pub action: Option<ActionKind>,
    /// Swaps `color`/`alt_color` for two-color property cards.
    pub flipped: bool,
}

impl Card {
    /// The color this card currently counts as, honoring `flipped`.
    pub fn active_color(&self) -> PropertyColor {
        if self.flipped { self.alt_color } else { self.color }
    }

    /// The color on the card's other face.
    pub fn inactive_color(&self) -> PropertyColor {
        if self.flipped { self.color } else { self.alt_color }
    }

    pub fn is_property(&self) -> bool {
        self.kind == CardKind::Property
    }

    pub fn is_enhancement(&self) -> bool {
        self.kind == CardKind::Enhancement
    }

    /// True if this is an action card of the given sub-kind.
    pub fn is_action(&self, kind: ActionKind) -> bool {
        self.kind == CardKind::Action && self.action == Some(kind)
    }

    /// True if the card can rent to a group of `group_color`: a wild rent
    /// card matches everything, otherwise either face must match.
    pub fn rents_color(&self, group_color: PropertyColor) -> bool {
        self.color == PropertyColor::Wild
            || self.color == group_color
            || self.alt_color == group_color
    }
}
