// UI-facing seams: decision callbacks and session events.
//
// The session core never talks to a screen. Everything a human (or a bot)
// must decide mid-protocol goes through the `Decisions` trait, called
// synchronously from whichever thread needs the answer — including the
// dispatch thread, so implementations must not call back into the session.
// Everything the UI merely needs to know about arrives as a `SessionEvent`
// drained from the session's event channel.

use std::cmp::Reverse;

use tycoon_engine::{ActionKind, Card, CardId, Player, Turn};

/// What a Just Say No would be countering.
#[derive(Clone, Copy, Debug)]
pub enum CounterContext<'a> {
    /// A rent demand naming us as rentee.
    RentDemand { renter: &'a str, amount: i32 },
    /// A rentee rejected our rent demand; countering re-demands from them.
    RentRejection { rentee: &'a str },
    /// A theft demand naming us as victim.
    TheftDemand { thief: &'a str, action: ActionKind },
    /// The victim rejected our theft; countering re-sends the demand.
    TheftRejection { victim: &'a str },
}

/// The victim and cards for a theft play, chosen before anything is sent.
#[derive(Clone, Debug)]
pub struct TheftPlan {
    pub victim: String,
    /// For Sly Deal / Forced Deal: exactly one property. For Dealbreaker:
    /// every card of one monopoly group, enhancements included.
    pub cards_to_take: Vec<CardId>,
    /// Forced Deal only: the property offered in exchange.
    pub card_to_give: Option<CardId>,
}

/// Decisions the session cannot make on its own. Defaults give a cautious
/// player: never double, never counter, pay with the cheapest sufficient
/// assets, steal nothing.
pub trait Decisions: Send + Sync {
    /// Offer to consume a held Double The Rent card (costs an extra action).
    fn double_rent(&self, _amount: i32) -> bool {
        false
    }

    /// Pick the single target of a flat-fee demand (Birthday, Debt
    /// Collector). `None` cancels the play.
    fn pick_rent_target(&self, opponents: &[String]) -> Option<String> {
        opponents.first().cloned()
    }

    /// Choose table cards covering `owed`. Selections that fall short are
    /// replaced by `greedy_payment`.
    fn choose_rent_payment(&self, owed: i32, table: &Player) -> Vec<CardId> {
        greedy_payment(owed, table)
    }

    /// Offer to play a held Just Say No. Only consulted when one is in hand.
    fn use_just_say_no(&self, _context: CounterContext<'_>) -> bool {
        false
    }

    /// Choose the victim and cards for a theft card. `None` cancels the
    /// play.
    fn plan_theft(
        &self,
        _action: ActionKind,
        _me: &Player,
        _opponents: &[Player],
    ) -> Option<TheftPlan> {
        None
    }
}

/// Cover a demand with money first, then properties, largest values first.
/// Returns an empty selection for a player with no assets (the zero-asset
/// exemption makes that a legal payment).
pub fn greedy_payment(owed: i32, table: &Player) -> Vec<CardId> {
    let mut money: Vec<&Card> = table.money_pile().iter().collect();
    money.sort_by_key(|c| Reverse(c.value));
    let mut properties: Vec<&Card> = table
        .property_groups()
        .flat_map(|(_, group)| group.iter())
        .collect();
    properties.sort_by_key(|c| Reverse(c.value));

    let mut picked = Vec::new();
    let mut total = 0;
    for card in money.into_iter().chain(properties) {
        if total >= owed {
            break;
        }
        total += card.value;
        picked.push(card.id);
    }
    picked
}

/// Notifications delivered to the UI over the session's event channel.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The relay broadcast a new roster.
    RosterChanged,
    /// The turn state changed (owner, budget, or game over).
    TurnChanged(Turn),
    /// The host told lobby clients to open their game connections.
    ConnectPrompted,
    /// The game has been launched.
    GameLaunched,
    /// We drew cards at turn start or from a Pass Go.
    CardsDrawn(usize),
    /// Someone demanded rent from us.
    RentRequested { renter: String, amount: i32 },
    /// We answered a rent demand (paid or rejected it).
    RentAnswered { renter: String, accepted: bool },
    /// Our own rent demand settled; `collected` is everything received.
    RentSettled { collected: Vec<Card> },
    /// Someone is trying to steal from us.
    TheftRequested { thief: String, action: ActionKind },
    /// A theft involving us finished, either way.
    TheftResolved { counterpart: String, accepted: bool },
    /// The relay connection is gone; outstanding waits were cancelled.
    Disconnected,
    /// A protocol invariant was violated. The session is unusable.
    Fatal(String),
}
