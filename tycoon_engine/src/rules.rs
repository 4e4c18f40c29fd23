// Pure rule checks shared by every client.
//
// Everything here is a function of player state and config — no I/O, no
// shared mutability. The client protocol code (rent and theft state
// machines) calls these before any message is sent, so an illegal play is
// cancelled locally: nothing hits the network and no action is spent.
//
// See also: `player.rs` for the group model these functions inspect,
// `config.rs` for the rent and monopoly tables.

use crate::card::{ActionKind, Card, PropertyColor};
use crate::config::GameConfig;
use crate::player::{Player, group_color, property_count};

/// Rent demanded by playing `card` from `renter`'s position.
///
/// For a rent card: the maximum over the renter's property groups whose
/// color the card can charge, each worth `rent_table[color][count]` plus
/// House/Hotel bonuses for enhancements sitting in the group. For the
/// flat-fee demands (Birthday, Debt Collector) the config constant.
///
/// `None` means the play is invalid from this position (a rent card with no
/// matching group, or a card that is not rent-like) — cancel locally.
pub fn rent_amount(renter: &Player, card: &Card, config: &GameConfig) -> Option<i32> {
    match card.action {
        Some(ActionKind::Birthday) => Some(config.birthday_amount),
        Some(ActionKind::DebtCollector) => Some(config.debt_amount),
        Some(ActionKind::Rent) => {
            let mut best: Option<i32> = None;
            for (_, group) in renter.property_groups() {
                let color = group_color(group);
                if color == PropertyColor::Wild || !card.rents_color(color) {
                    continue;
                }
                let mut amount = config.rent_for(color, property_count(group));
                for enhancement in group.iter().filter(|c| c.is_enhancement()) {
                    amount += match enhancement.action {
                        Some(ActionKind::House) => config.house_rent_bonus,
                        Some(ActionKind::Hotel) => config.hotel_rent_bonus,
                        _ => 0,
                    };
                }
                best = Some(best.map_or(amount, |b| b.max(amount)));
            }
            best
        }
        _ => None,
    }
}

/// Local precondition for a theft action. Failing it cancels the play with
/// no message sent and no action spent.
pub fn theft_precondition(
    kind: ActionKind,
    thief: &Player,
    victim: &Player,
    config: &GameConfig,
) -> bool {
    match kind {
        ActionKind::SlyDeal => victim.has_property(),
        ActionKind::ForcedDeal => thief.has_property() && victim.has_property(),
        ActionKind::Dealbreaker => victim.has_monopoly(config),
        _ => false,
    }
}

/// Whether a selected payment settles a rent demand. Payment must reach the
/// amount owed, except that a player whose total assets were zero owes
/// nothing (the zero-asset exemption).
pub fn payment_satisfies(payment_value: i32, owed: i32, payer_total_assets: i32) -> bool {
    payment_value >= owed || payer_total_assets == 0
}

/// Merge cards received from another player into `player`'s play area.
///
/// Properties merge via normal placement. An enhancement goes to the
/// receiver's first monopoly group; with no monopoly to sit on it is worth
/// only its cash value and lands in the money pile. Money and action cards
/// received as payment always land in the money pile.
pub fn place_assets(player: &mut Player, cards: Vec<Card>, config: &GameConfig) {
    for card in cards {
        if card.is_property() {
            player.place_property(card);
        } else if card.is_enhancement() {
            match player.monopoly_groups(config).first().copied() {
                Some(idx) => player.in_play[idx].push(card),
                None => player.place_as_money(card),
            }
        } else {
            player.place_as_money(card);
        }
    }
}
