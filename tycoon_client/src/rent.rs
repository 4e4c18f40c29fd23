// The rent collection protocol.
//
// Renter side (`collect`, called from `play_card` on the caller's thread):
// compute the amount, optionally double it, pick the targets, discard the
// card, send one `RentRequest`, and block on the rendezvous until every
// rentee has answered. Buffered payments merge into our play area only when
// the counter converges to zero.
//
// Rentee side (`handle_request`, dispatch thread): offered a Just Say No if
// one is in hand; otherwise pays with chosen table cards, or nothing when
// broke (the zero-asset exemption).
//
// Renter side again (`handle_response`, dispatch thread): a payment buffers
// and decrements the counter. A rejection may be countered with our own
// Just Say No — the demand is re-sent to that one rentee and the counter
// re-incremented before the rejection resolves, so the waiting thread never
// wakes mid-round. Each Just Say No is discarded on use, which bounds the
// rounds.

use tycoon_engine::{ActionKind, RentRequest, RentResponse, rules};
use tycoon_protocol::message::Message;

use crate::hooks::{CounterContext, SessionEvent, greedy_payment};
use crate::session::{
    PlayOutcome, SessionError, Shared, fatal, lock, play_just_say_no, publish_discard,
    publish_self, spend_action,
};

/// Play a rent-like card. Blocks until the demand settles.
pub(crate) fn collect(
    shared: &Shared,
    card: &tycoon_engine::Card,
) -> Result<PlayOutcome, SessionError> {
    let Some(kind) = card.action else {
        return Ok(PlayOutcome::Cancelled);
    };

    let (request, actions_spent) = {
        let mut state = lock(&shared.state);
        let me = state.player(&shared.name).ok_or(SessionError::NotJoined)?;

        // A property-rent card with no matching group cancels locally.
        let Some(mut amount) = rules::rent_amount(me, card, &shared.config) else {
            return Ok(PlayOutcome::Cancelled);
        };

        let opponents = state.opponents(&shared.name);
        if opponents.is_empty() {
            return Ok(PlayOutcome::Cancelled);
        }
        let rentees = match kind {
            ActionKind::Birthday | ActionKind::DebtCollector => {
                match shared.decisions.pick_rent_target(&opponents) {
                    Some(target) if opponents.contains(&target) => vec![target],
                    _ => return Ok(PlayOutcome::Cancelled),
                }
            }
            _ => opponents,
        };

        // Doubling costs an extra action, so it needs two in the budget.
        let mut doubled = false;
        let mut actions_spent = 1;
        if state.turn.actions_remaining >= 2 {
            let doubler = state
                .player(&shared.name)
                .and_then(|p| p.hand_action(ActionKind::DoubleRent))
                .map(|c| c.id);
            if let Some(id) = doubler {
                if shared.decisions.double_rent(amount) {
                    if let Some(consumed) = state
                        .player_mut(&shared.name)
                        .and_then(|p| p.take_from_hand(id))
                    {
                        state.discard.push(consumed);
                    }
                    amount *= 2;
                    doubled = true;
                    actions_spent = 2;
                }
            }
        }

        // The rent card itself goes to the discard pile.
        let played = state
            .player_mut(&shared.name)
            .and_then(|p| p.take_from_hand(card.id))
            .ok_or(SessionError::CardNotInHand(card.id))?;
        state.discard.push(played);

        let request = RentRequest {
            renter: shared.name.clone(),
            rentees,
            amount,
            doubled,
        };
        shared.rent.begin(request.clone());

        publish_self(shared, &state)?;
        publish_discard(shared, &state)?;
        (request, actions_spent)
    };

    shared.send(&Message::RentRequest(request))?;

    // Rendezvous: the dispatch thread resolves responses until the
    // outstanding counter converges to zero. No lock is held here.
    let collected = shared.rent.wait()?;

    let mut state = lock(&shared.state);
    if let Some(me) = state.player_mut(&shared.name) {
        rules::place_assets(me, collected.clone(), &shared.config);
    }
    publish_self(shared, &state)?;
    spend_action(shared, &mut state, actions_spent);
    shared.emit(SessionEvent::RentSettled { collected });
    Ok(PlayOutcome::Played)
}

/// A rent demand arrived; answer it if it names us.
pub(crate) fn handle_request(shared: &Shared, request: &RentRequest) {
    if request.renter == shared.name || !request.rentees.iter().any(|r| r == &shared.name) {
        return;
    }
    shared.emit(SessionEvent::RentRequested {
        renter: request.renter.clone(),
        amount: request.amount,
    });

    let mut state = lock(&shared.state);

    // Just Say No beats paying, if we hold one and want to.
    let holds_jsn = state
        .player(&shared.name)
        .is_some_and(|p| p.holds_action(ActionKind::JustSayNo));
    if holds_jsn
        && shared.decisions.use_just_say_no(CounterContext::RentDemand {
            renter: &request.renter,
            amount: request.amount,
        })
        && play_just_say_no(shared, &mut state)
    {
        let _ = shared.send(&Message::RentResponse(RentResponse {
            renter: request.renter.clone(),
            rentee: shared.name.clone(),
            assets_given: Vec::new(),
            accepted: false,
        }));
        shared.emit(SessionEvent::RentAnswered {
            renter: request.renter.clone(),
            accepted: false,
        });
        return;
    }

    // Pay. A selection that falls short of the demand is replaced with a
    // greedy sufficient one; a broke player legally pays nothing.
    let Some(me) = state.player(&shared.name) else {
        return;
    };
    let total_assets = me.total_asset_value();
    let mut chosen = shared.decisions.choose_rent_payment(request.amount, me);
    let chosen_value: i32 = me
        .in_play
        .iter()
        .flatten()
        .filter(|c| chosen.contains(&c.id))
        .map(|c| c.value)
        .sum();
    if !rules::payment_satisfies(chosen_value, request.amount, total_assets) {
        chosen = greedy_payment(request.amount, me);
    }

    let mut assets = Vec::new();
    if let Some(me) = state.player_mut(&shared.name) {
        for id in chosen {
            if let Some(card) = me.take_from_play(id) {
                assets.push(card);
            }
        }
    }
    let _ = publish_self(shared, &state);
    let _ = shared.send(&Message::RentResponse(RentResponse {
        renter: request.renter.clone(),
        rentee: shared.name.clone(),
        assets_given: assets,
        accepted: true,
    }));
    shared.emit(SessionEvent::RentAnswered {
        renter: request.renter.clone(),
        accepted: true,
    });
}

/// A rent response arrived; resolve it if the demand is ours.
pub(crate) fn handle_response(shared: &Shared, response: RentResponse) {
    if response.renter != shared.name {
        return;
    }

    if !response.accepted {
        // A rejection may be countered: discard our own Just Say No,
        // re-demand from that one rentee, and re-increment the counter
        // before the rejection itself resolves.
        let countered = {
            let mut state = lock(&shared.state);
            let holds_jsn = state
                .player(&shared.name)
                .is_some_and(|p| p.holds_action(ActionKind::JustSayNo));
            holds_jsn
                && shared
                    .decisions
                    .use_just_say_no(CounterContext::RentRejection {
                        rentee: &response.rentee,
                    })
                && play_just_say_no(shared, &mut state)
        };
        if countered {
            if let Some(original) = shared.rent.request() {
                let scoped = RentRequest {
                    rentees: vec![response.rentee.clone()],
                    ..original
                };
                match shared.rent.add_rentee() {
                    Ok(()) => {
                        let _ = shared.send(&Message::RentRequest(scoped));
                    }
                    Err(err) => {
                        fatal(shared, err);
                        return;
                    }
                }
            }
        }
    }

    if let Err(err) = shared.rent.resolve(response.assets_given) {
        fatal(shared, err);
    }
}
