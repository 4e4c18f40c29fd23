// The property theft protocol: Sly Deal, Forced Deal, Dealbreaker.
//
// Thief side (`attempt`, caller's thread): precondition-check the chosen
// victim locally — a failing check cancels with nothing sent and no action
// spent — then discard the action card, send one `TheftRequest`, and block
// until exactly one correlated `TheftResponse` arrives. On acceptance the
// cards change sides; a Dealbreaker's haul lands as a whole new group.
//
// Victim side (`handle_request`, dispatch thread): play a held Just Say No
// or comply, transferring the named cards out and the offered card in.
//
// Thief side again (`handle_response`, dispatch thread): a rejection may be
// countered by discarding our own Just Say No and re-sending the identical
// stored request — the waiter never wakes, the wait simply continues.

use tycoon_engine::{ActionKind, Card, TheftRequest, TheftResponse, rules};
use tycoon_protocol::message::Message;

use crate::hooks::{CounterContext, SessionEvent};
use crate::session::{
    PlayOutcome, SessionError, Shared, fatal, lock, play_just_say_no, publish_discard,
    publish_self, spend_action,
};

/// Play a theft card. Blocks until the victim answers.
pub(crate) fn attempt(
    shared: &Shared,
    card: &Card,
    kind: ActionKind,
) -> Result<PlayOutcome, SessionError> {
    let request = {
        let mut state = lock(&shared.state);
        let me = state.player(&shared.name).ok_or(SessionError::NotJoined)?;

        let opponents: Vec<tycoon_engine::Player> = state
            .roster
            .iter()
            .filter(|p| p.name != shared.name)
            .cloned()
            .collect();
        let Some(plan) = shared.decisions.plan_theft(kind, me, &opponents) else {
            return Ok(PlayOutcome::Cancelled);
        };
        if plan.victim == shared.name {
            return Ok(PlayOutcome::Cancelled);
        }
        let Some(victim) = state.player(&plan.victim) else {
            return Ok(PlayOutcome::Cancelled);
        };
        // Local gate: no message is sent and no action spent on failure.
        if !rules::theft_precondition(kind, me, victim, &shared.config) {
            return Ok(PlayOutcome::Cancelled);
        }

        // Resolve the plan's card ids against the victim's table. A plan
        // naming cards the victim no longer holds cancels.
        let mut cards_to_take = Vec::new();
        for id in &plan.cards_to_take {
            match victim.in_play.iter().flatten().find(|c| c.id == *id) {
                Some(card) => cards_to_take.push(card.clone()),
                None => return Ok(PlayOutcome::Cancelled),
            }
        }
        if cards_to_take.is_empty() {
            return Ok(PlayOutcome::Cancelled);
        }
        let card_to_give = match (kind, plan.card_to_give) {
            (ActionKind::ForcedDeal, Some(id)) => {
                match me.in_play.iter().flatten().find(|c| c.id == id) {
                    Some(card) => Some(card.clone()),
                    None => return Ok(PlayOutcome::Cancelled),
                }
            }
            (ActionKind::ForcedDeal, None) => return Ok(PlayOutcome::Cancelled),
            _ => None,
        };

        let played = state
            .player_mut(&shared.name)
            .and_then(|p| p.take_from_hand(card.id))
            .ok_or(SessionError::CardNotInHand(card.id))?;
        state.discard.push(played);

        let request = TheftRequest {
            thief: shared.name.clone(),
            victim: plan.victim,
            action: kind,
            card_to_give,
            cards_to_take,
        };
        shared.theft.begin(request.clone());

        publish_self(shared, &state)?;
        publish_discard(shared, &state)?;
        request
    };

    shared.send(&Message::TheftRequest(request.clone()))?;

    // Exactly one response settles this; counters re-send without waking
    // us. No lock is held here.
    let accepted = shared.theft.wait()?;

    let mut state = lock(&shared.state);
    if accepted {
        if let Some(me) = state.player_mut(&shared.name) {
            if let Some(given) = &request.card_to_give {
                me.take_from_play(given.id);
            }
            if request.action == ActionKind::Dealbreaker {
                // The monopoly arrives whole, enhancements and all.
                me.place_group(request.cards_to_take.clone());
            } else {
                rules::place_assets(me, request.cards_to_take.clone(), &shared.config);
            }
        }
        publish_self(shared, &state)?;
    }
    // The action card is gone either way.
    spend_action(shared, &mut state, 1);
    shared.emit(SessionEvent::TheftResolved {
        counterpart: request.victim.clone(),
        accepted,
    });
    Ok(PlayOutcome::Played)
}

/// A theft demand arrived; answer it if we are the victim.
pub(crate) fn handle_request(shared: &Shared, request: &TheftRequest) {
    if request.victim != shared.name {
        return;
    }
    shared.emit(SessionEvent::TheftRequested {
        thief: request.thief.clone(),
        action: request.action,
    });

    let mut state = lock(&shared.state);

    let holds_jsn = state
        .player(&shared.name)
        .is_some_and(|p| p.holds_action(ActionKind::JustSayNo));
    if holds_jsn
        && shared
            .decisions
            .use_just_say_no(CounterContext::TheftDemand {
                thief: &request.thief,
                action: request.action,
            })
        && play_just_say_no(shared, &mut state)
    {
        let _ = shared.send(&Message::TheftResponse(TheftResponse {
            thief: request.thief.clone(),
            victim: shared.name.clone(),
            accepted: false,
        }));
        shared.emit(SessionEvent::TheftResolved {
            counterpart: request.thief.clone(),
            accepted: false,
        });
        return;
    }

    // Comply: the named cards leave our table, the offered card joins it.
    if let Some(me) = state.player_mut(&shared.name) {
        for card in &request.cards_to_take {
            me.take_from_play(card.id);
        }
        if let Some(given) = &request.card_to_give {
            me.place_property(given.clone());
        }
    }
    let _ = publish_self(shared, &state);
    let _ = shared.send(&Message::TheftResponse(TheftResponse {
        thief: request.thief.clone(),
        victim: shared.name.clone(),
        accepted: true,
    }));
    shared.emit(SessionEvent::TheftResolved {
        counterpart: request.thief.clone(),
        accepted: true,
    });
}

/// A theft response arrived; settle or counter if the demand is ours.
pub(crate) fn handle_response(shared: &Shared, response: &TheftResponse) {
    if response.thief != shared.name {
        return;
    }

    if !response.accepted {
        let countered = {
            let mut state = lock(&shared.state);
            let holds_jsn = state
                .player(&shared.name)
                .is_some_and(|p| p.holds_action(ActionKind::JustSayNo));
            holds_jsn
                && shared
                    .decisions
                    .use_just_say_no(CounterContext::TheftRejection {
                        victim: &response.victim,
                    })
                && play_just_say_no(shared, &mut state)
        };
        if countered {
            // Re-send the identical stored request; the wait continues.
            if let Some(request) = shared.theft.request() {
                let _ = shared.send(&Message::TheftRequest(request));
                return;
            }
        }
    }

    if let Err(err) = shared.theft.resolve(response.accepted) {
        fatal(shared, err);
    }
}
