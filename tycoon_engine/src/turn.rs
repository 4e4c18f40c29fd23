// Turn ownership and the per-turn action budget.
//
// `Turn` is a tiny piece of shared state: who owns the turn (a roster index),
// how many actions they have left, and whether the game has ended. It is
// created once at game launch, mutated only by the turn owner's client, and
// rebroadcast through the relay so every client agrees.
//
// Reaching zero actions does not force the turn to end — the owner must end
// it explicitly — but no further action may be initiated. Ending a turn
// requires the owner's hand to be at or under the configured hand limit.

use crate::config::GameConfig;
use serde::{Deserialize, Serialize};

/// Shared turn state, broadcast after every mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Roster index of the current turn owner.
    pub current_owner: u32,
    pub actions_remaining: u32,
    pub game_over: bool,
}

impl Turn {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            current_owner: 0,
            actions_remaining: config.actions_per_turn,
            game_over: false,
        }
    }

    pub fn is_owner(&self, roster_index: usize) -> bool {
        self.current_owner as usize == roster_index
    }

    /// True when the owner may still initiate a play.
    pub fn can_act(&self) -> bool {
        self.actions_remaining > 0 && !self.game_over
    }

    /// Consume one action. Saturates at zero; callers gate on `can_act`.
    pub fn spend_action(&mut self) {
        self.actions_remaining = self.actions_remaining.saturating_sub(1);
    }

    /// Advance ownership to the next player and reset the budget.
    pub fn advance(&mut self, player_count: usize, config: &GameConfig) {
        if player_count > 0 {
            self.current_owner = (self.current_owner + 1) % player_count as u32;
        }
        self.actions_remaining = config.actions_per_turn;
    }
}
