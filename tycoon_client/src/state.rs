// Local mirror of the shared table.
//
// `TableState` holds this client's view of the roster, the draw deck, the
// discard pile, and the turn. The relay's copies are authoritative; ours are
// kept current by the dispatch loop applying every incoming `Update*`
// message. Mutation only ever happens while holding the session's state
// mutex — the dispatch thread and the caller's thread both go through it.

use tycoon_engine::{Card, Deck, GameConfig, GameRng, Player, Turn};

pub struct TableState {
    /// All players in join order. Our own entry is included.
    pub roster: Vec<Player>,
    pub deck: Deck,
    pub discard: Vec<Card>,
    pub turn: Turn,
    /// Set once the host broadcasts `LaunchGame`.
    pub launched: bool,
    /// Used for reshuffling the discard pile into an emptied deck. The
    /// resulting order is broadcast, so clients need not agree on seeds.
    pub(crate) rng: GameRng,
    /// Tracks the owner-transition edge so the turn-start draw fires once.
    pub(crate) was_my_turn: bool,
}

impl TableState {
    pub(crate) fn new(config: &GameConfig, rng_seed: u64) -> Self {
        Self {
            roster: Vec::new(),
            deck: Deck::new(Vec::new()),
            discard: Vec::new(),
            turn: Turn::new(config),
            launched: false,
            rng: GameRng::new(rng_seed),
            was_my_turn: false,
        }
    }

    /// Roster position of the named player.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.roster.iter().position(|p| p.name == name)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.roster.iter().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.roster.iter_mut().find(|p| p.name == name)
    }

    /// Names of every player other than `name`, in roster order.
    pub fn opponents(&self, name: &str) -> Vec<String> {
        self.roster
            .iter()
            .filter(|p| p.name != name)
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn is_turn_of(&self, name: &str) -> bool {
        self.index_of(name).is_some_and(|idx| self.turn.is_owner(idx))
    }
}
