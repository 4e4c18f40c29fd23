// Test-only game client for multiplayer integration tests.
//
// Wraps a real `GameSession` (from `tycoon_client`) behind a synchronous,
// test-friendly API for exercising the full multiplayer pipeline:
// connect → relay → launch → play → counter-play → verify state. The only
// test-specific code here is `BotDecisions` (a scripted `Decisions`
// implementation) and the blocking wait helpers; all networking and game
// logic uses the same code paths as the real game.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use tycoon_client::hooks::{CounterContext, Decisions, TheftPlan};
use tycoon_client::session::GameSession;
use tycoon_engine::{ActionKind, Card, CardId, CardKind, GameConfig, Player, PropertyColor};

/// Default timeout for blocking wait operations.
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep duration between wait attempts.
const WAIT_INTERVAL: Duration = Duration::from_millis(10);

/// Scripted decisions for a test bot. Everything defaults to the cautious
/// path; scenarios flip exactly the switches they exercise.
#[derive(Default)]
pub struct BotDecisions {
    /// Play a held Just Say No against incoming rent/theft demands.
    pub counter_demands: bool,
    /// Counter rejections of our own demands with a held Just Say No.
    pub counter_rejections: bool,
    /// Consume a held Double The Rent when offered.
    pub double: bool,
    /// The plan returned for the next theft play.
    pub theft_plan: Mutex<Option<TheftPlan>>,
}

impl Decisions for BotDecisions {
    fn double_rent(&self, _amount: i32) -> bool {
        self.double
    }

    fn use_just_say_no(&self, context: CounterContext<'_>) -> bool {
        match context {
            CounterContext::RentDemand { .. } | CounterContext::TheftDemand { .. } => {
                self.counter_demands
            }
            CounterContext::RentRejection { .. } | CounterContext::TheftRejection { .. } => {
                self.counter_rejections
            }
        }
    }

    fn plan_theft(
        &self,
        _action: ActionKind,
        _me: &Player,
        _opponents: &[Player],
    ) -> Option<TheftPlan> {
        self.theft_plan.lock().unwrap().clone()
    }
}

/// A test game client wrapping a real `GameSession`.
pub struct TestGameClient {
    pub session: GameSession,
    name: String,
}

impl TestGameClient {
    /// Connect to a relay with the standard config and the given bot.
    pub fn connect(addr: &str, name: &str, bot: BotDecisions) -> Self {
        let session = GameSession::connect(addr, name, GameConfig::standard(), Box::new(bot))
            .expect("TestGameClient::connect failed");
        Self {
            session,
            name: name.to_string(),
        }
    }

    /// Replace our own player state and broadcast it. Scenarios use this to
    /// put exact cards in exact places.
    pub fn publish(&self, player: Player) {
        self.session.publish_player(player).expect("publish failed");
    }

    /// Our own player as the session currently sees it.
    pub fn me(&self) -> Player {
        self.session.me().expect("own player missing from roster")
    }

    /// Another player as the session currently sees them.
    pub fn view_of(&self, name: &str) -> Player {
        self.wait_for(&format!("roster entry for {name}"), |c| {
            c.session.roster().into_iter().find(|p| p.name == name)
        })
    }

    /// Block until `probe` yields a value.
    pub fn wait_for<T>(&self, what: &str, probe: impl Fn(&Self) -> Option<T>) -> T {
        let start = Instant::now();
        loop {
            if let Some(value) = probe(self) {
                return value;
            }
            assert!(
                start.elapsed() < WAIT_TIMEOUT,
                "{}: timed out waiting for {what}",
                self.name
            );
            thread::sleep(WAIT_INTERVAL);
        }
    }

    pub fn wait_roster_len(&self, n: usize) {
        self.wait_for(&format!("roster of {n}"), |c| {
            (c.session.roster().len() == n).then_some(())
        });
    }

    pub fn wait_launched(&self) {
        self.wait_for("launch", |c| c.session.is_launched().then_some(()));
    }

    pub fn wait_my_turn(&self) {
        self.wait_for("own turn", |c| c.session.is_my_turn().then_some(()));
    }

    /// Block until our view of `owner` shows `id` somewhere on their table.
    pub fn wait_card_on_table(&self, owner: &str, id: CardId) {
        self.wait_for(&format!("card {id} on {owner}'s table"), |c| {
            c.session
                .roster()
                .iter()
                .find(|p| p.name == owner)
                .is_some_and(|p| p.in_play.iter().flatten().any(|card| card.id == id))
                .then_some(())
        });
    }

    /// Block until our view of `owner` shows `id` in their hand.
    pub fn wait_card_in_hand(&self, owner: &str, id: CardId) {
        self.wait_for(&format!("card {id} in {owner}'s hand"), |c| {
            c.session
                .roster()
                .iter()
                .find(|p| p.name == owner)
                .is_some_and(|p| p.hand.iter().any(|card| card.id == id))
                .then_some(())
        });
    }
}

// ---------------------------------------------------------------------------
// Card constructors for scripted scenarios
// ---------------------------------------------------------------------------

pub fn money_card(id: u32, value: i32) -> Card {
    Card {
        id: CardId(id),
        name: format!("{value}M"),
        kind: CardKind::Money,
        value,
        color: PropertyColor::None,
        alt_color: PropertyColor::None,
        image_path: String::new(),
        sound_path: String::new(),
        action: None,
        flipped: false,
    }
}

pub fn property_card(id: u32, name: &str, color: PropertyColor, value: i32) -> Card {
    Card {
        id: CardId(id),
        name: name.into(),
        kind: CardKind::Property,
        value,
        color,
        alt_color: PropertyColor::None,
        image_path: String::new(),
        sound_path: String::new(),
        action: None,
        flipped: false,
    }
}

/// A property-rent card targeting `color` (Wild rents anything).
pub fn rent_card(id: u32, color: PropertyColor) -> Card {
    Card {
        id: CardId(id),
        name: "Rent".into(),
        kind: CardKind::Action,
        value: 1,
        color,
        alt_color: PropertyColor::None,
        image_path: String::new(),
        sound_path: String::new(),
        action: Some(ActionKind::Rent),
        flipped: false,
    }
}

pub fn action_card(id: u32, name: &str, kind: ActionKind, value: i32) -> Card {
    Card {
        id: CardId(id),
        name: name.into(),
        kind: CardKind::Action,
        value,
        color: PropertyColor::None,
        alt_color: PropertyColor::None,
        image_path: String::new(),
        sound_path: String::new(),
        action: Some(kind),
        flipped: false,
    }
}
