// tycoon_client — client-side game session for Property Tycoon.
//
// Everything above the wire sits here: the local mirror of the shared
// table, the turn/action-budget gating, and the two multi-round
// counter-play protocols (rent collection and property theft) with their
// Just Say No arbitration. The relay never applies a rule; this crate is
// where the game actually happens.
//
// Module overview:
// - `state.rs`:   `TableState`, the local mirror of roster/deck/discard/
//                 turn, guarded by the session's single mutex.
// - `hooks.rs`:   The UI seams — the `Decisions` trait for choices the
//                 session cannot make alone, and `SessionEvent` for
//                 notifications.
// - `pending.rs`: Blocking rendezvous (mutex + condvar) for in-flight rent
//                 and theft demands, with cancellation and the fatal
//                 unexpected-response rule.
// - `session.rs`: `GameSession` — connection lifecycle, dispatch thread,
//                 `play_card`/`end_turn`, turn-start draws, launch.
// - `rent.rs`:    Renter and rentee sides of the rent protocol.
// - `theft.rs`:   Thief and victim sides of the theft protocol.
//
// Threading contract: rent and theft plays block the calling thread until
// the exchange settles; the dispatch thread both answers incoming demands
// and resolves our own. `Decisions` implementations are called from either
// thread and must not call back into the session.

pub mod hooks;
pub mod pending;
pub mod rent;
pub mod session;
pub mod state;
pub mod theft;

pub use hooks::{CounterContext, Decisions, SessionEvent, TheftPlan, greedy_payment};
pub use pending::{ProtocolError, RentRendezvous, TheftRendezvous};
pub use session::{GameSession, PlayOutcome, SessionError};
pub use state::TableState;
