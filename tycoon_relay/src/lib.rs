// tycoon_relay — multiplayer relay server for Property Tycoon.
//
// The relay is a thin message broker: it accepts TCP connections from game
// clients, keeps the authoritative player roster and the last-seen shared
// piles, and fans every game message out to the other clients. It never
// applies a single game rule — all play validation, rent arithmetic, and
// turn advancement happens on the clients.
//
// Module overview:
// - `session.rs`:  Session state — connection registry, player roster,
//                  mirrored deck/discard/turn, and the per-message routing
//                  rules. The core data structure that `server.rs` drives.
// - `server.rs`:   TCP listener, reader threads (one per client), and the
//                  main event loop. Uses `std::net` with a thread-per-reader
//                  architecture and an `mpsc` channel to funnel events into
//                  the single-threaded `Session`.
// - `client.rs`:   `NetClient`, the client-side connection used by the game
//                  session crate and the integration tests.
//
// Dependencies: `tycoon_protocol` (shared message types and framing) and
// `tycoon_engine` (the domain types those messages carry).
//
// The relay can run as a standalone binary (`main.rs`) or be embedded in a
// game process via the library API (`start_relay`).

pub mod client;
pub mod server;
pub mod session;

pub use client::NetClient;
pub use server::{RelayConfig, RelayHandle, start_relay};
