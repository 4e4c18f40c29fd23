// CLI entry point for the Property Tycoon multiplayer relay.
//
// Starts a standalone relay server that game clients connect to. The relay
// routes messages between clients and remembers the shared state — it never
// runs any game logic. See `server.rs` for the networking architecture and
// `session.rs` for the routing rules.
//
// Usage:
//   relay [OPTIONS]
//     --port <PORT>           Listen port (default: 7878)
//     --max-players <N>       Max players (default: 5)

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tycoon_relay::server::{RelayConfig, start_relay};

fn main() {
    let config = parse_args();

    let (handle, addr) = match start_relay(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to start relay: {e}");
            std::process::exit(1);
        }
    };

    println!("Relay listening on {addr}");
    println!("Press Ctrl+C to stop.");

    // The process exits on SIGINT/SIGTERM by default, which is fine for a
    // relay; the loop exists so the handle stays alive.
    let running = Arc::new(AtomicBool::new(true));
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    handle.stop();
}

/// Parse command-line arguments into a `RelayConfig`. Uses simple
/// `std::env::args()` matching — no clap dependency.
fn parse_args() -> RelayConfig {
    let mut config = RelayConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                config.port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                });
            }
            "--max-players" => {
                i += 1;
                config.max_players =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--max-players requires a valid number");
                        std::process::exit(1);
                    });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn print_usage() {
    println!("Usage: relay [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --port <PORT>           Listen port (default: 7878)");
    println!("  --max-players <N>       Max players (default: 5)");
    println!("  --help, -h              Show this help");
}
