//! # Console Match Example
//!
//! Plays a hand-cricket room from the terminal:
//!
//! 1. Log in with a token obtained from the game server's login endpoint
//! 2. Enter a room over WebSocket
//! 3. Print screen changes, banners and effects as they happen
//! 4. Send actions typed on stdin
//! 5. Shut down gracefully on `quit`, Ctrl+C or when the session ends
//!
//! ## Running
//!
//! ```sh
//! CRICKET_TOKEN=eyJhbGciOi... CRICKET_ROOM=AB12CD cargo run --example console_match
//!
//! # Override the server URL and display name:
//! CRICKET_SERVER_URL=ws://my-server:8000 CRICKET_USER=asha \
//!     CRICKET_TOKEN=... CRICKET_ROOM=AB12CD cargo run --example console_match
//! ```
//!
//! ## Commands
//!
//! `0`-`6` play a ball, `heads`/`tails` call the toss, `bat`/`bowl` choose
//! after winning it, `batter <name>`/`bowler <name>` pick as captain,
//! `start`, `cpu`, `cancel`, `lobby`, `standings` and `quit`.

use cricket_session_client::protocol::{TossCall, TossChoice};
use cricket_session_client::{ClientConfig, ClientEvent, CricketClient, ScreenKind, Session};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Default server URL when `CRICKET_SERVER_URL` is not set.
const DEFAULT_URL: &str = "ws://localhost:8000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("CRICKET_SERVER_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let token = std::env::var("CRICKET_TOKEN")?;
    let room = std::env::var("CRICKET_ROOM")?;
    let user = std::env::var("CRICKET_USER").unwrap_or_else(|_| "player".to_string());
    tracing::info!("Joining room {room} on {url} as {user}");

    // ── Connect ─────────────────────────────────────────────────────
    let (mut client, mut event_rx) = CricketClient::start_websocket(ClientConfig::new(url));
    client.login(Session::new(token, user))?;
    client.enter_room(room)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // ── Event loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    tracing::info!("Event channel closed, exiting");
                    break;
                };
                match event {
                    ClientEvent::ConnectionOpened { room_id } => {
                        println!("connected to room {room_id}");
                    }
                    ClientEvent::ScreenChanged { to, .. } => {
                        println!("── {to} ──");
                        if to == ScreenKind::Game {
                            if let Some(snapshot) = client.current_view().screen.match_snapshot() {
                                println!(
                                    "{}/{} after {} overs, you are {:?}",
                                    snapshot.total_runs, snapshot.wickets, snapshot.overs, snapshot.my_role
                                );
                            }
                        }
                    }
                    ClientEvent::Banner { text, .. } => println!("! {text}"),
                    ClientEvent::Effect { kind } => println!("* {kind:?}"),
                    ClientEvent::ActionRejected { reason, .. } => println!("not sent: {reason}"),
                    ClientEvent::RoomNotFound { reason } => {
                        println!("room not found: {reason}");
                        break;
                    }
                    ClientEvent::ConnectionLost { code, reason } => {
                        println!("connection lost ({code:?}): {}", reason.unwrap_or_default());
                    }
                    ClientEvent::LoggedOut => {
                        println!("session expired, log in again");
                        break;
                    }
                    ClientEvent::TournamentRecorded { tournament_id } => {
                        println!("tournament saved as {tournament_id}");
                    }
                    ClientEvent::Stopped => break,
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut words = line.split_whitespace();
                let result = match (words.next(), words.next()) {
                    (Some("quit"), _) => break,
                    (Some(n), None) if n.len() == 1 && n.as_bytes().first().is_some_and(u8::is_ascii_digit) => {
                        client.submit_move(n.parse()?)
                    }
                    (Some("heads"), _) => client.toss_call(TossCall::Heads),
                    (Some("tails"), _) => client.toss_call(TossCall::Tails),
                    (Some("bat"), _) => client.toss_choice(TossChoice::Bat),
                    (Some("bowl"), _) => client.toss_choice(TossChoice::Bowl),
                    (Some("batter"), Some(name)) => client.pick_batter(name),
                    (Some("bowler"), Some(name)) => client.pick_bowler(name),
                    (Some("start"), _) => client.start_match(),
                    (Some("cpu"), _) => client.add_cpu(),
                    (Some("cancel"), _) => client.cancel_match(),
                    (Some("lobby"), _) => client.back_to_lobby(),
                    (Some("standings"), _) => client.view_standings(),
                    _ => {
                        println!("unknown command: {line}");
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    tracing::error!("command failed: {e}");
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    // ── Shutdown ────────────────────────────────────────────────────
    client.shutdown().await;
    tracing::info!("Client shut down");
    Ok(())
}
