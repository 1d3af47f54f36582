//! # Cricket Session Client
//!
//! Real-time session core for the hand-cricket multiplayer game client.
//!
//! The crate owns the single room connection, decodes the server's pushed
//! frames, derives the screen the player should see, runs the advisory
//! countdowns and celebration effects, and makes sure at most one action
//! leaves the client per decision point.
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement [`Transport`] and [`Connector`] for any backend
//! - **Wire-compatible**: protocol types match the game server's JSON frames
//! - **WebSocket built-in**: the default `transport-websocket` feature provides
//!   `WebSocketTransport` and `WebSocketConnector`
//! - **Deterministic core**: [`MatchSession`] is synchronous and takes the
//!   current instant as input, so every timer can be tested without sleeping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "transport-websocket")]
//! # async fn run() -> Result<(), cricket_session_client::CricketError> {
//! use cricket_session_client::{ClientConfig, ClientEvent, CricketClient, Session};
//!
//! let (client, mut events) = CricketClient::start_websocket(ClientConfig::new("ws://localhost:8000"));
//! client.login(Session::new("eyJhbGciOi...", "asha"))?;
//! client.enter_room("AB12CD")?;
//!
//! while let Some(event) = events.recv().await {
//!     if let ClientEvent::ScreenChanged { to, .. } = event {
//!         println!("now showing {to}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod close_codes;
pub mod countdown;
pub mod decoder;
pub mod effects;
pub mod error;
pub mod event;
pub mod gate;
pub mod notice;
pub mod protocol;
pub mod screen;
pub mod session;
pub mod timers;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{ClientConfig, CricketClient, RoomSettings, Session};
pub use close_codes::CloseCode;
pub use error::CricketError;
pub use event::ClientEvent;
pub use gate::GateRejection;
pub use protocol::{ClientAction, ServerMessage};
pub use screen::{ScreenKind, ScreenState};
pub use session::{MatchSession, SessionTimings, SessionView};
pub use transport::{Connector, Transport};

#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
