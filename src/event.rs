//! Notifications delivered to the embedding application.
//!
//! The client loop emits [`ClientEvent`]s on the bounded channel returned by
//! [`CricketClient::start`](crate::CricketClient::start). They describe what
//! changed; the full current state is always available from
//! [`CricketClient::view`](crate::CricketClient::view).

use crate::effects::EffectKind;
use crate::gate::GateRejection;
use crate::notice::BannerKind;
use crate::protocol::ClientAction;
use crate::screen::ScreenKind;

/// Events emitted by the client loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The room connection is open.
    ConnectionOpened { room_id: String },
    /// The active screen changed kind.
    ScreenChanged { from: ScreenKind, to: ScreenKind },
    /// A banner was raised.
    Banner { kind: BannerKind, text: String },
    /// A ball-result effect started.
    Effect { kind: EffectKind },
    /// A user action was refused locally and not sent.
    ActionRejected {
        action: ClientAction,
        reason: GateRejection,
    },
    /// The server does not know the room. The client is back on the Home screen.
    RoomNotFound { reason: String },
    /// The room connection ended without invalidating the session.
    ConnectionLost {
        code: Option<u16>,
        reason: Option<String>,
    },
    /// The session was invalidated (by the server or by `logout`).
    LoggedOut,
    /// A finished tournament was persisted; the embedding app may route to it.
    TournamentRecorded { tournament_id: String },
    /// The client loop exited. Always the last event.
    Stopped,
}
