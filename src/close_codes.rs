//! Connection close codes used by the game server.
//!
//! The server closes a room connection with an application-level code in the
//! `4000..=4999` range when it refuses or replaces a session. The client maps
//! each code to a [`CloseDisposition`] that decides how far the failure
//! propagates: only an invalid session escalates to a global logout.

use std::fmt;

/// Normal closure (RFC 6455).
pub const NORMAL: u16 = 1000;
/// Endpoint going away (RFC 6455).
pub const GOING_AWAY: u16 = 1001;
/// The same user connected again from another session.
pub const REPLACED: u16 = 4000;
/// The token was invalid or expired.
pub const INVALID_SESSION: u16 = 4001;
/// The room does not exist (typically after a server restart).
pub const ROOM_NOT_FOUND: u16 = 4004;

/// Close codes with a defined meaning for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// `1000` or `1001`: an orderly shutdown.
    Normal(u16),
    /// `4000`: superseded by a newer connection of the same user.
    Replaced,
    /// `4001`: the session token is no longer valid.
    InvalidSession,
    /// `4004`: the requested room is unknown to the server.
    RoomNotFound,
    /// Any other code.
    Other(u16),
}

/// How the client reacts to a closed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDisposition {
    /// Clear session, connection and screen state.
    ForceLogout,
    /// Surface the server's reason and return to the Home screen.
    RoomNotFound,
    /// Surface a generic connectivity banner; the session survives.
    Connectivity,
    /// Nothing to report.
    Quiet,
}

impl CloseCode {
    /// Classify a raw close code.
    pub fn from_code(code: u16) -> Self {
        match code {
            NORMAL | GOING_AWAY => Self::Normal(code),
            REPLACED => Self::Replaced,
            INVALID_SESSION => Self::InvalidSession,
            ROOM_NOT_FOUND => Self::RoomNotFound,
            other => Self::Other(other),
        }
    }

    /// The numeric value sent on the wire.
    pub fn code(&self) -> u16 {
        match self {
            Self::Normal(code) | Self::Other(code) => *code,
            Self::Replaced => REPLACED,
            Self::InvalidSession => INVALID_SESSION,
            Self::RoomNotFound => ROOM_NOT_FOUND,
        }
    }

    /// The client reaction for this code.
    pub fn disposition(&self) -> CloseDisposition {
        match self {
            Self::Normal(_) => CloseDisposition::Quiet,
            Self::InvalidSession => CloseDisposition::ForceLogout,
            Self::RoomNotFound => CloseDisposition::RoomNotFound,
            Self::Replaced | Self::Other(_) => CloseDisposition::Connectivity,
        }
    }

    /// Returns a human-readable description of this close code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal(_) => "The connection was closed normally.",
            Self::Replaced => {
                "This room was opened from another session. Only one session per player is kept."
            }
            Self::InvalidSession => "Your session is invalid or has expired. Please log in again.",
            Self::RoomNotFound => {
                "The room could not be found. The server may have restarted or the code is wrong."
            }
            Self::Other(_) => "Lost connection to the game server.",
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Disposition for a connection that ended without a close frame.
///
/// A dropped stream carries no code and is always a connectivity failure.
pub fn disposition_for(code: Option<u16>) -> CloseDisposition {
    code.map_or(CloseDisposition::Connectivity, |c| {
        CloseCode::from_code(c).disposition()
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_dispositions() {
        assert_eq!(
            CloseCode::from_code(4001).disposition(),
            CloseDisposition::ForceLogout
        );
        assert_eq!(
            CloseCode::from_code(4004).disposition(),
            CloseDisposition::RoomNotFound
        );
        assert_eq!(
            CloseCode::from_code(4000).disposition(),
            CloseDisposition::Connectivity
        );
        assert_eq!(
            CloseCode::from_code(1000).disposition(),
            CloseDisposition::Quiet
        );
        assert_eq!(
            CloseCode::from_code(1011).disposition(),
            CloseDisposition::Connectivity
        );
    }

    #[test]
    fn code_round_trips_through_classification() {
        for raw in [1000, 1001, 1006, 4000, 4001, 4004, 4999] {
            assert_eq!(CloseCode::from_code(raw).code(), raw);
        }
    }

    #[test]
    fn missing_code_is_a_connectivity_failure() {
        assert_eq!(disposition_for(None), CloseDisposition::Connectivity);
        assert_eq!(disposition_for(Some(4001)), CloseDisposition::ForceLogout);
    }

    #[test]
    fn display_includes_numeric_code() {
        let text = CloseCode::RoomNotFound.to_string();
        assert!(text.contains("4004"));
        assert!(text.contains("room"));
    }
}
