//! Error types for the cricket session client.

use thiserror::Error;

/// Errors that can occur when using the cricket session client.
#[derive(Debug, Error)]
pub enum CricketError {
    /// Failed to send a frame through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a frame from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was already closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// The client event loop has stopped.
    #[error("client is not running")]
    NotRunning,

    /// Attempted to enter a room without a logged-in session.
    #[error("no active session; log in first")]
    NotLoggedIn,

    /// The room identifier cannot be used in a connection URL.
    #[error("invalid room id: {0:?}")]
    InvalidRoom(String),

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

/// A specialized [`Result`] type for cricket session client operations.
pub type Result<T> = std::result::Result<T, CricketError>;
