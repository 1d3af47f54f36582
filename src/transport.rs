//! Transport abstraction for the room socket.
//!
//! The [`Transport`] trait defines a bidirectional text frame channel between
//! the client and the game server. Every frame is one JSON object, so a
//! transport implementation only has to preserve message boundaries.
//!
//! The [`Connector`] trait opens a transport for a `(room_id, token)` pair.
//! The channel manager owns one connector for its whole lifetime and asks it
//! for a fresh transport every time the room identifier changes.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use cricket_session_client::error::CricketError;
//! use cricket_session_client::transport::{Transport, TransportFrame};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, frame: String) -> Result<(), CricketError> {
//!         // Send the JSON text frame over your transport
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<TransportFrame, CricketError>> {
//!         // Receive the next text frame, or the close frame
//!         // Return None when the stream ended without a close frame
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), CricketError> {
//!         // Gracefully shut down the connection
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::CricketError;

/// Close frame details reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// Numeric close code (see [`crate::close_codes`]).
    pub code: u16,
    /// Human-readable reason supplied by the server.
    pub reason: String,
}

/// One item read from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFrame {
    /// A complete text frame.
    Text(String),
    /// The peer closed the connection. `None` when the close frame carried no code.
    Close(Option<CloseInfo>),
}

/// A bidirectional text frame transport for a single room connection.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is used
/// inside `tokio::select!`. If `recv` is cancelled before completion, calling it
/// again must not lose data. Channel-based implementations (e.g., wrapping
/// `mpsc::Receiver`) are naturally cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send one JSON text frame to the server.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::TransportSend`] if the frame could not be sent.
    async fn send(&mut self, frame: String) -> Result<(), CricketError>;

    /// Receive the next frame from the server.
    ///
    /// Returns:
    /// - `Some(Ok(TransportFrame::Text(_)))`: a complete frame was received
    /// - `Some(Ok(TransportFrame::Close(_)))`: the server sent a close frame
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the stream ended without a close frame
    ///
    /// # Cancel Safety
    ///
    /// This method **MUST** be cancel-safe (see [trait documentation](Transport)).
    async fn recv(&mut self) -> Option<Result<TransportFrame, CricketError>>;

    /// Close the transport connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the graceful shutdown fails. Implementations should
    /// still release resources even if the close handshake fails.
    async fn close(&mut self) -> Result<(), CricketError>;
}

/// Opens room transports.
///
/// Connection parameters other than the room and token (server address, TLS,
/// headers) belong to the connector itself.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The transport produced by this connector.
    type Transport: Transport;

    /// Open a connection to `room_id`, authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection cannot be established.
    async fn connect(&self, room_id: &str, token: &str) -> Result<Self::Transport, CricketError>;
}
