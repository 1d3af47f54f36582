//! Channel manager: at most one room connection at a time.
//!
//! [`ChannelManager`] owns a [`Connector`] and a single long-lived event
//! channel. Each call to [`open`](ChannelManager::open) for a new room tears
//! down the current connection, bumps the connection epoch and spawns a
//! connection task that tags everything it reports with that epoch. Events
//! from an older epoch are discarded by [`accept`](ChannelManager::accept),
//! so nothing a torn-down connection says can reach the session.
//!
//! The consumer of the event channel never changes across connections; only
//! the room identifier decides when a connection is created or destroyed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::protocol::ClientAction;
use crate::transport::{Connector, Transport, TransportFrame};

/// Lifecycle of the room connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection.
    #[default]
    Absent,
    /// A connection attempt is in progress.
    Connecting,
    /// Frames flow both ways.
    Open,
    /// The connection ended. `code` is `None` when no close frame arrived.
    Closed {
        code: Option<u16>,
        reason: Option<String>,
    },
}

impl ConnectionState {
    /// Returns `true` while connecting or open.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

/// What a connection task reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEventKind {
    /// The transport is connected.
    Opened,
    /// One inbound text frame.
    Frame(String),
    /// The connection ended or never opened.
    Closed {
        code: Option<u16>,
        reason: Option<String>,
    },
}

/// A report from the connection task of one epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub epoch: u64,
    pub kind: ChannelEventKind,
}

/// Owns the room connection.
pub struct ChannelManager<C: Connector> {
    connector: Arc<C>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    epoch: u64,
    room_id: Option<String>,
    state: ConnectionState,
    outbound: Option<mpsc::UnboundedSender<String>>,
    task: Option<JoinHandle<()>>,
}

impl<C: Connector> ChannelManager<C> {
    /// Create a manager and the receiver its connections report to.
    pub fn new(connector: C) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let manager = Self {
            connector: Arc::new(connector),
            events,
            epoch: 0,
            room_id: None,
            state: ConnectionState::Absent,
            outbound: None,
            task: None,
        };
        (manager, events_rx)
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Current connection epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Connect to `room_id`. Returns `false` if a live connection to the same
    /// room already exists and nothing was done.
    pub fn open(&mut self, room_id: &str, token: &str) -> bool {
        if self.room_id.as_deref() == Some(room_id) && self.state.is_live() {
            debug!(room_id = %room_id, "already connected to room");
            return false;
        }
        self.close();

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        info!(room_id = %room_id, epoch = self.epoch, "opening room connection");
        self.task = Some(tokio::spawn(connection_task(
            Arc::clone(&self.connector),
            room_id.to_string(),
            token.to_string(),
            self.epoch,
            self.events.clone(),
            outbound_rx,
        )));
        self.outbound = Some(outbound);
        self.room_id = Some(room_id.to_string());
        self.state = ConnectionState::Connecting;
        true
    }

    /// Tear down the connection, if any. Anything it reported but the
    /// session has not yet consumed becomes stale.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.room_id.take().is_some() {
            debug!(epoch = self.epoch, "room connection torn down");
        }
        self.outbound = None;
        self.state = ConnectionState::Absent;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Send an action. Dropped (not queued) unless the connection is open.
    pub fn send(&self, action: &ClientAction) -> bool {
        let (ConnectionState::Open, Some(outbound)) = (&self.state, self.outbound.as_ref()) else {
            debug!(?action, state = ?self.state, "connection not open, dropping action");
            return false;
        };
        match serde_json::to_string(action) {
            Ok(json) => outbound.send(json).is_ok(),
            Err(e) => {
                error!("failed to serialize ClientAction: {e}");
                false
            }
        }
    }

    /// Filter an event through the current epoch and update the connection
    /// state. Returns `None` for stale events.
    pub fn accept(&mut self, event: ChannelEvent) -> Option<ChannelEventKind> {
        if event.epoch != self.epoch {
            debug!(
                stale = event.epoch,
                current = self.epoch,
                "discarding event from a torn-down connection"
            );
            return None;
        }
        match &event.kind {
            ChannelEventKind::Opened => self.state = ConnectionState::Open,
            ChannelEventKind::Frame(_) => {}
            ChannelEventKind::Closed { code, reason } => {
                self.state = ConnectionState::Closed {
                    code: *code,
                    reason: reason.clone(),
                };
                self.outbound = None;
                self.task = None;
            }
        }
        Some(event.kind)
    }
}

impl<C: Connector> std::fmt::Debug for ChannelManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelManager")
            .field("epoch", &self.epoch)
            .field("room_id", &self.room_id)
            .field("state", &self.state)
            .finish()
    }
}

impl<C: Connector> Drop for ChannelManager<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Connection task ─────────────────────────────────────────────────

/// Connects, then multiplexes outbound frames and inbound frames until the
/// connection ends or the manager drops the outbound sender.
async fn connection_task<C: Connector>(
    connector: Arc<C>,
    room_id: String,
    token: String,
    epoch: u64,
    events: mpsc::UnboundedSender<ChannelEvent>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let report = |kind: ChannelEventKind| {
        if events.send(ChannelEvent { epoch, kind }).is_err() {
            debug!("channel event receiver dropped");
        }
    };

    let mut transport = match connector.connect(&room_id, &token).await {
        Ok(transport) => transport,
        Err(e) => {
            warn!(room_id = %room_id, "room connection failed: {e}");
            report(ChannelEventKind::Closed {
                code: None,
                reason: Some(e.to_string()),
            });
            return;
        }
    };
    report(ChannelEventKind::Opened);

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                match frame {
                    Some(frame) => {
                        if let Err(e) = transport.send(frame).await {
                            error!("transport send error: {e}");
                            report(ChannelEventKind::Closed {
                                code: None,
                                reason: Some(e.to_string()),
                            });
                            break;
                        }
                    }
                    None => {
                        let _ = transport.close().await;
                        break;
                    }
                }
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(TransportFrame::Text(text))) => report(ChannelEventKind::Frame(text)),
                    Some(Ok(TransportFrame::Close(info))) => {
                        debug!(?info, "room connection closed by server");
                        let (code, reason) = match info {
                            Some(info) => (Some(info.code), Some(info.reason)),
                            None => (None, None),
                        };
                        report(ChannelEventKind::Closed { code, reason });
                        break;
                    }
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        report(ChannelEventKind::Closed {
                            code: None,
                            reason: Some(e.to_string()),
                        });
                        break;
                    }
                    None => {
                        debug!("room connection stream ended");
                        report(ChannelEventKind::Closed { code: None, reason: None });
                        break;
                    }
                }
            }
        }
    }
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
    use crate::error::CricketError;
    use crate::transport::CloseInfo;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Transport fed by an unbounded channel; sent frames are recorded.
    struct ChannelTransport {
        inbound: mpsc::UnboundedReceiver<TransportFrame>,
        sent: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for ChannelTransport {
        async fn send(&mut self, frame: String) -> Result<(), CricketError> {
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<TransportFrame, CricketError>> {
            self.inbound.recv().await.map(Ok)
        }

        async fn close(&mut self) -> Result<(), CricketError> {
            Ok(())
        }
    }

    /// Each connect pops the next scripted inbound receiver.
    struct ScriptedConnector {
        scripts: StdMutex<Vec<mpsc::UnboundedReceiver<TransportFrame>>>,
        rooms: Arc<StdMutex<Vec<String>>>,
        sent: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Transport = ChannelTransport;

        async fn connect(&self, room_id: &str, _token: &str) -> Result<ChannelTransport, CricketError> {
            self.rooms.lock().unwrap().push(room_id.to_string());
            let inbound = self
                .scripts
                .lock()
                .unwrap()
                .pop()
                .ok_or(CricketError::TransportClosed)?;
            Ok(ChannelTransport {
                inbound,
                sent: Arc::clone(&self.sent),
            })
        }
    }

    fn connector(
        scripts: Vec<mpsc::UnboundedReceiver<TransportFrame>>,
    ) -> (ScriptedConnector, Arc<StdMutex<Vec<String>>>, Arc<StdMutex<Vec<String>>>) {
        let rooms = Arc::new(StdMutex::new(Vec::new()));
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let mut scripts = scripts;
        scripts.reverse();
        (
            ScriptedConnector {
                scripts: StdMutex::new(scripts),
                rooms: Arc::clone(&rooms),
                sent: Arc::clone(&sent),
            },
            rooms,
            sent,
        )
    }

    #[tokio::test]
    async fn send_before_open_is_dropped() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (connector, _rooms, sent) = connector(vec![rx]);
        let (mut manager, mut events) = ChannelManager::new(connector);

        assert!(!manager.send(&ClientAction::StartMatch));
        manager.open("ROOM01", "tok");
        assert!(!manager.send(&ClientAction::StartMatch));

        let opened = events.recv().await.unwrap();
        assert_eq!(manager.accept(opened), Some(ChannelEventKind::Opened));
        assert!(manager.send(&ClientAction::StartMatch));

        for _ in 0..100 {
            if !sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            [r#"{"action":"START_MATCH"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn reopening_same_room_is_a_no_op() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (connector, _rooms, _sent) = connector(vec![rx]);
        let (mut manager, _events) = ChannelManager::new(connector);

        assert!(manager.open("ROOM01", "tok"));
        let epoch = manager.epoch();
        assert!(!manager.open("ROOM01", "tok"));
        assert_eq!(manager.epoch(), epoch);
    }

    #[tokio::test]
    async fn events_from_previous_room_are_discarded() {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (_tx_b, rx_b) = mpsc::unbounded_channel();
        let (connector, rooms, _sent) = connector(vec![rx_a, rx_b]);
        let (mut manager, mut events) = ChannelManager::new(connector);

        manager.open("ROOMA1", "tok");
        let opened = events.recv().await.unwrap();
        manager.accept(opened).unwrap();
        tx_a.send(TransportFrame::Text("late".into())).unwrap();
        let stale = events.recv().await.unwrap();

        manager.open("ROOMB2", "tok");
        assert_eq!(manager.accept(stale), None);
        assert_eq!(manager.state(), &ConnectionState::Connecting);

        let opened = events.recv().await.unwrap();
        assert_eq!(manager.accept(opened), Some(ChannelEventKind::Opened));
        assert_eq!(rooms.lock().unwrap().as_slice(), ["ROOMA1", "ROOMB2"]);
    }

    #[tokio::test]
    async fn server_close_updates_state() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (connector, _rooms, _sent) = connector(vec![rx]);
        let (mut manager, mut events) = ChannelManager::new(connector);

        manager.open("ROOM01", "tok");
        manager.accept(events.recv().await.unwrap()).unwrap();
        tx.send(TransportFrame::Close(Some(CloseInfo {
            code: 4001,
            reason: "Invalid token".into(),
        })))
        .unwrap();

        let kind = manager.accept(events.recv().await.unwrap()).unwrap();
        assert_eq!(
            kind,
            ChannelEventKind::Closed {
                code: Some(4001),
                reason: Some("Invalid token".into())
            }
        );
        assert!(!manager.state().is_live());
        assert!(!manager.send(&ClientAction::StartMatch));
    }

    #[tokio::test]
    async fn failed_connect_reports_closed_without_code() {
        let (connector, _rooms, _sent) = connector(Vec::new());
        let (mut manager, mut events) = ChannelManager::new(connector);

        manager.open("ROOM01", "tok");
        let kind = manager.accept(events.recv().await.unwrap()).unwrap();
        assert!(matches!(kind, ChannelEventKind::Closed { code: None, .. }));
    }
}
