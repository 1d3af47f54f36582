//! Async client for a cricket match room.
//!
//! [`CricketClient`] is a thin handle that communicates with one background
//! loop task via an unbounded MPSC channel. The loop owns the
//! [`ChannelManager`] and the [`MatchSession`]; it is the only place where
//! server frames, user commands and timer deadlines are processed, strictly
//! one at a time. Notifications are emitted on a bounded channel
//! ([`tokio::sync::mpsc::Receiver<ClientEvent>`]) returned from
//! [`CricketClient::start`], and the full render state is published on a
//! [`watch`] channel available from [`CricketClient::view`].
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::new("ws://localhost:8000");
//! let (client, mut events) = CricketClient::start_websocket(config);
//!
//! client.login(Session::new(token, "asha"))?;
//! client.enter_room("AB12CD")?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ClientEvent::ScreenChanged { to, .. } => { /* redraw */ }
//!         ClientEvent::Stopped => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::channel::{ChannelEvent, ChannelEventKind, ChannelManager};
use crate::close_codes::{disposition_for, CloseDisposition};
use crate::error::{CricketError, Result};
use crate::event::ClientEvent;
use crate::protocol::{ClientAction, MatchMode, TeamSide, TossCall, TossChoice};
use crate::session::{MatchSession, SessionTimings, SessionView};
use crate::transport::Connector;

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`CricketClient`].
///
/// # Example
///
/// ```
/// use cricket_session_client::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("ws://localhost:8000")
///     .with_event_channel_capacity(512)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.event_channel_capacity, 512);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket base URL of the game server, e.g. `ws://localhost:8000`.
    pub server_url: String,
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer cannot keep up, events are dropped (with a warning
    /// logged) to avoid blocking the loop. The `Stopped` event is always
    /// delivered regardless of capacity.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// Defaults to **1 second**. A zero timeout aborts the loop immediately.
    pub shutdown_timeout: Duration,
    /// Local timer durations.
    pub timings: SessionTimings,
}

impl ClientConfig {
    /// Create a configuration for the given server with default values.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            timings: SessionTimings::default(),
        }
    }

    /// Set the capacity of the bounded event channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Replace the local timer durations.
    #[must_use]
    pub fn with_timings(mut self, timings: SessionTimings) -> Self {
        self.timings = timings;
        self
    }
}

// ── Session credentials ─────────────────────────────────────────────

/// Credentials obtained at login. Owned by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token passed to the room socket.
    pub token: String,
    /// Name shown to other players.
    pub display_name: String,
}

impl Session {
    pub fn new(token: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            display_name: display_name.into(),
        }
    }
}

// ── RoomSettings ────────────────────────────────────────────────────

/// Lobby settings sent with [`CricketClient::configure`]. Unset fields keep
/// their current value on the server.
///
/// # Example
///
/// ```
/// use cricket_session_client::client::RoomSettings;
/// use cricket_session_client::protocol::MatchMode;
///
/// let settings = RoomSettings::new().with_mode(MatchMode::Team).with_overs(5);
/// assert_eq!(settings.overs, Some(5));
/// assert_eq!(settings.wickets, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSettings {
    pub mode: Option<MatchMode>,
    pub overs: Option<u32>,
    pub wickets: Option<u32>,
    pub host_plays: Option<bool>,
}

impl RoomSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_overs(mut self, overs: u32) -> Self {
        self.overs = Some(overs);
        self
    }

    #[must_use]
    pub fn with_wickets(mut self, wickets: u32) -> Self {
        self.wickets = Some(wickets);
        self
    }

    #[must_use]
    pub fn with_host_plays(mut self, host_plays: bool) -> Self {
        self.host_plays = Some(host_plays);
        self
    }
}

impl From<RoomSettings> for ClientAction {
    fn from(settings: RoomSettings) -> Self {
        ClientAction::Configure {
            mode: settings.mode,
            overs: settings.overs,
            wickets: settings.wickets,
            host_plays: settings.host_plays,
        }
    }
}

// ── Shared state ────────────────────────────────────────────────────

/// Internal shared state between the client handle and the loop.
struct ClientState {
    running: AtomicBool,
    logged_in: AtomicBool,
}

impl ClientState {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            logged_in: AtomicBool::new(false),
        }
    }
}

/// Commands from the handle to the loop.
#[derive(Debug)]
enum Command {
    Login(Session),
    Logout,
    EnterRoom(String),
    LeaveRoom,
    Action(ClientAction),
    BackToLobby,
    ViewStandings,
}

// ── Client handle ───────────────────────────────────────────────────

/// Async client handle for a cricket match room.
///
/// Created via [`CricketClient::start`]. All public methods queue a command
/// for the loop and return immediately; outcomes arrive as [`ClientEvent`]s
/// and in the published [`SessionView`]. Every action, whatever UI control
/// produced it, passes the same action gate inside the loop.
pub struct CricketClient {
    cmd_tx: mpsc::UnboundedSender<Command>,
    view_rx: watch::Receiver<SessionView>,
    state: Arc<ClientState>,
    task: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl CricketClient {
    /// Start the client loop and return a handle plus event receiver.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start<C: Connector>(
        config: ClientConfig,
        connector: C,
    ) -> (Self, mpsc::Receiver<ClientEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let (view_tx, view_rx) = watch::channel(SessionView::default());

        let state = Arc::new(ClientState::new());
        let (channel, channel_rx) = ChannelManager::new(connector);

        let task = tokio::spawn(client_loop(
            LoopContext {
                channel,
                channel_rx,
                cmd_rx,
                event_tx,
                view_tx,
                state: Arc::clone(&state),
            },
            MatchSession::new(config.timings),
            shutdown_rx,
        ));

        let client = Self {
            cmd_tx,
            view_rx,
            state,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    /// Start the client against `config.server_url` over WebSocket.
    #[cfg(feature = "transport-websocket")]
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start_websocket(config: ClientConfig) -> (Self, mpsc::Receiver<ClientEvent>) {
        let connector = crate::transports::WebSocketConnector::new(config.server_url.clone());
        Self::start(config, connector)
    }

    // ── Session lifecycle ───────────────────────────────────────────

    /// Provide the credentials used for room connections.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn login(&self, session: Session) -> Result<()> {
        self.command(Command::Login(session))?;
        self.state.logged_in.store(true, Ordering::Release);
        Ok(())
    }

    /// Drop the credentials, close the room connection and return to Home.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn logout(&self) -> Result<()> {
        self.state.logged_in.store(false, Ordering::Release);
        self.command(Command::Logout)
    }

    /// Connect to a room, replacing any connection to a different room.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotLoggedIn`] without credentials, or
    /// [`CricketError::NotRunning`] if the loop has stopped.
    pub fn enter_room(&self, room_id: impl Into<String>) -> Result<()> {
        if !self.is_logged_in() {
            return Err(CricketError::NotLoggedIn);
        }
        self.command(Command::EnterRoom(room_id.into()))
    }

    /// Close the room connection and return to Home.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn leave_room(&self) -> Result<()> {
        self.command(Command::LeaveRoom)
    }

    // ── Decision actions ────────────────────────────────────────────

    /// Play a number (0..=6) for the next ball.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped. Gate
    /// refusals arrive as [`ClientEvent::ActionRejected`].
    pub fn submit_move(&self, number: u8) -> Result<()> {
        self.send_action(ClientAction::GameMove { number })
    }

    /// Pick the next batter (batting captain only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn pick_batter(&self, player: impl Into<String>) -> Result<()> {
        self.send_action(ClientAction::PickBatter {
            player: player.into(),
        })
    }

    /// Pick the next bowler (bowling captain only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn pick_bowler(&self, player: impl Into<String>) -> Result<()> {
        self.send_action(ClientAction::PickBowler {
            player: player.into(),
        })
    }

    /// Call the coin.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn toss_call(&self, call: TossCall) -> Result<()> {
        self.send_action(ClientAction::TossCall { call })
    }

    /// Elect to bat or bowl after winning the toss.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn toss_choice(&self, choice: TossChoice) -> Result<()> {
        self.send_action(ClientAction::TossChoice { choice })
    }

    // ── Lobby actions ───────────────────────────────────────────────

    /// Update room settings (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn configure(&self, settings: RoomSettings) -> Result<()> {
        self.send_action(settings.into())
    }

    /// Move a player to a team (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn assign_team(&self, player: impl Into<String>, team: TeamSide) -> Result<()> {
        self.send_action(ClientAction::AssignTeam {
            player: player.into(),
            team,
        })
    }

    /// Rename a team.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn set_team_name(&self, team: TeamSide, name: impl Into<String>) -> Result<()> {
        self.send_action(ClientAction::SetTeamName {
            team,
            name: name.into(),
        })
    }

    /// Appoint a team captain (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn set_captain(&self, team: TeamSide, captain: impl Into<String>) -> Result<()> {
        self.send_action(ClientAction::SetCaptain {
            team,
            captain: captain.into(),
        })
    }

    /// Clear all team assignments (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn reset_teams(&self) -> Result<()> {
        self.send_action(ClientAction::ResetTeams)
    }

    /// Add a CPU player (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn add_cpu(&self) -> Result<()> {
        self.send_action(ClientAction::AddCpu)
    }

    /// Remove a CPU player (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn remove_cpu(&self) -> Result<()> {
        self.send_action(ClientAction::RemoveCpu)
    }

    /// Start a single match (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn start_match(&self) -> Result<()> {
        self.send_action(ClientAction::StartMatch)
    }

    /// Start a tournament (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn start_tournament(&self) -> Result<()> {
        self.send_action(ClientAction::StartTournament)
    }

    /// Cancel the running match (host only).
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn cancel_match(&self) -> Result<()> {
        self.send_action(ClientAction::CancelMatch)
    }

    /// Queue any action. Decision actions pass the action gate.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn send_action(&self, action: ClientAction) -> Result<()> {
        self.command(Command::Action(action))
    }

    // ── Local navigation ────────────────────────────────────────────

    /// Leave a result screen for the lobby.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn back_to_lobby(&self) -> Result<()> {
        self.command(Command::BackToLobby)
    }

    /// Show the tournament table.
    ///
    /// # Errors
    ///
    /// Returns [`CricketError::NotRunning`] if the loop has stopped.
    pub fn view_standings(&self) -> Result<()> {
        self.command(Command::ViewStandings)
    }

    /// Shut down the client, closing the room connection and stopping the loop.
    ///
    /// After calling this method, the event receiver yields
    /// [`ClientEvent::Stopped`] and then `None`.
    pub async fn shutdown(&mut self) {
        debug!("CricketClient: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the loop with a timeout. If it doesn't exit in time, abort it
        // so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("client loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("client loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("client loop aborted: {join_err}");
                    }
                }
            }
        }

        self.state.running.store(false, Ordering::Release);
    }

    // ── State accessors ─────────────────────────────────────────────

    /// A receiver of the render state, updated after every processed input.
    pub fn view(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// The latest render state.
    pub fn current_view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Returns `true` while the loop runs.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Returns `true` while credentials are held.
    pub fn is_logged_in(&self) -> bool {
        self.state.logged_in.load(Ordering::Acquire)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn command(&self, cmd: Command) -> Result<()> {
        if !self.is_running() {
            return Err(CricketError::NotRunning);
        }
        self.cmd_tx.send(cmd).map_err(|_| CricketError::NotRunning)
    }
}

impl std::fmt::Debug for CricketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CricketClient")
            .field("running", &self.is_running())
            .field("logged_in", &self.is_logged_in())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for CricketClient {
    fn drop(&mut self) {
        // `Drop` is synchronous, so the loop cannot be shut down gracefully
        // here. Aborting the task drops the loop future, which drops the
        // channel manager and with it the connection task.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Client loop ─────────────────────────────────────────────────────

/// Everything the loop owns besides the session.
struct LoopContext<C: Connector> {
    channel: ChannelManager<C>,
    channel_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::Sender<ClientEvent>,
    view_tx: watch::Sender<SessionView>,
    state: Arc<ClientState>,
}

/// Background loop that multiplexes commands, connection events and timer
/// deadlines via `tokio::select!`.
///
/// Exits when the command channel closes (handle dropped) or on shutdown.
async fn client_loop<C: Connector>(
    mut ctx: LoopContext<C>,
    mut session: MatchSession,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    debug!("client loop started");
    let mut credentials: Option<Session> = None;

    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            // Branch 1: command from the client handle
            cmd = ctx.cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => handle_command(&mut ctx, &mut session, &mut credentials, cmd),
                    None => {
                        debug!("command channel closed, shutting down client loop");
                        break;
                    }
                }
            }

            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                break;
            }

            // Branch 3: report from the connection task
            Some(event) = ctx.channel_rx.recv() => {
                handle_channel_event(&mut ctx, &mut session, &mut credentials, event);
            }

            // Branch 4: earliest timer deadline
            () = sleep_until(deadline) => {
                session.fire_due(Instant::now());
            }
        }

        for event in session.take_events() {
            emit_event(&ctx.event_tx, event);
        }
        publish(&ctx, &session, credentials.as_ref());
    }

    ctx.channel.close();
    session.reset();
    publish(&ctx, &session, credentials.as_ref());
    ctx.state.running.store(false, Ordering::Release);
    emit_stopped(&ctx.event_tx).await;
    debug!("client loop exited");
}

fn handle_command<C: Connector>(
    ctx: &mut LoopContext<C>,
    session: &mut MatchSession,
    credentials: &mut Option<Session>,
    cmd: Command,
) {
    match cmd {
        Command::Login(creds) => {
            info!(player = %creds.display_name, "logged in");
            *credentials = Some(creds);
        }
        Command::Logout => {
            info!("logged out");
            *credentials = None;
            ctx.channel.close();
            session.reset();
            emit_event(&ctx.event_tx, ClientEvent::LoggedOut);
        }
        Command::EnterRoom(room_id) => {
            let Some(creds) = credentials.as_ref() else {
                warn!(room_id = %room_id, "cannot enter a room without credentials");
                return;
            };
            if ctx.channel.open(&room_id, &creds.token) {
                session.reset();
            }
        }
        Command::LeaveRoom => {
            ctx.channel.close();
            session.reset();
        }
        Command::Action(action) => match session.submit(&action) {
            Ok(()) => {
                ctx.channel.send(&action);
            }
            Err(reason) => {
                emit_event(&ctx.event_tx, ClientEvent::ActionRejected { action, reason });
            }
        },
        Command::BackToLobby => {
            if !session.back_to_lobby() {
                debug!("back to lobby ignored on this screen");
            }
        }
        Command::ViewStandings => {
            if !session.view_standings() {
                debug!("no standings to show");
            }
        }
    }
}

fn handle_channel_event<C: Connector>(
    ctx: &mut LoopContext<C>,
    session: &mut MatchSession,
    credentials: &mut Option<Session>,
    event: ChannelEvent,
) {
    let Some(kind) = ctx.channel.accept(event) else {
        return;
    };
    match kind {
        ChannelEventKind::Opened => {
            let room_id = ctx.channel.room_id().unwrap_or_default().to_string();
            info!(room_id = %room_id, "room connection open");
            emit_event(&ctx.event_tx, ClientEvent::ConnectionOpened { room_id });
        }
        ChannelEventKind::Frame(text) => session.handle_frame(&text, Instant::now()),
        ChannelEventKind::Closed { code, reason } => {
            let disposition = disposition_for(code);
            let now = Instant::now();
            match disposition {
                CloseDisposition::ForceLogout => {
                    warn!(?code, "session rejected by server, logging out");
                    *credentials = None;
                    ctx.state.logged_in.store(false, Ordering::Release);
                    ctx.channel.close();
                    session.connection_closed(disposition, reason.as_deref(), now);
                    emit_event(&ctx.event_tx, ClientEvent::LoggedOut);
                }
                CloseDisposition::RoomNotFound => {
                    warn!(?code, ?reason, "room not found");
                    session.connection_closed(disposition, reason.as_deref(), now);
                }
                CloseDisposition::Connectivity | CloseDisposition::Quiet => {
                    info!(?code, ?reason, "room connection closed");
                    session.connection_closed(disposition, reason.as_deref(), now);
                    emit_event(&ctx.event_tx, ClientEvent::ConnectionLost { code, reason });
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Publish the render state if it changed.
fn publish<C: Connector>(ctx: &LoopContext<C>, session: &MatchSession, credentials: Option<&Session>) {
    let mut view = session.view();
    view.connection = ctx.channel.state().clone();
    view.player = credentials.map(|c| c.display_name.clone());
    ctx.view_tx.send_if_modified(|current| {
        if *current == view {
            false
        } else {
            *current = view;
            true
        }
    });
}

/// Emit an event to the event channel. If the channel is full, log a warning
/// and drop the event to avoid blocking the loop.
fn emit_event(event_tx: &mpsc::Sender<ClientEvent>, event: ClientEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!("event channel full, dropping event: {dropped:?}");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit the terminal [`Stopped`](ClientEvent::Stopped) event.
///
/// Uses `send().await` instead of `try_send` because `Stopped` is always the
/// last event on the channel and must never be silently dropped.
async fn emit_stopped(event_tx: &mpsc::Sender<ClientEvent>) {
    if event_tx.send(ClientEvent::Stopped).await.is_err() {
        debug!("event channel closed, receiver dropped");
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

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("ws://localhost:8000");
        assert_eq!(config.server_url, "ws://localhost:8000");
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(config.timings, SessionTimings::default());
    }

    #[test]
    fn config_capacity_clamped_to_one() {
        let config = ClientConfig::new("ws://x").with_event_channel_capacity(0);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[test]
    fn room_settings_become_configure_action() {
        let action: ClientAction = RoomSettings::new()
            .with_overs(2)
            .with_host_plays(false)
            .into();
        assert_eq!(
            action,
            ClientAction::Configure {
                mode: None,
                overs: Some(2),
                wickets: None,
                host_plays: Some(false),
            }
        );
    }

    #[test]
    fn session_new_stores_fields() {
        let session = Session::new("tok", "asha");
        assert_eq!(session.token, "tok");
        assert_eq!(session.display_name, "asha");
    }
}
