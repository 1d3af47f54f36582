//! The match session state machine.
//!
//! [`MatchSession`] consumes decoded server messages strictly one at a time
//! and derives the current [`ScreenState`] together with the advisory
//! countdowns, the transient effect, the banner and the action gate. It never
//! performs I/O and never reads the clock: every entry point takes `now`, and
//! every deferred action is a deadline in a [`TimerSlots`] table that the
//! caller fires through [`MatchSession::fire_due`].
//!
//! Notifications for the embedding UI accumulate internally and are drained
//! with [`MatchSession::take_events`].

use std::time::Duration;

use tokio::time::Instant;

use crate::channel::ConnectionState;
use crate::close_codes::CloseDisposition;
use crate::countdown::{BallRole, Countdown, Countdowns, PickRole};
use crate::decoder::{decode, DecodeMonitor};
use crate::effects::{EffectSlot, TransientEffect};
use crate::event::ClientEvent;
use crate::gate::{ActionGate, DecisionPoint, GateRejection};
use crate::notice::{auto_move_text, Banner, BannerKind, NoticeBoard};
use crate::protocol::{
    ClientAction, CountdownRole, LobbySnapshot, MatchSnapshot, PlayerRole, ScorecardSnapshot,
    ServerMessage, StandingsSnapshot, TossSnapshot, TournamentOverPayload,
};
use crate::screen::{ScreenKind, ScreenState};
use crate::timers::{TimerSlot, TimerSlots};

// ── Timings ─────────────────────────────────────────────────────────

/// Durations and thresholds of the session's local timers.
///
/// # Example
///
/// ```
/// use cricket_session_client::SessionTimings;
/// use std::time::Duration;
///
/// let timings = SessionTimings::default()
///     .with_toss_decision_delay(Duration::from_secs(2));
/// assert_eq!(timings.ball_countdown_max, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimings {
    /// TossDecision stays on screen this long before play starts.
    pub toss_decision_delay: Duration,
    /// MatchOver waits this long before showing the scorecard.
    pub match_over_delay: Duration,
    /// Display window of a ball-result effect.
    pub effect_window: Duration,
    /// ERROR, cancellation, room and connectivity banners.
    pub error_banner: Duration,
    /// AUTO_MOVE_WARNING banners.
    pub warning_banner: Duration,
    /// Countdown decrement period.
    pub tick: Duration,
    /// A ball countdown seeded at (or above) this value marks a new decision point.
    pub ball_countdown_max: u32,
    /// Seed of the locally derived captain-pick countdown.
    pub captain_pick_seconds: u32,
    /// Consecutive corrupt frames before a connectivity banner is shown.
    pub decode_failure_threshold: u32,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            toss_decision_delay: Duration::from_secs(3),
            match_over_delay: Duration::from_millis(2500),
            effect_window: Duration::from_millis(1200),
            error_banner: Duration::from_millis(4500),
            warning_banner: Duration::from_secs(4),
            tick: Duration::from_secs(1),
            ball_countdown_max: 10,
            captain_pick_seconds: 5,
            decode_failure_threshold: 5,
        }
    }
}

impl SessionTimings {
    /// Set the TossDecision → Game delay.
    #[must_use]
    pub fn with_toss_decision_delay(mut self, delay: Duration) -> Self {
        self.toss_decision_delay = delay;
        self
    }

    /// Set the MatchOver → Scorecard delay.
    #[must_use]
    pub fn with_match_over_delay(mut self, delay: Duration) -> Self {
        self.match_over_delay = delay;
        self
    }

    /// Set the effect display window.
    #[must_use]
    pub fn with_effect_window(mut self, window: Duration) -> Self {
        self.effect_window = window;
        self
    }
}

// ── View ────────────────────────────────────────────────────────────

/// Everything a renderer needs, as of the last processed input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    pub screen: ScreenState,
    pub connection: ConnectionState,
    /// Display name of the logged-in player, if any.
    pub player: Option<String>,
    pub lobby: Option<LobbySnapshot>,
    pub standings: Option<StandingsSnapshot>,
    pub banner: Option<Banner>,
    pub effect: Option<TransientEffect>,
    /// The ball countdown; hidden while an effect is on screen.
    pub ball_countdown: Option<Countdown<BallRole>>,
    pub captain_countdown: Option<Countdown<PickRole>>,
    pub gate_open: bool,
}

// ── Session ─────────────────────────────────────────────────────────

/// Screen state machine for one room visit.
#[derive(Debug)]
pub struct MatchSession {
    timings: SessionTimings,
    screen: ScreenState,
    lobby: Option<LobbySnapshot>,
    toss: TossSnapshot,
    toss_caller_is_me: bool,
    standings: Option<StandingsSnapshot>,
    my_role: Option<PlayerRole>,
    pending_scorecard: Option<Box<ScorecardSnapshot>>,
    timers: TimerSlots,
    countdowns: Countdowns,
    gate: ActionGate,
    effects: EffectSlot,
    notices: NoticeBoard,
    decode_monitor: DecodeMonitor,
    events: Vec<ClientEvent>,
}

impl MatchSession {
    /// A session on the Home screen.
    pub fn new(timings: SessionTimings) -> Self {
        Self {
            screen: ScreenState::Home,
            lobby: None,
            toss: TossSnapshot::default(),
            toss_caller_is_me: false,
            standings: None,
            my_role: None,
            pending_scorecard: None,
            timers: TimerSlots::new(),
            countdowns: Countdowns::new(timings.tick),
            gate: ActionGate::new(),
            effects: EffectSlot::new(timings.effect_window),
            notices: NoticeBoard::new(),
            decode_monitor: DecodeMonitor::new(timings.decode_failure_threshold),
            events: Vec::new(),
            timings,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn screen(&self) -> &ScreenState {
        &self.screen
    }

    pub fn lobby(&self) -> Option<&LobbySnapshot> {
        self.lobby.as_ref()
    }

    pub fn standings(&self) -> Option<&StandingsSnapshot> {
        self.standings.as_ref()
    }

    pub fn toss(&self) -> &TossSnapshot {
        &self.toss
    }

    pub fn ball_countdown(&self) -> Option<Countdown<BallRole>> {
        self.countdowns.ball()
    }

    pub fn captain_countdown(&self) -> Option<Countdown<PickRole>> {
        self.countdowns.captain()
    }

    pub fn effect(&self) -> Option<&TransientEffect> {
        self.effects.current()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.notices.current()
    }

    /// Returns `true` if a decision action would pass the gate latch.
    ///
    /// This ignores whether a decision is pending at all; see
    /// [`decision_point`](Self::decision_point).
    pub fn gate_open(&self) -> bool {
        self.gate.is_open() && !self.effects.is_playing()
    }

    /// The earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Returns `true` if `slot` is armed.
    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.timers.is_pending(slot)
    }

    /// Drain accumulated notifications.
    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    /// Render the current state.
    pub fn view(&self) -> SessionView {
        let effect = self.effects.current().cloned();
        SessionView {
            screen: self.screen.clone(),
            connection: ConnectionState::Absent,
            player: None,
            lobby: self.lobby.clone(),
            standings: self.standings.clone(),
            banner: self.notices.current().cloned(),
            ball_countdown: if effect.is_some() {
                None
            } else {
                self.countdowns.ball()
            },
            effect,
            captain_countdown: self.countdowns.captain(),
            gate_open: self.gate_open(),
        }
    }

    /// The decision the local player currently owes, if any.
    pub fn decision_point(&self) -> Option<DecisionPoint<'_>> {
        decision_for(&self.screen, self.toss_caller_is_me)
    }

    // ── Inputs ──────────────────────────────────────────────────────

    /// Decode and apply one raw frame. Undecodable frames are dropped.
    pub fn handle_frame(&mut self, frame: &str, now: Instant) {
        match decode(frame) {
            Ok(msg) => {
                self.decode_monitor.record_success();
                self.handle_message(msg, now);
            }
            Err(err) => {
                tracing::warn!(error = %err, raw = %frame, "dropping undecodable frame");
                if self.decode_monitor.record_failure(&err) {
                    self.show_banner(
                        BannerKind::Connectivity,
                        "The server is sending data this client cannot read.",
                        self.timings.error_banner,
                        now,
                    );
                }
            }
        }
    }

    /// Apply one decoded server message.
    pub fn handle_message(&mut self, msg: ServerMessage, now: Instant) {
        match msg {
            ServerMessage::LobbyUpdate(snapshot) => {
                let forcing = matches!(self.screen.kind(), ScreenKind::Home | ScreenKind::Lobby);
                self.lobby = Some((*snapshot).clone());
                if forcing {
                    self.set_screen(ScreenState::Lobby(snapshot));
                }
            }
            ServerMessage::TossCaller(snapshot) => {
                self.begin_toss_screen();
                self.toss_caller_is_me = true;
                self.gate.reopen();
                self.toss = snapshot.clone();
                self.set_screen(ScreenState::TossCall(snapshot));
            }
            ServerMessage::TossWaiting(snapshot) => {
                self.begin_toss_screen();
                self.toss = snapshot.clone();
                self.set_screen(ScreenState::TossCall(snapshot));
            }
            ServerMessage::TossResult(snapshot) => {
                self.begin_toss_screen();
                self.toss = snapshot.clone();
                self.set_screen(ScreenState::TossResult(snapshot));
            }
            ServerMessage::TossChoose => {
                self.begin_toss_screen();
                self.gate.reopen();
                self.set_screen(ScreenState::TossChoose);
            }
            ServerMessage::TossDecision(snapshot) => {
                self.begin_toss_screen();
                self.toss = snapshot.clone();
                self.set_screen(ScreenState::TossDecision(snapshot));
                self.timers.schedule(
                    TimerSlot::TossDecisionToGame,
                    now + self.timings.toss_decision_delay,
                );
            }
            ServerMessage::MatchState(snapshot) => self.apply_match_state(snapshot, now),
            ServerMessage::BallResult(ball) => {
                self.countdowns.cancel_ball(&mut self.timers);
                let kind = self.effects.show(ball, now, &mut self.timers);
                self.events.push(ClientEvent::Effect { kind });
            }
            ServerMessage::Countdown { role, seconds } => self.apply_countdown(role, seconds, now),
            ServerMessage::InningsBreak { target, .. } => {
                tracing::debug!(?target, "innings break");
            }
            ServerMessage::MatchOver(result) => {
                self.timers.cancel(TimerSlot::TossDecisionToGame);
                if let Some(tournament) = result.tournament.clone() {
                    self.standings = Some(tournament);
                }
                self.pending_scorecard = Some(result);
                self.timers.schedule(
                    TimerSlot::MatchOverToScorecard,
                    now + self.timings.match_over_delay,
                );
            }
            ServerMessage::MatchCancelled { msg, tournament } => {
                self.cancel_deferred();
                self.end_match();
                match tournament {
                    Some(standings) => {
                        self.standings = Some(standings.clone());
                        self.set_screen(ScreenState::Standings(standings));
                    }
                    None => self.show_lobby(),
                }
                self.show_banner(
                    BannerKind::MatchCancelled,
                    msg,
                    self.timings.error_banner,
                    now,
                );
            }
            ServerMessage::TournamentStandings(standings) => {
                self.standings = Some(standings.clone());
                if !self.screen.kind().blocks_standings() {
                    self.cancel_deferred();
                    self.set_screen(ScreenState::Standings(standings));
                }
            }
            ServerMessage::TournamentPhase { phase, fixture } => {
                tracing::debug!(%phase, ?fixture, "tournament phase");
                self.standings.get_or_insert_with(StandingsSnapshot::default).phase = phase;
            }
            ServerMessage::TournamentOver(payload) => self.apply_tournament_over(payload),
            ServerMessage::Error { msg } => {
                self.show_banner(BannerKind::ServerError, msg, self.timings.error_banner, now);
            }
            ServerMessage::AutoMoveWarning {
                player,
                strikes,
                max,
            } => {
                self.show_banner(
                    BannerKind::AutoMoveWarning,
                    auto_move_text(&player, strikes, max),
                    self.timings.warning_banner,
                    now,
                );
            }
            ServerMessage::ChooseBatter(announcement) | ServerMessage::ChooseBowler(announcement) => {
                tracing::debug!(captain = %announcement.captain, "captain pick announced");
            }
        }
    }

    /// Fire every timer due at `now`, in deadline order.
    pub fn fire_due(&mut self, now: Instant) {
        for slot in self.timers.take_due(now) {
            self.on_timer(slot, now);
        }
    }

    /// Check `action` against the gate, closing it for decision actions.
    ///
    /// # Errors
    ///
    /// Returns the [`GateRejection`] when the action must not be sent.
    pub fn submit(&mut self, action: &ClientAction) -> Result<(), GateRejection> {
        let point = decision_for(&self.screen, self.toss_caller_is_me);
        let playing = self.effects.is_playing();
        match self.gate.admit(action, point, playing) {
            Ok(()) => Ok(()),
            Err(reason) => {
                tracing::debug!(?action, %reason, "action rejected by gate");
                Err(reason)
            }
        }
    }

    /// Handle the end of the room connection.
    pub fn connection_closed(
        &mut self,
        disposition: CloseDisposition,
        reason: Option<&str>,
        now: Instant,
    ) {
        match disposition {
            CloseDisposition::ForceLogout => {
                self.reset();
            }
            CloseDisposition::RoomNotFound => {
                self.reset();
                let text = reason
                    .filter(|r| !r.is_empty())
                    .unwrap_or("Room not found.")
                    .to_string();
                self.show_banner(
                    BannerKind::RoomNotFound,
                    text.clone(),
                    self.timings.error_banner,
                    now,
                );
                self.events.push(ClientEvent::RoomNotFound { reason: text });
            }
            CloseDisposition::Connectivity => {
                self.halt();
                self.show_banner(
                    BannerKind::Connectivity,
                    "Lost connection to the game server.",
                    self.timings.error_banner,
                    now,
                );
            }
            CloseDisposition::Quiet => self.halt(),
        }
    }

    /// Return to the Home screen with no room state.
    pub fn reset(&mut self) {
        self.halt();
        self.lobby = None;
        self.standings = None;
        self.toss = TossSnapshot::default();
        self.decode_monitor.reset();
        self.gate.reopen();
        self.set_screen(ScreenState::Home);
    }

    // ── Local navigation ────────────────────────────────────────────

    /// Leave a result screen for the lobby. Returns `false` when not on a
    /// result screen.
    pub fn back_to_lobby(&mut self) -> bool {
        match self.screen.kind() {
            ScreenKind::Scorecard | ScreenKind::Standings | ScreenKind::TournamentOver => {
                self.cancel_deferred();
                self.show_lobby();
                true
            }
            _ => false,
        }
    }

    /// Show the tournament table. Returns `false` when no table is known or a
    /// match is being played.
    pub fn view_standings(&mut self) -> bool {
        let kind = self.screen.kind();
        if kind == ScreenKind::Game || kind.is_toss() {
            return false;
        }
        let Some(standings) = self.standings.clone() else {
            return false;
        };
        self.cancel_deferred();
        self.set_screen(ScreenState::Standings(standings));
        true
    }

    // ── Internals ───────────────────────────────────────────────────

    fn apply_match_state(&mut self, snapshot: Box<MatchSnapshot>, now: Instant) {
        let previous = self.my_role.replace(snapshot.my_role);
        let role_changed = previous != Some(snapshot.my_role);

        if role_changed && snapshot.my_role.is_active() {
            self.gate.reopen();
        }
        if role_changed || snapshot.pick_pending() || snapshot.my_move_recorded() {
            self.countdowns.cancel_ball(&mut self.timers);
        }

        let desired_pick = match snapshot.my_role {
            PlayerRole::BattingCaptainPick => Some(PickRole::Batter),
            PlayerRole::BowlingCaptainPick => Some(PickRole::Bowler),
            _ if snapshot.needs_batter_choice => Some(PickRole::Batter),
            _ if snapshot.needs_bowler_choice => Some(PickRole::Bowler),
            _ => None,
        };
        self.countdowns.reconcile_captain(
            desired_pick,
            self.timings.captain_pick_seconds,
            now,
            &mut self.timers,
        );

        if let Some(tournament) = snapshot.tournament.clone() {
            self.standings = Some(tournament);
        }

        self.cancel_deferred();
        self.set_screen(ScreenState::Game(Some(snapshot)));
    }

    fn apply_countdown(&mut self, role: CountdownRole, seconds: u32, now: Instant) {
        match BallRole::from_hint(role) {
            Some(ball_role) => {
                self.countdowns
                    .seed_ball(ball_role, seconds, now, &mut self.timers);
                if seconds >= self.timings.ball_countdown_max {
                    self.gate.reopen();
                }
            }
            None => {
                if !self.countdowns.reseed_captain(seconds, now, &mut self.timers) {
                    tracing::debug!(seconds, "captain countdown hint without a pending pick");
                }
            }
        }
    }

    fn apply_tournament_over(&mut self, payload: Box<TournamentOverPayload>) {
        self.cancel_deferred();
        if let Some(standings) = self.standings.as_mut() {
            standings.standings = payload.standings.clone();
        }
        match payload.tournament_id.clone() {
            Some(tournament_id) => {
                tracing::info!(%tournament_id, "tournament recorded");
                self.events
                    .push(ClientEvent::TournamentRecorded { tournament_id });
                self.show_lobby();
            }
            None => self.set_screen(ScreenState::TournamentOver(payload)),
        }
    }

    fn on_timer(&mut self, slot: TimerSlot, now: Instant) {
        match slot {
            TimerSlot::TossDecisionToGame => {
                if self.screen.kind() == ScreenKind::TossDecision {
                    self.set_screen(ScreenState::Game(None));
                }
            }
            TimerSlot::MatchOverToScorecard => {
                if let Some(result) = self.pending_scorecard.take() {
                    self.end_match();
                    self.set_screen(ScreenState::Scorecard(result));
                }
            }
            TimerSlot::BallCountdownTick | TimerSlot::CaptainCountdownTick => {
                self.countdowns.on_tick(slot, now, &mut self.timers);
            }
            TimerSlot::EffectExpiry => self.effects.expire(),
            TimerSlot::BannerClear => self.notices.expire(),
        }
    }

    /// Toss screens start a new match.
    fn begin_toss_screen(&mut self) {
        self.cancel_deferred();
        self.toss_caller_is_me = false;
        self.my_role = None;
    }

    /// Forget the running match: countdowns, effect and role.
    fn end_match(&mut self) {
        self.pending_scorecard = None;
        self.my_role = None;
        self.countdowns.clear(&mut self.timers);
        self.effects.clear(&mut self.timers);
    }

    /// Cancel both deferred screen transitions.
    fn cancel_deferred(&mut self) {
        self.timers.cancel(TimerSlot::TossDecisionToGame);
        if self.timers.cancel(TimerSlot::MatchOverToScorecard) {
            self.pending_scorecard = None;
        }
    }

    /// Stop every timer and drop per-match state; the screen is kept.
    fn halt(&mut self) {
        self.timers.cancel_all();
        self.pending_scorecard = None;
        self.my_role = None;
        self.toss_caller_is_me = false;
        self.countdowns.clear(&mut self.timers);
        self.effects.clear(&mut self.timers);
        self.notices.expire();
    }

    fn show_lobby(&mut self) {
        let lobby = self.lobby.clone().unwrap_or_default();
        self.set_screen(ScreenState::Lobby(Box::new(lobby)));
    }

    fn show_banner(
        &mut self,
        kind: BannerKind,
        text: impl Into<String>,
        duration: Duration,
        now: Instant,
    ) {
        let banner = self.notices.show(kind, text, duration, now, &mut self.timers);
        self.events.push(ClientEvent::Banner {
            kind,
            text: banner.text.clone(),
        });
    }

    fn set_screen(&mut self, next: ScreenState) {
        let from = self.screen.kind();
        let to = next.kind();
        self.screen = next;
        if from != to {
            tracing::debug!(%from, %to, "screen transition");
            self.events.push(ClientEvent::ScreenChanged { from, to });
        }
    }
}

fn decision_for(screen: &ScreenState, toss_caller_is_me: bool) -> Option<DecisionPoint<'_>> {
    let snapshot = match screen {
        ScreenState::TossCall(_) if toss_caller_is_me => return Some(DecisionPoint::TossCall),
        ScreenState::TossChoose => return Some(DecisionPoint::TossChoice),
        ScreenState::Game(Some(snapshot)) => snapshot,
        _ => return None,
    };
    match snapshot.my_role {
        PlayerRole::BattingCaptainPick if snapshot.needs_batter_choice => {
            Some(DecisionPoint::PickBatter(&snapshot.available_batters))
        }
        PlayerRole::BowlingCaptainPick if snapshot.needs_bowler_choice => {
            Some(DecisionPoint::PickBowler(&snapshot.available_bowlers))
        }
        role if role.is_ball_active() && !snapshot.pick_pending() => Some(DecisionPoint::Ball),
        _ => None,
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
    use crate::effects::EffectKind;
    use crate::protocol::{BallResult, TossChoice};

    fn session() -> MatchSession {
        MatchSession::new(SessionTimings::default())
    }

    fn batting() -> Box<MatchSnapshot> {
        Box::new(MatchSnapshot {
            my_role: PlayerRole::Batting,
            ..MatchSnapshot::default()
        })
    }

    #[test]
    fn first_lobby_update_leaves_home() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(
            ServerMessage::LobbyUpdate(Box::new(LobbySnapshot {
                room_code: "AB12CD".into(),
                ..LobbySnapshot::default()
            })),
            now,
        );
        assert_eq!(s.screen().kind(), ScreenKind::Lobby);
        assert_eq!(
            s.take_events(),
            vec![ClientEvent::ScreenChanged {
                from: ScreenKind::Home,
                to: ScreenKind::Lobby
            }]
        );
    }

    #[test]
    fn lobby_update_during_match_only_stores_snapshot() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.handle_message(ServerMessage::LobbyUpdate(Box::default()), now);
        assert_eq!(s.screen().kind(), ScreenKind::Game);
        assert!(s.lobby().is_some());
    }

    #[test]
    fn toss_decision_becomes_game_after_delay() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(
            ServerMessage::TossDecision(TossSnapshot {
                winner: Some("p1".into()),
                choice: Some(TossChoice::Bat),
                ..TossSnapshot::default()
            }),
            now,
        );
        s.fire_due(now + Duration::from_millis(2999));
        assert_eq!(s.screen().kind(), ScreenKind::TossDecision);
        s.fire_due(now + Duration::from_secs(3));
        assert_eq!(s.screen(), &ScreenState::Game(None));
    }

    #[test]
    fn match_state_before_delay_cancels_deferred_transition() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::TossDecision(TossSnapshot::default()), now);
        s.handle_message(ServerMessage::MatchState(batting()), now + Duration::from_secs(2));
        assert!(!s.is_pending(TimerSlot::TossDecisionToGame));
        assert!(s.screen().match_snapshot().is_some());
    }

    #[test]
    fn match_over_shows_scorecard_after_delay() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.handle_message(
            ServerMessage::MatchOver(Box::new(ScorecardSnapshot {
                result_text: "p1 won by 4 runs".into(),
                ..ScorecardSnapshot::default()
            })),
            now,
        );
        s.fire_due(now + Duration::from_secs(2));
        assert_eq!(s.screen().kind(), ScreenKind::Game);
        s.fire_due(now + Duration::from_millis(2500));
        match s.screen() {
            ScreenState::Scorecard(result) => assert_eq!(result.result_text, "p1 won by 4 runs"),
            other => panic!("expected scorecard, got {other:?}"),
        }
    }

    #[test]
    fn standings_push_does_not_interrupt_game() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.handle_message(
            ServerMessage::TournamentStandings(StandingsSnapshot::default()),
            now,
        );
        assert_eq!(s.screen().kind(), ScreenKind::Game);
        assert!(s.standings().is_some());
    }

    #[test]
    fn standings_push_forces_from_lobby() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::LobbyUpdate(Box::default()), now);
        s.handle_message(
            ServerMessage::TournamentStandings(StandingsSnapshot::default()),
            now,
        );
        assert_eq!(s.screen().kind(), ScreenKind::Standings);
    }

    #[test]
    fn tournament_phase_never_changes_screen() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::LobbyUpdate(Box::default()), now);
        s.handle_message(
            ServerMessage::TournamentPhase {
                phase: "final".into(),
                fixture: vec!["a".into(), "b".into()],
            },
            now,
        );
        assert_eq!(s.screen().kind(), ScreenKind::Lobby);
        assert_eq!(s.standings().map(|t| t.phase.as_str()), Some("final"));
    }

    #[test]
    fn recorded_tournament_falls_back_to_lobby() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(
            ServerMessage::TournamentOver(Box::new(TournamentOverPayload {
                tournament_id: Some("t-17".into()),
                ..TournamentOverPayload::default()
            })),
            now,
        );
        assert_eq!(s.screen().kind(), ScreenKind::Lobby);
        assert!(s.take_events().contains(&ClientEvent::TournamentRecorded {
            tournament_id: "t-17".into()
        }));

        s.handle_message(ServerMessage::TournamentOver(Box::default()), now);
        assert_eq!(s.screen().kind(), ScreenKind::TournamentOver);
    }

    #[test]
    fn ball_result_cancels_ball_countdown_and_shows_effect() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.handle_message(
            ServerMessage::Countdown {
                role: CountdownRole::Bat,
                seconds: 10,
            },
            now,
        );
        assert!(s.ball_countdown().is_some());
        s.handle_message(
            ServerMessage::BallResult(BallResult {
                runs: 4,
                is_four: true,
                ..BallResult::default()
            }),
            now,
        );
        assert!(s.ball_countdown().is_none());
        assert_eq!(s.effect().map(|e| e.kind), Some(EffectKind::Four));
        assert!(!s.gate_open());

        s.fire_due(now + Duration::from_millis(1200));
        assert!(s.effect().is_none());
    }

    #[test]
    fn effect_hides_ball_countdown_in_view() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.handle_message(ServerMessage::BallResult(BallResult::default()), now);
        s.handle_message(
            ServerMessage::Countdown {
                role: CountdownRole::Bat,
                seconds: 10,
            },
            now,
        );
        let view = s.view();
        assert!(view.effect.is_some());
        assert!(view.ball_countdown.is_none());
        assert!(s.ball_countdown().is_some());
    }

    #[test]
    fn captain_countdown_derived_from_pick_flags() {
        let now = Instant::now();
        let mut s = session();
        let mut picking = MatchSnapshot {
            my_role: PlayerRole::BattingCaptainPick,
            needs_batter_choice: true,
            ..MatchSnapshot::default()
        };
        s.handle_message(ServerMessage::MatchState(Box::new(picking.clone())), now);
        assert_eq!(
            s.captain_countdown(),
            Some(Countdown {
                role: PickRole::Batter,
                remaining: 5
            })
        );

        picking.needs_batter_choice = false;
        picking.my_role = PlayerRole::Fielding;
        s.handle_message(ServerMessage::MatchState(Box::new(picking)), now);
        assert_eq!(s.captain_countdown(), None);
    }

    #[test]
    fn move_needs_active_ball_role() {
        let now = Instant::now();
        let mut s = session();
        let waiting = MatchSnapshot {
            my_role: PlayerRole::NonStriker,
            ..MatchSnapshot::default()
        };
        s.handle_message(ServerMessage::MatchState(Box::new(waiting)), now);
        assert_eq!(
            s.submit(&ClientAction::GameMove { number: 2 }),
            Err(GateRejection::NoDecisionPending)
        );
    }

    #[test]
    fn role_change_reopens_gate() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.submit(&ClientAction::GameMove { number: 3 }).unwrap();
        assert!(!s.gate_open());

        // Same role again is not a new decision point.
        s.handle_message(ServerMessage::MatchState(batting()), now);
        assert!(!s.gate_open());

        let bowling = MatchSnapshot {
            my_role: PlayerRole::Bowling,
            ..MatchSnapshot::default()
        };
        s.handle_message(ServerMessage::MatchState(Box::new(bowling)), now);
        assert!(s.gate_open());
    }

    #[test]
    fn countdown_below_max_does_not_reopen_gate() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        s.submit(&ClientAction::GameMove { number: 1 }).unwrap();
        s.handle_message(
            ServerMessage::Countdown {
                role: CountdownRole::Bat,
                seconds: 7,
            },
            now,
        );
        assert!(!s.gate_open());
    }

    #[test]
    fn room_not_found_resets_to_home_with_reason() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::LobbyUpdate(Box::default()), now);
        s.take_events();
        s.connection_closed(CloseDisposition::RoomNotFound, Some("Room not found"), now);
        assert_eq!(s.screen(), &ScreenState::Home);
        assert_eq!(s.banner().map(|b| b.kind), Some(BannerKind::RoomNotFound));
        assert!(s.take_events().contains(&ClientEvent::RoomNotFound {
            reason: "Room not found".into()
        }));
    }

    #[test]
    fn generic_close_keeps_screen_and_cancels_timers() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::TossDecision(TossSnapshot::default()), now);
        s.connection_closed(CloseDisposition::Connectivity, None, now);
        assert_eq!(s.screen().kind(), ScreenKind::TossDecision);
        assert!(!s.is_pending(TimerSlot::TossDecisionToGame));
        assert_eq!(s.banner().map(|b| b.kind), Some(BannerKind::Connectivity));
    }

    #[test]
    fn repeated_garbage_raises_connectivity_banner() {
        let now = Instant::now();
        let mut s = session();
        for _ in 0..4 {
            s.handle_frame("{not json", now);
        }
        assert!(s.banner().is_none());
        s.handle_frame("{not json", now);
        assert_eq!(s.banner().map(|b| b.kind), Some(BannerKind::Connectivity));
    }

    #[test]
    fn back_to_lobby_only_from_result_screens() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::MatchState(batting()), now);
        assert!(!s.back_to_lobby());
        s.handle_message(ServerMessage::TournamentOver(Box::default()), now);
        assert!(s.back_to_lobby());
        assert_eq!(s.screen().kind(), ScreenKind::Lobby);
    }

    #[test]
    fn view_standings_needs_a_table() {
        let now = Instant::now();
        let mut s = session();
        s.handle_message(ServerMessage::LobbyUpdate(Box::default()), now);
        assert!(!s.view_standings());
        s.handle_message(
            ServerMessage::TournamentPhase {
                phase: "league".into(),
                fixture: Vec::new(),
            },
            now,
        );
        assert!(s.view_standings());
        assert_eq!(s.screen().kind(), ScreenKind::Standings);
    }
}
