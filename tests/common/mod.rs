#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for cricket session client integration tests.
//!
//! Provides a channel-backed [`MockTransport`], a [`MockConnector`] that hands
//! out one [`MockServer`] per connection, and helpers that build server
//! frames shaped like the real game server's.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use cricket_session_client::transport::{CloseInfo, TransportFrame};
use cricket_session_client::{ClientEvent, Connector, CricketError, Transport};
use serde_json::{json, Value};
use tokio::sync::mpsc;

// ── MockTransport ───────────────────────────────────────────────────

/// A transport fed by an unbounded channel.
///
/// Frames pushed through the paired [`MockServer`] are returned by `recv()`.
/// When the server side is dropped the stream ends (`None`). Every frame the
/// client sends is recorded in `sent`.
pub struct MockTransport {
    inbound: mpsc::UnboundedReceiver<TransportFrame>,
    sent: Arc<StdMutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, frame: String) -> Result<(), CricketError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<TransportFrame, CricketError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), CricketError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Server side of one mock connection.
#[derive(Clone)]
pub struct MockServer {
    pub room_id: String,
    pub token: String,
    tx: mpsc::UnboundedSender<TransportFrame>,
    pub sent: Arc<StdMutex<Vec<String>>>,
    pub closed: Arc<AtomicBool>,
}

impl MockServer {
    /// Push one text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        // The client may already have torn this connection down.
        let _ = self.tx.send(TransportFrame::Text(frame.into()));
    }

    /// Push a JSON value as a text frame.
    pub fn push_json(&self, value: Value) {
        self.push(value.to_string());
    }

    /// Close the connection with a close frame.
    pub fn close_with(&self, code: u16, reason: &str) {
        let _ = self.tx.send(TransportFrame::Close(Some(CloseInfo {
            code,
            reason: reason.to_string(),
        })));
    }

    /// Frames the client sent, parsed as JSON.
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }

    /// Number of sent frames whose `action` equals `action`.
    pub fn count_action(&self, action: &str) -> usize {
        self.sent_json()
            .iter()
            .filter(|v| v["action"] == action)
            .count()
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// Records every connection and keeps its [`MockServer`].
#[derive(Clone, Default)]
pub struct MockConnector {
    servers: Arc<StdMutex<Vec<MockServer>>>,
    refuse: Arc<AtomicBool>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent connection attempts fail.
    pub fn refuse_connections(&self) {
        self.refuse.store(true, Ordering::Relaxed);
    }

    /// All connections opened so far, oldest first.
    pub fn servers(&self) -> Vec<MockServer> {
        self.servers.lock().unwrap().clone()
    }

    /// The most recent connection.
    pub fn latest(&self) -> MockServer {
        self.servers.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, room_id: &str, token: &str) -> Result<MockTransport, CricketError> {
        if self.refuse.load(Ordering::Relaxed) {
            return Err(CricketError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        let (tx, inbound) = mpsc::unbounded_channel();
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        self.servers.lock().unwrap().push(MockServer {
            room_id: room_id.to_string(),
            token: token.to_string(),
            tx,
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        });
        Ok(MockTransport {
            inbound,
            sent,
            closed,
        })
    }
}

// ── Event helpers ───────────────────────────────────────────────────

/// Receive events until one matches `pred`, failing after five (virtual) seconds.
pub async fn expect_event<F>(events: &mut mpsc::Receiver<ClientEvent>, mut pred: F) -> ClientEvent
where
    F: FnMut(&ClientEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Wait until `server` has recorded at least `n` sent frames.
pub async fn wait_for_sent(server: &MockServer, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.sent.lock().unwrap().len() < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for sent frames");
}

// ── Server frame builders ───────────────────────────────────────────

pub fn lobby_update(room_code: &str, host: &str, players: &[&str]) -> Value {
    let roster: Vec<Value> = players
        .iter()
        .map(|p| json!({ "username": p, "team": null, "is_captain": false, "in_match": false }))
        .collect();
    json!({
        "type": "LOBBY_UPDATE",
        "players": roster,
        "host": host,
        "mode": "1v1",
        "overs": 2,
        "wickets": 1,
        "teams": { "A": [], "B": [] },
        "team_names": { "A": "Team A", "B": "Team B" },
        "captains": { "A": null, "B": null },
        "room_code": room_code,
        "cpu_enabled": false,
        "cpu_only": false,
        "cpu_count": 0,
        "host_plays": true
    })
}

pub fn toss_caller(caller: &str) -> Value {
    json!({ "type": "TOSS_CALLER", "caller": caller })
}

pub fn toss_waiting(caller: &str) -> Value {
    json!({ "type": "TOSS_WAITING", "caller": caller })
}

pub fn toss_result(caller: &str, call: &str, coin: &str, winner: &str) -> Value {
    json!({ "type": "TOSS_RESULT", "caller": caller, "call": call, "coin": coin, "winner": winner })
}

pub fn toss_choose() -> Value {
    json!({ "type": "TOSS_CHOOSE" })
}

pub fn toss_decision(winner: &str, choice: &str, batting: &[&str], bowling: &[&str]) -> Value {
    json!({
        "type": "TOSS_DECISION",
        "winner": winner,
        "choice": choice,
        "batting_first": batting,
        "bowling_first": bowling
    })
}

/// A first-innings `MATCH_STATE` for a 1v1 match between `batter` and `bowler`.
pub fn match_state(batter: &str, bowler: &str, my_role: &str) -> Value {
    json!({
        "type": "MATCH_STATE",
        "mode": "1v1",
        "innings": 1,
        "batting_side": [batter],
        "bowling_side": [bowler],
        "striker": batter,
        "non_striker": null,
        "bowler": bowler,
        "total_runs": 12,
        "wickets": 0,
        "overs": "1.2",
        "total_overs": 2,
        "target": null,
        "batting_card": [
            { "name": batter, "runs": 12, "balls": 8, "fours": 1, "sixes": 1, "sr": 150.0, "dismissal": null, "is_out": false }
        ],
        "bowling_card": [
            { "name": bowler, "overs": "1.2", "runs": 12, "wickets": 0, "econ": 9.0 }
        ],
        "bat_ready": false,
        "bowl_ready": false,
        "needs_batter_choice": false,
        "needs_bowler_choice": false,
        "available_batters": [],
        "available_bowlers": [],
        "batting_captain": batter,
        "bowling_captain": bowler,
        "my_role": my_role
    })
}

pub fn countdown(role: &str, seconds: u32) -> Value {
    json!({ "type": "COUNTDOWN", "role": role, "seconds": seconds })
}

pub fn ball_result(runs: u32, is_out: bool, milestone: Option<u32>) -> Value {
    json!({
        "type": "BALL_RESULT",
        "ball_num": 9,
        "over_display": "1.3",
        "striker": "asha",
        "bowler": "ben",
        "bat_move": runs,
        "bowl_move": if is_out { runs } else { 0 },
        "runs": runs,
        "is_out": is_out,
        "is_four": runs == 4,
        "is_six": runs == 6,
        "innings_runs": 18,
        "innings_wickets": u32::from(is_out),
        "innings_overs": "1.3",
        "over_complete": false,
        "innings_complete": false,
        "target_chased": false,
        "milestone": milestone,
        "hat_trick": false
    })
}

pub fn match_over(winner: &str, result_text: &str) -> Value {
    json!({
        "type": "MATCH_OVER",
        "winner": winner,
        "result_text": result_text,
        "scorecard_1": { "batting": [], "bowling": [], "total_runs": 40 },
        "scorecard_2": { "batting": [], "bowling": [], "total_runs": 36 },
        "side_a": ["asha"],
        "side_b": ["ben"],
        "bat_team_1": ["asha"],
        "bat_team_2": ["ben"],
        "potm": { "player": "asha", "reason": "40 runs" }
    })
}

pub fn match_cancelled(msg: &str, tournament: Option<Value>) -> Value {
    json!({ "type": "MATCH_CANCELLED", "msg": msg, "tournament": tournament })
}

pub fn standings(phase: &str) -> Value {
    json!({
        "standings": [
            { "player": "asha", "played": 2, "won": 2, "lost": 0, "tied": 0, "points": 4, "nrr": 1.25 },
            { "player": "ben", "played": 2, "won": 0, "lost": 2, "tied": 0, "points": 0, "nrr": -1.25 }
        ],
        "phase": phase,
        "info": { "rounds": 1 },
        "upcoming_matches": [ { "label": "Final", "teams": ["asha", "ben"] } ]
    })
}

pub fn tournament_standings(phase: &str) -> Value {
    let mut value = standings(phase);
    value["type"] = json!("TOURNAMENT_STANDINGS");
    value
}

pub fn error(msg: &str) -> Value {
    json!({ "type": "ERROR", "msg": msg })
}

pub fn auto_move_warning(player: &str, strikes: u32, max: u32) -> Value {
    json!({ "type": "AUTO_MOVE_WARNING", "player": player, "strikes": strikes, "max": max })
}
