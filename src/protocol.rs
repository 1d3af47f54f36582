//! Wire-compatible protocol types for the game server's room socket.
//!
//! Every inbound frame is a flat JSON object discriminated by a `"type"`
//! field in `SCREAMING_SNAKE_CASE`; every outbound action is a flat JSON object
//! discriminated by `"action"`. Key adaptations:
//!
//! - deeply nested, display-only payloads (per-innings scorecards, awards,
//!   tournament bracket info) stay as [`serde_json::Value`]
//! - every snapshot field the client reasons about is typed
//! - unknown fields are ignored and missing optional fields default, so the
//!   client keeps working when the server adds data

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Enums ───────────────────────────────────────────────────────────

/// Match format as reported by the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Two human players, one per side.
    #[default]
    #[serde(rename = "1v1")]
    OneVsOne,
    /// Two captained teams of equal size.
    Team,
    /// One human against the server's CPU.
    Cpu,
    /// A fixture inside a running tournament.
    Tournament,
    /// A mode this client does not know about.
    #[serde(other)]
    Other,
}

/// Team key used by the lobby.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TeamSide {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
}

/// Coin call made by the toss caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TossCall {
    Heads,
    Tails,
}

/// What the toss winner elects to do first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TossChoice {
    Bat,
    Bowl,
}

/// The local player's role in the current match snapshot.
///
/// The server computes this per recipient, so two players receive the same
/// snapshot with different roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerRole {
    /// On strike: picks a batting number for the next ball.
    Batting,
    /// Current bowler: picks a bowling number for the next ball.
    Bowling,
    NonStriker,
    Fielding,
    #[default]
    Spectating,
    /// Someone else is picking the next batter or bowler.
    Waiting,
    /// The local player is the batting captain and must pick the next batter.
    BattingCaptainPick,
    /// The local player is the bowling captain and must pick the next bowler.
    BowlingCaptainPick,
}

impl PlayerRole {
    /// Returns `true` when the role submits a number for the next ball.
    pub fn is_ball_active(&self) -> bool {
        matches!(self, Self::Batting | Self::Bowling)
    }

    /// Returns `true` when the role is expected to send an action.
    pub fn is_active(&self) -> bool {
        self.is_ball_active() || self.is_captain_pick()
    }

    /// Returns `true` when the role picks the next batter or bowler.
    pub fn is_captain_pick(&self) -> bool {
        matches!(self, Self::BattingCaptainPick | Self::BowlingCaptainPick)
    }
}

/// Role carried by a server `COUNTDOWN` hint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CountdownRole {
    Bat,
    Bowl,
    Captain,
}

// ── Lobby ───────────────────────────────────────────────────────────

/// A player entry in the lobby roster (CPU players included).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LobbyPlayer {
    pub username: String,
    pub team: Option<TeamSide>,
    pub is_captain: bool,
    pub in_match: bool,
}

/// Full lobby view sent on every roster or settings change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LobbySnapshot {
    pub players: Vec<LobbyPlayer>,
    pub host: String,
    pub mode: MatchMode,
    pub overs: u32,
    pub wickets: u32,
    pub teams: BTreeMap<TeamSide, Vec<String>>,
    pub team_names: BTreeMap<TeamSide, String>,
    pub captains: BTreeMap<TeamSide, Option<String>>,
    pub room_code: String,
    pub cpu_enabled: bool,
    pub cpu_only: bool,
    pub cpu_count: u32,
    pub host_plays: bool,
}

// ── Toss ────────────────────────────────────────────────────────────

/// Toss progress as known from the latest toss frame.
///
/// `TOSS_CALLER`/`TOSS_WAITING` only fill `caller`; `TOSS_RESULT` adds the
/// call, coin and winner; `TOSS_DECISION` carries the winner's choice and the
/// resulting batting order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TossSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<TossCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<TossChoice>,
    pub batting_first: Vec<String>,
    pub bowling_first: Vec<String>,
}

// ── Match ───────────────────────────────────────────────────────────

/// One row of the live batting card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BattingCardEntry {
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub sr: f64,
    pub dismissal: Option<String>,
    pub is_out: bool,
}

/// One row of the live bowling card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BowlingCardEntry {
    pub name: String,
    pub overs: String,
    pub runs: u32,
    pub wickets: u32,
    pub econ: f64,
}

/// A candidate offered to a picking captain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PickOption {
    pub player: String,
    pub disabled: bool,
}

/// Latest full match view.
///
/// Each `MATCH_STATE` frame replaces the previous snapshot wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MatchSnapshot {
    pub mode: MatchMode,
    pub innings: u8,
    pub batting_side: Vec<String>,
    pub bowling_side: Vec<String>,
    pub striker: Option<String>,
    pub non_striker: Option<String>,
    pub bowler: Option<String>,
    pub total_runs: u32,
    pub wickets: u32,
    pub overs: String,
    pub total_overs: u32,
    pub target: Option<u32>,
    pub batting_card: Vec<BattingCardEntry>,
    pub bowling_card: Vec<BowlingCardEntry>,
    pub bat_ready: bool,
    pub bowl_ready: bool,
    pub needs_batter_choice: bool,
    pub needs_bowler_choice: bool,
    pub available_batters: Vec<PickOption>,
    pub available_bowlers: Vec<PickOption>,
    pub batting_captain: Option<String>,
    pub bowling_captain: Option<String>,
    pub my_role: PlayerRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament: Option<StandingsSnapshot>,
}

impl MatchSnapshot {
    /// Returns `true` while a captain must pick the next batter or bowler.
    pub fn pick_pending(&self) -> bool {
        self.needs_batter_choice || self.needs_bowler_choice
    }

    /// Returns `true` once the server holds the local player's move for this ball.
    pub fn my_move_recorded(&self) -> bool {
        match self.my_role {
            PlayerRole::Batting => self.bat_ready,
            PlayerRole::Bowling => self.bowl_ready,
            _ => false,
        }
    }
}

/// Outcome of a single delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BallResult {
    pub ball_num: u32,
    pub over_display: String,
    pub striker: String,
    pub bowler: String,
    pub bat_move: u8,
    pub bowl_move: u8,
    pub runs: u32,
    pub is_out: bool,
    pub is_four: bool,
    pub is_six: bool,
    pub innings_runs: u32,
    pub innings_wickets: u32,
    pub innings_overs: String,
    pub over_complete: bool,
    pub innings_complete: bool,
    pub target_chased: bool,
    /// `50` or `100` when the striker just crossed that score.
    pub milestone: Option<u32>,
    pub hat_trick: bool,
}

/// Final result sent when a match ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ScorecardSnapshot {
    pub winner: Option<String>,
    pub result_text: String,
    pub scorecard_1: serde_json::Value,
    pub scorecard_2: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorecard_3: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorecard_4: Option<serde_json::Value>,
    pub side_a: Vec<String>,
    pub side_b: Vec<String>,
    pub bat_team_1: Vec<String>,
    pub bat_team_2: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bat_team_3: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bat_team_4: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_over_timeline: Option<serde_json::Value>,
    /// Player of the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potm: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament: Option<StandingsSnapshot>,
}

// ── Tournament ──────────────────────────────────────────────────────

/// One row of the tournament points table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StandingRow {
    pub player: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub points: i32,
    /// Net run rate.
    pub nrr: f64,
}

/// A scheduled or playoff fixture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UpcomingMatch {
    pub label: String,
    pub teams: Vec<String>,
}

/// Tournament table and schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StandingsSnapshot {
    pub standings: Vec<StandingRow>,
    pub phase: String,
    pub info: serde_json::Value,
    pub upcoming_matches: Vec<UpcomingMatch>,
}

/// Final tournament payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TournamentOverPayload {
    pub champion: Option<String>,
    pub standings: Vec<StandingRow>,
    pub awards: serde_json::Value,
    /// Identifier of the persisted tournament record, when the server saved one.
    pub tournament_id: Option<String>,
    pub info: serde_json::Value,
}

/// Announcement that a captain must pick the next batter or bowler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CaptainPickAnnouncement {
    pub captain: String,
    pub options: Vec<PickOption>,
    pub timeout: u32,
}

// ── Messages ────────────────────────────────────────────────────────

/// Frames pushed by the server over the room socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Lobby roster or settings changed (boxed to reduce enum size).
    LobbyUpdate(Box<LobbySnapshot>),
    /// The local player must call the toss.
    TossCaller(TossSnapshot),
    /// Someone else is calling the toss.
    TossWaiting(TossSnapshot),
    /// The coin landed.
    TossResult(TossSnapshot),
    /// The local player won the toss and must choose to bat or bowl.
    TossChoose,
    /// The toss winner chose; the first innings starts shortly.
    TossDecision(TossSnapshot),
    /// Full match snapshot (boxed to reduce enum size).
    MatchState(Box<MatchSnapshot>),
    /// Outcome of the last delivery.
    BallResult(BallResult),
    /// Authoritative countdown hint for the local player.
    Countdown { role: CountdownRole, seconds: u32 },
    /// The first innings (or a super-over innings) finished.
    InningsBreak {
        #[serde(default)]
        scorecard: serde_json::Value,
        #[serde(default)]
        target: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        msg: Option<String>,
    },
    /// The match finished (boxed to reduce enum size).
    MatchOver(Box<ScorecardSnapshot>),
    /// The host cancelled the match.
    MatchCancelled {
        msg: String,
        #[serde(default)]
        tournament: Option<StandingsSnapshot>,
    },
    /// Updated tournament table.
    TournamentStandings(StandingsSnapshot),
    /// A playoff fixture is about to start.
    TournamentPhase {
        phase: String,
        #[serde(rename = "match", default)]
        fixture: Vec<String>,
    },
    /// The tournament finished (boxed to reduce enum size).
    TournamentOver(Box<TournamentOverPayload>),
    /// Server-reported rule violation or refusal.
    Error { msg: String },
    /// The server played a move on behalf of an unresponsive player.
    AutoMoveWarning {
        player: String,
        strikes: u32,
        max: u32,
    },
    /// A captain must pick the next batter.
    ChooseBatter(CaptainPickAnnouncement),
    /// A captain must pick the next bowler.
    ChooseBowler(CaptainPickAnnouncement),
}

/// Actions sent from the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientAction {
    /// Host updates room settings. Omitted fields keep their current value.
    Configure {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<MatchMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overs: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wickets: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        host_plays: Option<bool>,
    },
    /// Host moves a player to a team.
    AssignTeam { player: String, team: TeamSide },
    /// Captain or host renames a team.
    SetTeamName { team: TeamSide, name: String },
    /// Host appoints a captain.
    SetCaptain { team: TeamSide, captain: String },
    /// Host clears all team assignments.
    ResetTeams,
    /// Host adds a CPU player.
    AddCpu,
    /// Host removes the most recently added CPU player.
    RemoveCpu,
    /// Host starts a single match.
    StartMatch,
    /// Host starts a round-robin tournament.
    StartTournament,
    /// Number picked for the next ball (0..=6).
    GameMove {
        #[serde(rename = "move")]
        number: u8,
    },
    /// Batting captain picks the next batter.
    PickBatter { player: String },
    /// Bowling captain picks the next bowler.
    PickBowler { player: String },
    /// Toss caller calls the coin.
    TossCall { call: TossCall },
    /// Toss winner elects to bat or bowl.
    TossChoice { choice: TossChoice },
    /// Host cancels the running match.
    CancelMatch,
}

impl ClientAction {
    /// Returns `true` for actions that answer a decision point and therefore
    /// pass through the action gate.
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            Self::GameMove { .. }
                | Self::PickBatter { .. }
                | Self::PickBowler { .. }
                | Self::TossCall { .. }
                | Self::TossChoice { .. }
        )
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
    fn game_move_uses_move_field() {
        let json = serde_json::to_value(ClientAction::GameMove { number: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "GAME_MOVE", "move": 4 }));
    }

    #[test]
    fn unit_actions_serialize_as_bare_tag() {
        let json = serde_json::to_value(ClientAction::CancelMatch).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "CANCEL_MATCH" }));
        let json = serde_json::to_value(ClientAction::AddCpu).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "ADD_CPU" }));
    }

    #[test]
    fn configure_omits_unset_fields() {
        let json = serde_json::to_value(ClientAction::Configure {
            mode: Some(MatchMode::Team),
            overs: Some(3),
            wickets: None,
            host_plays: None,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "action": "CONFIGURE", "mode": "team", "overs": 3 })
        );
    }

    #[test]
    fn player_role_predicates() {
        assert!(PlayerRole::Batting.is_ball_active());
        assert!(PlayerRole::Bowling.is_active());
        assert!(PlayerRole::BowlingCaptainPick.is_captain_pick());
        assert!(!PlayerRole::Waiting.is_active());
        assert!(!PlayerRole::NonStriker.is_active());
    }

    #[test]
    fn decision_actions_are_flagged() {
        assert!(ClientAction::GameMove { number: 1 }.is_decision());
        assert!(ClientAction::TossChoice {
            choice: TossChoice::Bat
        }
        .is_decision());
        assert!(!ClientAction::StartMatch.is_decision());
        assert!(!ClientAction::CancelMatch.is_decision());
    }

    #[test]
    fn my_move_recorded_follows_role() {
        let snapshot = MatchSnapshot {
            my_role: PlayerRole::Bowling,
            bowl_ready: true,
            ..MatchSnapshot::default()
        };
        assert!(snapshot.my_move_recorded());
        let snapshot = MatchSnapshot {
            my_role: PlayerRole::Batting,
            bowl_ready: true,
            ..MatchSnapshot::default()
        };
        assert!(!snapshot.my_move_recorded());
    }
}
