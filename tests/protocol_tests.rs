#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Protocol tests for the cricket session client.
//!
//! Decodes JSON fixtures that match real game server output, and checks the
//! exact wire shape of every outbound action.

use cricket_session_client::decoder::{decode, DecodeError};
use cricket_session_client::protocol::{
    ClientAction, CountdownRole, MatchMode, PlayerRole, ServerMessage, TeamSide, TossCall,
    TossChoice,
};
use serde_json::json;

// ════════════════════════════════════════════════════════════════════
// Server fixtures
// ════════════════════════════════════════════════════════════════════

#[test]
fn lobby_update_fixture() {
    let raw = r#"{
        "type": "LOBBY_UPDATE",
        "players": [
            {"username": "asha", "team": "A", "is_captain": true, "in_match": false},
            {"username": "CPU 1", "team": "B", "is_captain": false, "in_match": false}
        ],
        "host": "asha",
        "mode": "team",
        "overs": 5,
        "wickets": 2,
        "teams": {"A": ["asha"], "B": ["CPU 1"]},
        "team_names": {"A": "Strikers", "B": "Titans"},
        "captains": {"A": "asha", "B": null},
        "room_code": "QX7K2M",
        "cpu_enabled": true,
        "cpu_only": false,
        "cpu_count": 1,
        "host_plays": true
    }"#;
    let ServerMessage::LobbyUpdate(lobby) = decode(raw).unwrap() else {
        panic!("expected LobbyUpdate");
    };
    assert_eq!(lobby.mode, MatchMode::Team);
    assert_eq!(lobby.players[0].team, Some(TeamSide::A));
    assert!(lobby.players[0].is_captain);
    assert_eq!(lobby.team_names[&TeamSide::B], "Titans");
    assert_eq!(lobby.captains[&TeamSide::B], None);
    assert_eq!(lobby.cpu_count, 1);
}

#[test]
fn lobby_update_tolerates_unknown_mode_and_extra_fields() {
    let raw = r#"{"type": "LOBBY_UPDATE", "mode": "gully", "room_code": "AB12CD", "theme": "night"}"#;
    let ServerMessage::LobbyUpdate(lobby) = decode(raw).unwrap() else {
        panic!("expected LobbyUpdate");
    };
    assert_eq!(lobby.mode, MatchMode::Other);
    assert_eq!(lobby.room_code, "AB12CD");
    assert!(lobby.players.is_empty());
}

#[test]
fn toss_fixtures() {
    let msg = decode(r#"{"type": "TOSS_CALLER", "caller": "asha"}"#).unwrap();
    assert!(matches!(msg, ServerMessage::TossCaller(ref t) if t.caller.as_deref() == Some("asha")));

    let msg = decode(r#"{"type": "TOSS_RESULT", "caller": "asha", "call": "tails", "coin": "heads", "winner": "ben"}"#)
        .unwrap();
    let ServerMessage::TossResult(toss) = msg else {
        panic!("expected TossResult");
    };
    assert_eq!(toss.call, Some(TossCall::Tails));
    assert_eq!(toss.winner.as_deref(), Some("ben"));

    assert_eq!(
        decode(r#"{"type": "TOSS_CHOOSE"}"#).unwrap(),
        ServerMessage::TossChoose
    );

    let msg = decode(
        r#"{"type": "TOSS_DECISION", "winner": "ben", "choice": "bowl",
            "batting_first": ["asha"], "bowling_first": ["ben"]}"#,
    )
    .unwrap();
    let ServerMessage::TossDecision(toss) = msg else {
        panic!("expected TossDecision");
    };
    assert_eq!(toss.choice, Some(TossChoice::Bowl));
    assert_eq!(toss.batting_first, vec!["asha".to_string()]);
}

#[test]
fn match_state_fixture() {
    let raw = r#"{
        "type": "MATCH_STATE",
        "mode": "team",
        "innings": 2,
        "batting_side": ["asha", "chen"],
        "bowling_side": ["ben", "dev"],
        "striker": "asha",
        "non_striker": "chen",
        "bowler": "dev",
        "total_runs": 27,
        "wickets": 1,
        "overs": "2.4",
        "total_overs": 5,
        "target": 41,
        "batting_card": [
            {"name": "asha", "runs": 19, "balls": 9, "fours": 2, "sixes": 1, "sr": 211.11, "dismissal": null, "is_out": false}
        ],
        "bowling_card": [
            {"name": "dev", "overs": "0.4", "runs": 6, "wickets": 0, "econ": 9.0}
        ],
        "bat_ready": true,
        "bowl_ready": false,
        "needs_batter_choice": false,
        "needs_bowler_choice": true,
        "available_batters": [],
        "available_bowlers": [{"player": "ben", "disabled": true}, {"player": "dev", "disabled": false}],
        "batting_captain": "asha",
        "bowling_captain": "ben",
        "my_role": "BOWLING_CAPTAIN_PICK",
        "tournament": {"standings": [], "phase": "league", "info": {}, "upcoming_matches": []}
    }"#;
    let ServerMessage::MatchState(snapshot) = decode(raw).unwrap() else {
        panic!("expected MatchState");
    };
    assert_eq!(snapshot.my_role, PlayerRole::BowlingCaptainPick);
    assert_eq!(snapshot.target, Some(41));
    assert!(snapshot.pick_pending());
    assert_eq!(snapshot.available_bowlers.len(), 2);
    assert!(snapshot.available_bowlers[0].disabled);
    assert_eq!(snapshot.batting_card[0].sixes, 1);
    assert_eq!(
        snapshot.tournament.as_ref().map(|t| t.phase.as_str()),
        Some("league")
    );
}

#[test]
fn ball_result_fixture() {
    let raw = r#"{
        "type": "BALL_RESULT", "ball_num": 12, "over_display": "2.0",
        "striker": "asha", "bowler": "ben", "bat_move": 6, "bowl_move": 2,
        "runs": 6, "is_out": false, "is_four": false, "is_six": true,
        "innings_runs": 52, "innings_wickets": 0, "innings_overs": "2.0",
        "over_complete": true, "innings_complete": false, "target_chased": false,
        "milestone": 50, "hat_trick": false
    }"#;
    let ServerMessage::BallResult(ball) = decode(raw).unwrap() else {
        panic!("expected BallResult");
    };
    assert!(ball.is_six);
    assert!(ball.over_complete);
    assert_eq!(ball.milestone, Some(50));
}

#[test]
fn countdown_fixtures() {
    assert_eq!(
        decode(r#"{"type": "COUNTDOWN", "role": "bat", "seconds": 10}"#).unwrap(),
        ServerMessage::Countdown {
            role: CountdownRole::Bat,
            seconds: 10
        }
    );
    assert_eq!(
        decode(r#"{"type": "COUNTDOWN", "role": "captain", "seconds": 5}"#).unwrap(),
        ServerMessage::Countdown {
            role: CountdownRole::Captain,
            seconds: 5
        }
    );
}

#[test]
fn match_over_fixture_keeps_display_payloads() {
    let raw = r#"{
        "type": "MATCH_OVER",
        "winner": "asha",
        "result_text": "asha won by 12 runs",
        "scorecard_1": {"batting": [{"name": "asha", "runs": 40}], "bowling": [], "total_runs": 40},
        "scorecard_2": {"batting": [], "bowling": [], "total_runs": 28},
        "scorecard_3": {"total_runs": 7},
        "side_a": ["asha"],
        "side_b": ["ben"],
        "bat_team_1": ["asha"],
        "bat_team_2": ["ben"],
        "potm": {"player": "asha", "runs": 40, "wickets": 1}
    }"#;
    let ServerMessage::MatchOver(result) = decode(raw).unwrap() else {
        panic!("expected MatchOver");
    };
    assert_eq!(result.winner.as_deref(), Some("asha"));
    assert_eq!(result.scorecard_1["batting"][0]["runs"], 40);
    assert_eq!(result.scorecard_3, Some(json!({"total_runs": 7})));
    assert!(result.scorecard_4.is_none());
    assert!(result.tournament.is_none());
}

#[test]
fn match_cancelled_fixtures() {
    let msg = decode(r#"{"type": "MATCH_CANCELLED", "msg": "Match cancelled by host."}"#).unwrap();
    assert_eq!(
        msg,
        ServerMessage::MatchCancelled {
            msg: "Match cancelled by host.".into(),
            tournament: None
        }
    );

    let msg = decode(
        r#"{"type": "MATCH_CANCELLED", "msg": "Match cancelled by host.",
            "tournament": {"standings": [{"player": "asha", "points": 2, "nrr": 0.5}], "phase": "league"}}"#,
    )
    .unwrap();
    let ServerMessage::MatchCancelled {
        tournament: Some(table),
        ..
    } = msg
    else {
        panic!("expected standings on cancellation");
    };
    assert_eq!(table.standings[0].points, 2);
}

#[test]
fn tournament_fixtures() {
    let msg = decode(
        r#"{"type": "TOURNAMENT_STANDINGS",
            "standings": [{"player": "asha", "played": 3, "won": 2, "lost": 1, "tied": 0, "points": 4, "nrr": -0.35}],
            "phase": "league", "info": {"format": "round_robin"},
            "upcoming_matches": [{"label": "Match 4", "teams": ["ben", "chen"]}]}"#,
    )
    .unwrap();
    let ServerMessage::TournamentStandings(table) = msg else {
        panic!("expected TournamentStandings");
    };
    assert_eq!(table.upcoming_matches[0].teams, vec!["ben", "chen"]);
    assert!(table.standings[0].nrr < 0.0);

    let msg = decode(r#"{"type": "TOURNAMENT_PHASE", "phase": "final", "match": ["asha", "chen"]}"#)
        .unwrap();
    assert_eq!(
        msg,
        ServerMessage::TournamentPhase {
            phase: "final".into(),
            fixture: vec!["asha".into(), "chen".into()]
        }
    );

    let msg = decode(
        r#"{"type": "TOURNAMENT_OVER", "champion": "asha", "standings": [],
            "awards": {"most_runs": {"player": "asha", "value": 112}},
            "tournament_id": "6650f0c2", "info": {}}"#,
    )
    .unwrap();
    let ServerMessage::TournamentOver(payload) = msg else {
        panic!("expected TournamentOver");
    };
    assert_eq!(payload.champion.as_deref(), Some("asha"));
    assert_eq!(payload.tournament_id.as_deref(), Some("6650f0c2"));
    assert_eq!(payload.awards["most_runs"]["value"], 112);
}

#[test]
fn notice_fixtures() {
    assert_eq!(
        decode(r#"{"type": "ERROR", "msg": "Only the host can start the match."}"#).unwrap(),
        ServerMessage::Error {
            msg: "Only the host can start the match.".into()
        }
    );
    assert_eq!(
        decode(r#"{"type": "AUTO_MOVE_WARNING", "player": "ben", "strikes": 2, "max": 3}"#).unwrap(),
        ServerMessage::AutoMoveWarning {
            player: "ben".into(),
            strikes: 2,
            max: 3
        }
    );
}

#[test]
fn captain_pick_announcement_fixture() {
    let msg = decode(
        r#"{"type": "CHOOSE_BATTER", "captain": "asha",
            "options": [{"player": "chen", "disabled": false}], "timeout": 5}"#,
    )
    .unwrap();
    let ServerMessage::ChooseBatter(announcement) = msg else {
        panic!("expected ChooseBatter");
    };
    assert_eq!(announcement.captain, "asha");
    assert_eq!(announcement.timeout, 5);
}

// ════════════════════════════════════════════════════════════════════
// Decode failures
// ════════════════════════════════════════════════════════════════════

#[test]
fn decode_failures_are_classified() {
    assert!(matches!(decode("not json"), Err(DecodeError::Malformed(_))));
    assert!(matches!(
        decode(r#"{"msg": "no type"}"#),
        Err(DecodeError::MissingType)
    ));
    assert!(matches!(
        decode(r#"{"type": "CONFETTI"}"#),
        Err(DecodeError::UnknownType(t)) if t == "CONFETTI"
    ));
    assert!(matches!(
        decode(r#"{"type": "COUNTDOWN", "role": "bat", "seconds": "ten"}"#),
        Err(DecodeError::Malformed(_))
    ));
}

// ════════════════════════════════════════════════════════════════════
// Outbound actions
// ════════════════════════════════════════════════════════════════════

#[test]
fn decision_actions_wire_shape() {
    let cases = [
        (
            ClientAction::GameMove { number: 0 },
            json!({"action": "GAME_MOVE", "move": 0}),
        ),
        (
            ClientAction::PickBatter {
                player: "chen".into(),
            },
            json!({"action": "PICK_BATTER", "player": "chen"}),
        ),
        (
            ClientAction::PickBowler {
                player: "dev".into(),
            },
            json!({"action": "PICK_BOWLER", "player": "dev"}),
        ),
        (
            ClientAction::TossCall {
                call: TossCall::Heads,
            },
            json!({"action": "TOSS_CALL", "call": "heads"}),
        ),
        (
            ClientAction::TossChoice {
                choice: TossChoice::Bat,
            },
            json!({"action": "TOSS_CHOICE", "choice": "bat"}),
        ),
    ];
    for (action, expected) in cases {
        assert!(action.is_decision());
        assert_eq!(serde_json::to_value(&action).unwrap(), expected);
    }
}

#[test]
fn lobby_actions_wire_shape() {
    let cases = [
        (
            ClientAction::AssignTeam {
                player: "ben".into(),
                team: TeamSide::B,
            },
            json!({"action": "ASSIGN_TEAM", "player": "ben", "team": "B"}),
        ),
        (
            ClientAction::SetTeamName {
                team: TeamSide::A,
                name: "Strikers".into(),
            },
            json!({"action": "SET_TEAM_NAME", "team": "A", "name": "Strikers"}),
        ),
        (
            ClientAction::SetCaptain {
                team: TeamSide::A,
                captain: "asha".into(),
            },
            json!({"action": "SET_CAPTAIN", "team": "A", "captain": "asha"}),
        ),
        (ClientAction::ResetTeams, json!({"action": "RESET_TEAMS"})),
        (ClientAction::RemoveCpu, json!({"action": "REMOVE_CPU"})),
        (ClientAction::StartMatch, json!({"action": "START_MATCH"})),
        (
            ClientAction::StartTournament,
            json!({"action": "START_TOURNAMENT"}),
        ),
        (
            ClientAction::Configure {
                mode: Some(MatchMode::OneVsOne),
                overs: None,
                wickets: Some(3),
                host_plays: Some(false),
            },
            json!({"action": "CONFIGURE", "mode": "1v1", "wickets": 3, "host_plays": false}),
        ),
    ];
    for (action, expected) in cases {
        assert!(!action.is_decision());
        assert_eq!(serde_json::to_value(&action).unwrap(), expected);
    }
}
