#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Deterministic tests of the session state machine.
//!
//! Every test drives a [`MatchSession`] with server frames shaped like the real
//! game server's and advances a virtual clock by hand, so no test sleeps.

mod common;

use std::time::Duration;

use cricket_session_client::close_codes::{disposition_for, CloseDisposition};
use cricket_session_client::countdown::{BallRole, Countdown, PickRole};
use cricket_session_client::effects::EffectKind;
use cricket_session_client::notice::BannerKind;
use cricket_session_client::protocol::{ClientAction, TossCall, TossChoice};
use cricket_session_client::timers::TimerSlot;
use cricket_session_client::{
    ClientEvent, GateRejection, MatchSession, ScreenKind, ScreenState, SessionTimings,
};
use serde_json::Value;
use tokio::time::Instant;

use common::{
    auto_move_warning, ball_result, countdown, error, lobby_update, match_cancelled, match_over,
    match_state, standings, toss_caller, toss_choose, toss_decision, toss_result, toss_waiting,
    tournament_standings,
};

/// A session plus a hand-driven clock.
struct Harness {
    session: MatchSession,
    now: Instant,
}

impl Harness {
    fn new() -> Self {
        Self {
            session: MatchSession::new(SessionTimings::default()),
            now: Instant::now(),
        }
    }

    fn push(&mut self, frame: Value) {
        self.session.handle_frame(&frame.to_string(), self.now);
    }

    fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        while let Some(deadline) = self.session.next_deadline() {
            if deadline > target {
                break;
            }
            self.session.fire_due(deadline);
        }
        self.now = target;
    }

    fn kind(&self) -> ScreenKind {
        self.session.screen().kind()
    }
}

// ════════════════════════════════════════════════════════════════════
// Scenarios
// ════════════════════════════════════════════════════════════════════

#[test]
fn toss_flow_reaches_game_after_decision_delay() {
    let mut h = Harness::new();
    h.push(lobby_update("AB12CD", "p1", &["p1", "p2"]));
    h.push(toss_caller("p1"));
    assert_eq!(h.kind(), ScreenKind::TossCall);

    h.push(toss_result("p1", "heads", "heads", "p1"));
    assert_eq!(h.kind(), ScreenKind::TossResult);

    h.push(toss_choose());
    assert_eq!(h.kind(), ScreenKind::TossChoose);
    let choice = ClientAction::TossChoice {
        choice: TossChoice::Bat,
    };
    assert_eq!(h.session.submit(&choice), Ok(()));

    h.push(toss_decision("p1", "bat", &["p1"], &["p2"]));
    assert_eq!(h.kind(), ScreenKind::TossDecision);

    h.advance(Duration::from_millis(2900));
    assert_eq!(h.kind(), ScreenKind::TossDecision);
    h.advance(Duration::from_millis(100));
    assert_eq!(h.session.screen(), &ScreenState::Game(None));
}

#[test]
fn cancellation_during_toss_decision_wins_over_game() {
    let mut h = Harness::new();
    h.push(lobby_update("AB12CD", "p1", &["p1", "p2"]));
    h.push(toss_decision("p1", "bowl", &["p2"], &["p1"]));
    h.advance(Duration::from_secs(1));

    h.push(match_cancelled("Host cancelled the match", None));
    h.advance(Duration::from_secs(5));

    assert_eq!(h.kind(), ScreenKind::Lobby);
    let events = h.session.take_events();
    assert!(events.contains(&ClientEvent::Banner {
        kind: BannerKind::MatchCancelled,
        text: "Host cancelled the match".into()
    }));
    assert!(!events.contains(&ClientEvent::ScreenChanged {
        from: ScreenKind::TossDecision,
        to: ScreenKind::Game
    }));
}

#[test]
fn cancellation_with_tournament_shows_standings() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(match_cancelled("Host cancelled the match", Some(standings("group"))));
    match h.session.screen() {
        ScreenState::Standings(table) => assert_eq!(table.standings.len(), 2),
        other => panic!("expected standings, got {other:?}"),
    }
    assert_eq!(
        h.session.banner().map(|b| b.text.as_str()),
        Some("Host cancelled the match")
    );
}

#[test]
fn forced_logout_resets_everything() {
    let mut h = Harness::new();
    h.push(lobby_update("AB12CD", "p1", &["p1", "p2"]));
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(countdown("bat", 10));

    let disposition = disposition_for(Some(4001));
    assert_eq!(disposition, CloseDisposition::ForceLogout);
    h.session.connection_closed(disposition, Some("Invalid token"), h.now);

    assert_eq!(h.session.screen(), &ScreenState::Home);
    assert!(h.session.lobby().is_none());
    assert!(h.session.ball_countdown().is_none());
    assert_eq!(h.session.next_deadline(), None);
}

#[test]
fn duplicate_submission_sends_one_move() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(countdown("bat", 10));

    let four = ClientAction::GameMove { number: 4 };
    assert_eq!(h.session.submit(&four), Ok(()));
    assert_eq!(
        h.session.submit(&four),
        Err(GateRejection::AlreadySubmitted)
    );

    // A partial countdown is not a new decision point.
    h.push(countdown("bat", 6));
    assert_eq!(
        h.session.submit(&four),
        Err(GateRejection::AlreadySubmitted)
    );

    h.push(ball_result(4, false, None));
    h.advance(Duration::from_secs(2));
    h.push(countdown("bat", 10));
    assert_eq!(h.session.submit(&four), Ok(()));
}

// ════════════════════════════════════════════════════════════════════
// Properties
// ════════════════════════════════════════════════════════════════════

#[test]
fn identical_match_state_is_idempotent() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BOWLING"));
    let first = h.session.screen().clone();
    h.push(match_state("asha", "ben", "BOWLING"));
    assert_eq!(h.session.screen(), &first);
}

#[test]
fn reseeding_keeps_a_single_ball_countdown() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(countdown("bat", 10));
    h.advance(Duration::from_millis(1500));
    assert_eq!(h.session.ball_countdown().map(|c| c.remaining), Some(9));

    h.push(countdown("bat", 3));
    assert_eq!(
        h.session.ball_countdown(),
        Some(Countdown {
            role: BallRole::Bat,
            remaining: 3
        })
    );

    // Had the first timer survived, this would still show a value.
    h.advance(Duration::from_secs(3));
    assert_eq!(h.session.ball_countdown(), None);
    assert!(!h.session.is_pending(TimerSlot::BallCountdownTick));
}

#[test]
fn century_effect_beats_six() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(ball_result(6, false, Some(100)));
    assert_eq!(h.session.effect().map(|e| e.kind), Some(EffectKind::Century));
}

#[test]
fn new_ball_supersedes_playing_effect() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(ball_result(6, false, None));
    h.advance(Duration::from_millis(600));
    h.push(ball_result(0, true, None));
    assert_eq!(h.session.effect().map(|e| e.kind), Some(EffectKind::Wicket));

    h.advance(Duration::from_millis(1199));
    assert!(h.session.effect().is_some());
    h.advance(Duration::from_millis(1));
    assert!(h.session.effect().is_none());
}

#[test]
fn effect_blocks_moves_until_it_expires() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(ball_result(1, false, None));
    h.push(countdown("bat", 10));

    let move_two = ClientAction::GameMove { number: 2 };
    assert_eq!(
        h.session.submit(&move_two),
        Err(GateRejection::EffectPlaying)
    );
    h.advance(Duration::from_millis(1200));
    assert_eq!(h.session.submit(&move_two), Ok(()));
}

#[test]
fn every_frame_from_every_screen_leaves_a_defined_screen() {
    let frames = vec![
        lobby_update("AB12CD", "p1", &["p1"]),
        toss_caller("p1"),
        toss_waiting("p2"),
        toss_result("p2", "tails", "heads", "p1"),
        toss_choose(),
        toss_decision("p1", "bat", &["p1"], &["p2"]),
        match_state("p1", "p2", "BATTING"),
        ball_result(4, false, None),
        countdown("bowl", 10),
        countdown("captain", 5),
        serde_json::json!({ "type": "INNINGS_BREAK", "scorecard": {}, "target": 20 }),
        match_over("p1", "p1 won by 3 runs"),
        match_cancelled("cancelled", None),
        tournament_standings("group"),
        serde_json::json!({ "type": "TOURNAMENT_PHASE", "phase": "final", "match": ["p1", "p2"] }),
        serde_json::json!({ "type": "TOURNAMENT_OVER", "champion": "p1", "standings": [], "awards": {}, "info": {} }),
        error("Not your turn"),
        auto_move_warning("p2", 1, 3),
        serde_json::json!({ "type": "CHOOSE_BATTER", "captain": "p1", "options": [], "timeout": 5 }),
        serde_json::json!({ "type": "CHOOSE_BOWLER", "captain": "p2", "options": [], "timeout": 5 }),
    ];

    for setup in &frames {
        for frame in &frames {
            let mut h = Harness::new();
            h.push(setup.clone());
            h.push(frame.clone());
            h.advance(Duration::from_secs(10));
            // Every transition is total: the view is always renderable.
            let view = h.session.view();
            assert_eq!(view.screen.kind(), h.kind());
        }
    }
}

#[test]
fn error_and_warning_banners_have_their_own_durations() {
    let mut h = Harness::new();
    h.push(error("Not your turn"));
    h.advance(Duration::from_millis(4499));
    assert_eq!(h.session.banner().map(|b| b.kind), Some(BannerKind::ServerError));
    h.advance(Duration::from_millis(1));
    assert!(h.session.banner().is_none());

    h.push(auto_move_warning("ben", 2, 3));
    let text = h.session.banner().map(|b| b.text.clone()).unwrap();
    assert!(text.contains("ben") && text.contains("2/3"));
    h.advance(Duration::from_secs(4));
    assert!(h.session.banner().is_none());
}

#[test]
fn match_over_then_standings_waits_for_scorecard() {
    let mut h = Harness::new();
    h.push(match_state("asha", "ben", "BATTING"));
    h.push(match_over("asha", "asha won by 4 runs"));
    h.push(tournament_standings("group"));
    assert_eq!(h.kind(), ScreenKind::Game);

    h.advance(Duration::from_millis(2500));
    assert_eq!(h.kind(), ScreenKind::Scorecard);
    assert!(h.session.standings().is_some());

    assert!(h.session.view_standings());
    assert_eq!(h.kind(), ScreenKind::Standings);
    assert!(h.session.back_to_lobby());
    assert_eq!(h.kind(), ScreenKind::Lobby);
}

#[test]
fn waiting_toss_player_cannot_call() {
    let mut h = Harness::new();
    h.push(toss_waiting("p1"));
    let call = ClientAction::TossCall {
        call: TossCall::Heads,
    };
    assert_eq!(
        h.session.submit(&call),
        Err(GateRejection::NoDecisionPending)
    );

    h.push(toss_caller("p2"));
    assert_eq!(h.session.submit(&call), Ok(()));
    assert_eq!(h.session.submit(&call), Err(GateRejection::AlreadySubmitted));
}

#[test]
fn captain_pick_flow() {
    let mut h = Harness::new();
    let mut picking = match_state("asha", "ben", "BATTING_CAPTAIN_PICK");
    picking["needs_batter_choice"] = serde_json::json!(true);
    picking["available_batters"] = serde_json::json!([
        { "player": "asha", "disabled": true },
        { "player": "chen", "disabled": false }
    ]);
    h.push(picking);
    assert_eq!(h.session.captain_countdown().map(|c| c.remaining), Some(5));

    h.push(countdown("captain", 4));
    assert_eq!(h.session.captain_countdown().map(|c| c.remaining), Some(4));

    let asha = ClientAction::PickBatter {
        player: "asha".into(),
    };
    assert_eq!(
        h.session.submit(&asha),
        Err(GateRejection::UnavailableOption("asha".into()))
    );
    let chen = ClientAction::PickBatter {
        player: "chen".into(),
    };
    assert_eq!(h.session.submit(&chen), Ok(()));
    assert_eq!(h.session.submit(&chen), Err(GateRejection::AlreadySubmitted));

    h.push(match_state("chen", "ben", "FIELDING"));
    assert_eq!(h.session.captain_countdown(), None);
}

#[test]
fn wicket_on_last_ball_gives_each_captain_their_own_pick() {
    let mut h = Harness::new();
    let mut bowling = match_state("asha", "ben", "BOWLING_CAPTAIN_PICK");
    bowling["needs_batter_choice"] = serde_json::json!(true);
    bowling["needs_bowler_choice"] = serde_json::json!(true);
    bowling["available_bowlers"] = serde_json::json!([
        { "player": "ben", "disabled": true },
        { "player": "dev", "disabled": false }
    ]);
    h.push(bowling.clone());
    assert_eq!(
        h.session.captain_countdown(),
        Some(Countdown {
            role: PickRole::Bowler,
            remaining: 5
        })
    );

    h.push(countdown("captain", 5));
    assert_eq!(
        h.session.captain_countdown().map(|c| c.role),
        Some(PickRole::Bowler)
    );
    let dev = ClientAction::PickBowler {
        player: "dev".into(),
    };
    assert_eq!(h.session.submit(&dev), Ok(()));

    let mut h = Harness::new();
    let mut batting = bowling;
    batting["my_role"] = serde_json::json!("BATTING_CAPTAIN_PICK");
    h.push(batting);
    assert_eq!(
        h.session.captain_countdown().map(|c| c.role),
        Some(PickRole::Batter)
    );
}
