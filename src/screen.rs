//! Screen states.
//!
//! [`ScreenState`] is a closed sum type: each variant carries only the data
//! the screen renders, so a state such as "Lobby with a scorecard" cannot be
//! expressed. `Game(None)` is the game screen before its first match
//! snapshot arrives. [`ScreenKind`] is the payload-free discriminant used in
//! notifications.

use std::fmt;

use crate::protocol::{
    LobbySnapshot, MatchSnapshot, ScorecardSnapshot, StandingsSnapshot, TossSnapshot,
    TournamentOverPayload,
};

/// The screen currently shown to the player.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScreenState {
    /// No room entered, or the room was lost.
    #[default]
    Home,
    /// Pre-match lobby.
    Lobby(Box<LobbySnapshot>),
    /// Waiting for (or making) the toss call.
    TossCall(TossSnapshot),
    /// The coin landed.
    TossResult(TossSnapshot),
    /// The local player won the toss and picks bat or bowl.
    TossChoose,
    /// The winner's decision is on screen before play starts.
    TossDecision(TossSnapshot),
    /// Live match. `None` until the first `MATCH_STATE` arrives.
    Game(Option<Box<MatchSnapshot>>),
    /// Final scorecard.
    Scorecard(Box<ScorecardSnapshot>),
    /// Tournament table.
    Standings(StandingsSnapshot),
    /// Tournament result.
    TournamentOver(Box<TournamentOverPayload>),
}

/// Payload-free discriminant of [`ScreenState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Home,
    Lobby,
    TossCall,
    TossResult,
    TossChoose,
    TossDecision,
    Game,
    Scorecard,
    Standings,
    TournamentOver,
}

impl ScreenState {
    /// The discriminant of this state.
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Home => ScreenKind::Home,
            Self::Lobby(_) => ScreenKind::Lobby,
            Self::TossCall(_) => ScreenKind::TossCall,
            Self::TossResult(_) => ScreenKind::TossResult,
            Self::TossChoose => ScreenKind::TossChoose,
            Self::TossDecision(_) => ScreenKind::TossDecision,
            Self::Game(_) => ScreenKind::Game,
            Self::Scorecard(_) => ScreenKind::Scorecard,
            Self::Standings(_) => ScreenKind::Standings,
            Self::TournamentOver(_) => ScreenKind::TournamentOver,
        }
    }

    /// The live match snapshot, if this is the Game screen and one has arrived.
    pub fn match_snapshot(&self) -> Option<&MatchSnapshot> {
        match self {
            Self::Game(Some(snapshot)) => Some(snapshot),
            _ => None,
        }
    }
}

impl ScreenKind {
    /// Returns `true` for the four toss screens.
    pub fn is_toss(&self) -> bool {
        matches!(
            self,
            Self::TossCall | Self::TossResult | Self::TossChoose | Self::TossDecision
        )
    }

    /// Returns `true` for screens a standings push must not interrupt.
    pub fn blocks_standings(&self) -> bool {
        self.is_toss() || matches!(self, Self::Game | Self::Scorecard)
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::Lobby => "lobby",
            Self::TossCall => "toss_call",
            Self::TossResult => "toss_result",
            Self::TossChoose => "toss_choose",
            Self::TossDecision => "toss_decision",
            Self::Game => "game",
            Self::Scorecard => "scorecard",
            Self::Standings => "standings",
            Self::TournamentOver => "tournament_over",
        };
        f.write_str(name)
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
    fn default_is_home() {
        assert_eq!(ScreenState::default().kind(), ScreenKind::Home);
    }

    #[test]
    fn standings_blocked_by_play_screens() {
        assert!(ScreenKind::Game.blocks_standings());
        assert!(ScreenKind::TossChoose.blocks_standings());
        assert!(ScreenKind::Scorecard.blocks_standings());
        assert!(!ScreenKind::Lobby.blocks_standings());
        assert!(!ScreenKind::Home.blocks_standings());
        assert!(!ScreenKind::TournamentOver.blocks_standings());
    }

    #[test]
    fn match_snapshot_only_on_game() {
        let snapshot = MatchSnapshot {
            total_runs: 42,
            ..MatchSnapshot::default()
        };
        let screen = ScreenState::Game(Some(Box::new(snapshot)));
        assert_eq!(screen.match_snapshot().map(|s| s.total_runs), Some(42));
        assert!(ScreenState::Game(None).match_snapshot().is_none());
        assert!(ScreenState::TossChoose.match_snapshot().is_none());
    }
}
