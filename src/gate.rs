//! Action gate.
//!
//! At most one decision action (a ball move, a captain pick, a toss call or a
//! toss choice) may leave the client per decision point. The gate closes on
//! the first admitted action and reopens only when the session observes a new
//! decision point. While a transient effect is on screen the gate refuses
//! every decision action without closing.
//!
//! Lobby and host actions are not decision actions and always pass.

use thiserror::Error;

use crate::protocol::{ClientAction, PickOption};

/// Why the gate refused an action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateRejection {
    /// An action was already sent for the current decision point.
    #[error("an action was already submitted for this decision point")]
    AlreadySubmitted,
    /// A celebration for the previous ball is still playing.
    #[error("wait for the current animation to finish")]
    EffectPlaying,
    /// The local player has nothing to decide right now.
    #[error("no decision is pending")]
    NoDecisionPending,
    /// The action does not answer the pending decision.
    #[error("a different decision is pending")]
    WrongDecision,
    /// Ball moves are `0..=6`.
    #[error("move {0} is outside 0..=6")]
    InvalidMove(u8),
    /// The picked player is not offered, or is disabled.
    #[error("`{0}` is not an available choice")]
    UnavailableOption(String),
}

/// The decision the local player currently owes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPoint<'a> {
    /// A number for the next ball.
    Ball,
    /// The next batter, from these options.
    PickBatter(&'a [PickOption]),
    /// The next bowler, from these options.
    PickBowler(&'a [PickOption]),
    /// Heads or tails.
    TossCall,
    /// Bat or bowl.
    TossChoice,
}

/// One-shot latch per decision point.
#[derive(Debug, Clone, Default)]
pub struct ActionGate {
    submitted: bool,
}

impl ActionGate {
    /// An open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while no decision action has been sent for the current point.
    pub fn is_open(&self) -> bool {
        !self.submitted
    }

    /// Open the gate for a new decision point.
    pub fn reopen(&mut self) {
        if self.submitted {
            tracing::debug!("action gate reopened");
        }
        self.submitted = false;
    }

    /// Decide whether `action` may be sent, closing the gate when it is.
    ///
    /// # Errors
    ///
    /// Returns the [`GateRejection`] that applies; the gate is left unchanged.
    pub fn admit(
        &mut self,
        action: &ClientAction,
        point: Option<DecisionPoint<'_>>,
        effect_playing: bool,
    ) -> Result<(), GateRejection> {
        if !action.is_decision() {
            return Ok(());
        }
        let point = point.ok_or(GateRejection::NoDecisionPending)?;
        validate(action, point)?;
        if effect_playing {
            return Err(GateRejection::EffectPlaying);
        }
        if self.submitted {
            return Err(GateRejection::AlreadySubmitted);
        }
        self.submitted = true;
        Ok(())
    }
}

fn validate(action: &ClientAction, point: DecisionPoint<'_>) -> Result<(), GateRejection> {
    match (action, point) {
        (ClientAction::GameMove { number }, DecisionPoint::Ball) => {
            if *number > 6 {
                Err(GateRejection::InvalidMove(*number))
            } else {
                Ok(())
            }
        }
        (ClientAction::PickBatter { player }, DecisionPoint::PickBatter(options))
        | (ClientAction::PickBowler { player }, DecisionPoint::PickBowler(options)) => {
            let offered = options.iter().any(|o| o.player == *player && !o.disabled);
            if offered {
                Ok(())
            } else {
                Err(GateRejection::UnavailableOption(player.clone()))
            }
        }
        (ClientAction::TossCall { .. }, DecisionPoint::TossCall)
        | (ClientAction::TossChoice { .. }, DecisionPoint::TossChoice) => Ok(()),
        _ => Err(GateRejection::WrongDecision),
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
    use crate::protocol::TossCall;

    fn options() -> Vec<PickOption> {
        vec![
            PickOption {
                player: "asha".into(),
                disabled: false,
            },
            PickOption {
                player: "ben".into(),
                disabled: true,
            },
        ]
    }

    #[test]
    fn second_move_for_same_point_is_rejected() {
        let mut gate = ActionGate::new();
        let action = ClientAction::GameMove { number: 4 };
        assert_eq!(gate.admit(&action, Some(DecisionPoint::Ball), false), Ok(()));
        assert_eq!(
            gate.admit(&action, Some(DecisionPoint::Ball), false),
            Err(GateRejection::AlreadySubmitted)
        );
        gate.reopen();
        assert_eq!(gate.admit(&action, Some(DecisionPoint::Ball), false), Ok(()));
    }

    #[test]
    fn effect_blocks_without_closing() {
        let mut gate = ActionGate::new();
        let action = ClientAction::GameMove { number: 1 };
        assert_eq!(
            gate.admit(&action, Some(DecisionPoint::Ball), true),
            Err(GateRejection::EffectPlaying)
        );
        assert!(gate.is_open());
    }

    #[test]
    fn out_of_range_move_is_refused() {
        let mut gate = ActionGate::new();
        assert_eq!(
            gate.admit(
                &ClientAction::GameMove { number: 7 },
                Some(DecisionPoint::Ball),
                false
            ),
            Err(GateRejection::InvalidMove(7))
        );
        assert!(gate.is_open());
    }

    #[test]
    fn picks_must_be_offered_and_enabled() {
        let mut gate = ActionGate::new();
        let opts = options();
        let point = Some(DecisionPoint::PickBatter(&opts));
        assert_eq!(
            gate.admit(&ClientAction::PickBatter { player: "ben".into() }, point, false),
            Err(GateRejection::UnavailableOption("ben".into()))
        );
        assert_eq!(
            gate.admit(&ClientAction::PickBatter { player: "zed".into() }, point, false),
            Err(GateRejection::UnavailableOption("zed".into()))
        );
        assert_eq!(
            gate.admit(&ClientAction::PickBowler { player: "asha".into() }, point, false),
            Err(GateRejection::WrongDecision)
        );
        assert_eq!(
            gate.admit(&ClientAction::PickBatter { player: "asha".into() }, point, false),
            Ok(())
        );
    }

    #[test]
    fn decision_without_point_is_refused() {
        let mut gate = ActionGate::new();
        assert_eq!(
            gate.admit(
                &ClientAction::TossCall {
                    call: TossCall::Heads
                },
                None,
                false
            ),
            Err(GateRejection::NoDecisionPending)
        );
    }

    #[test]
    fn lobby_actions_bypass_the_gate() {
        let mut gate = ActionGate::new();
        gate.admit(&ClientAction::GameMove { number: 0 }, Some(DecisionPoint::Ball), false)
            .unwrap();
        assert_eq!(gate.admit(&ClientAction::StartMatch, None, true), Ok(()));
        assert_eq!(gate.admit(&ClientAction::CancelMatch, None, false), Ok(()));
        assert!(!gate.is_open());
    }
}
