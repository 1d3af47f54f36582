//! Transient ball-result effects.
//!
//! Each `BALL_RESULT` produces exactly one [`TransientEffect`], chosen by
//! [`EffectKind::classify`]. Only one effect is ever on screen: a new ball
//! replaces the current effect immediately, and an effect clears itself when
//! its display window ends.

use std::time::Duration;

use tokio::time::Instant;

use crate::protocol::BallResult;
use crate::timers::{TimerSlot, TimerSlots};

/// Effect kinds, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectKind {
    HatTrick,
    Century,
    HalfCentury,
    Wicket,
    Six,
    Four,
    /// Runs without a boundary.
    Runs,
    /// Nothing scored and nobody out.
    Dot,
}

impl EffectKind {
    /// Pick the single effect a ball result shows.
    pub fn classify(ball: &BallResult) -> Self {
        if ball.hat_trick {
            Self::HatTrick
        } else if ball.milestone == Some(100) {
            Self::Century
        } else if ball.milestone == Some(50) {
            Self::HalfCentury
        } else if ball.is_out {
            Self::Wicket
        } else if ball.is_six || ball.runs == 6 {
            Self::Six
        } else if ball.is_four || ball.runs == 4 {
            Self::Four
        } else if ball.runs > 0 {
            Self::Runs
        } else {
            Self::Dot
        }
    }
}

/// An effect on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientEffect {
    pub kind: EffectKind,
    pub ball: BallResult,
    pub expires_at: Instant,
}

/// Single-slot effect display.
#[derive(Debug, Clone)]
pub struct EffectSlot {
    window: Duration,
    current: Option<TransientEffect>,
}

impl EffectSlot {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            current: None,
        }
    }

    /// Show the effect for `ball`, superseding whatever is on screen.
    pub fn show(&mut self, ball: BallResult, now: Instant, timers: &mut TimerSlots) -> EffectKind {
        let kind = EffectKind::classify(&ball);
        let expires_at = now + self.window;
        if let Some(previous) = self.current.as_ref() {
            tracing::debug!(previous = ?previous.kind, next = ?kind, "effect superseded");
        }
        self.current = Some(TransientEffect {
            kind,
            ball,
            expires_at,
        });
        timers.schedule(TimerSlot::EffectExpiry, expires_at);
        kind
    }

    /// Clear the effect when its expiry slot fires.
    pub fn expire(&mut self) {
        self.current = None;
    }

    /// Clear the effect and its pending expiry.
    pub fn clear(&mut self, timers: &mut TimerSlots) {
        self.current = None;
        timers.cancel(TimerSlot::EffectExpiry);
    }

    pub fn current(&self) -> Option<&TransientEffect> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
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

    fn ball(runs: u32) -> BallResult {
        BallResult {
            runs,
            ..BallResult::default()
        }
    }

    #[test]
    fn century_outranks_six() {
        let b = BallResult {
            runs: 6,
            is_six: true,
            milestone: Some(100),
            ..BallResult::default()
        };
        assert_eq!(EffectKind::classify(&b), EffectKind::Century);
    }

    #[test]
    fn hat_trick_outranks_everything() {
        let b = BallResult {
            is_out: true,
            hat_trick: true,
            milestone: Some(50),
            ..BallResult::default()
        };
        assert_eq!(EffectKind::classify(&b), EffectKind::HatTrick);
    }

    #[test]
    fn plain_outcomes() {
        assert_eq!(EffectKind::classify(&ball(4)), EffectKind::Four);
        assert_eq!(EffectKind::classify(&ball(2)), EffectKind::Runs);
        assert_eq!(EffectKind::classify(&ball(0)), EffectKind::Dot);
        let wicket = BallResult {
            is_out: true,
            ..BallResult::default()
        };
        assert_eq!(EffectKind::classify(&wicket), EffectKind::Wicket);
        let fifty = BallResult {
            runs: 4,
            milestone: Some(50),
            ..BallResult::default()
        };
        assert_eq!(EffectKind::classify(&fifty), EffectKind::HalfCentury);
    }

    #[test]
    fn new_ball_supersedes_current_effect() {
        let now = Instant::now();
        let mut timers = TimerSlots::new();
        let mut slot = EffectSlot::new(Duration::from_millis(1200));

        slot.show(ball(6), now, &mut timers);
        let later = now + Duration::from_millis(500);
        slot.show(ball(1), later, &mut timers);

        let current = slot.current().unwrap();
        assert_eq!(current.kind, EffectKind::Runs);
        assert_eq!(
            timers.deadline(TimerSlot::EffectExpiry),
            Some(later + Duration::from_millis(1200))
        );
    }
}
