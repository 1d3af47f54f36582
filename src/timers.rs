//! Single-slot scheduled tasks.
//!
//! Every deferred action the session performs lives in exactly one
//! [`TimerSlot`]. Scheduling into an occupied slot replaces the previous
//! deadline, so two instances of the same logical timer can never be pending.
//! The table holds deadlines only; the event loop sleeps until
//! [`TimerSlots::next_deadline`] and hands the fired slots back to the session.

use tokio::time::Instant;

/// Logical timer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// TossDecision → Game.
    TossDecisionToGame,
    /// MatchOver → Scorecard.
    MatchOverToScorecard,
    /// Next decrement of the ball-action countdown.
    BallCountdownTick,
    /// Next decrement of the captain-pick countdown.
    CaptainCountdownTick,
    /// Expiry of the transient effect.
    EffectExpiry,
    /// Expiry of the banner.
    BannerClear,
}

impl TimerSlot {
    /// All slots, in firing priority order for equal deadlines.
    pub const ALL: [TimerSlot; 6] = [
        TimerSlot::EffectExpiry,
        TimerSlot::BallCountdownTick,
        TimerSlot::CaptainCountdownTick,
        TimerSlot::BannerClear,
        TimerSlot::MatchOverToScorecard,
        TimerSlot::TossDecisionToGame,
    ];

    fn index(self) -> usize {
        match self {
            Self::EffectExpiry => 0,
            Self::BallCountdownTick => 1,
            Self::CaptainCountdownTick => 2,
            Self::BannerClear => 3,
            Self::MatchOverToScorecard => 4,
            Self::TossDecisionToGame => 5,
        }
    }
}

/// Deadline table with one entry per [`TimerSlot`].
#[derive(Debug, Clone, Default)]
pub struct TimerSlots {
    deadlines: [Option<Instant>; 6],
}

impl TimerSlots {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot` at `deadline`, replacing any pending deadline for that slot.
    pub fn schedule(&mut self, slot: TimerSlot, deadline: Instant) {
        if let Some(entry) = self.deadlines.get_mut(slot.index()) {
            *entry = Some(deadline);
        }
    }

    /// Disarm `slot`. Returns `true` if it was pending.
    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        self.deadlines
            .get_mut(slot.index())
            .and_then(Option::take)
            .is_some()
    }

    /// Disarm every slot.
    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 6];
    }

    /// Returns `true` if `slot` is armed.
    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.deadline(slot).is_some()
    }

    /// The deadline of `slot`, if armed.
    pub fn deadline(&self, slot: TimerSlot) -> Option<Instant> {
        self.deadlines.get(slot.index()).copied().flatten()
    }

    /// The earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarm and return every slot whose deadline is at or before `now`,
    /// ordered by deadline (ties broken by [`TimerSlot::ALL`] order).
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerSlot> {
        let mut due: Vec<(Instant, TimerSlot)> = TimerSlot::ALL
            .iter()
            .filter_map(|slot| {
                self.deadline(*slot)
                    .filter(|deadline| *deadline <= now)
                    .map(|deadline| (deadline, *slot))
            })
            .collect();
        due.sort_by_key(|(deadline, slot)| (*deadline, slot.index()));
        for (_, slot) in &due {
            self.cancel(*slot);
        }
        due.into_iter().map(|(_, slot)| slot).collect()
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
    use std::time::Duration;

    #[test]
    fn rescheduling_replaces_previous_deadline() {
        let base = Instant::now();
        let mut slots = TimerSlots::new();
        slots.schedule(TimerSlot::TossDecisionToGame, base + Duration::from_secs(3));
        slots.schedule(TimerSlot::TossDecisionToGame, base + Duration::from_secs(5));

        assert!(slots.take_due(base + Duration::from_secs(4)).is_empty());
        assert_eq!(
            slots.take_due(base + Duration::from_secs(5)),
            vec![TimerSlot::TossDecisionToGame]
        );
        assert!(!slots.is_pending(TimerSlot::TossDecisionToGame));
    }

    #[test]
    fn next_deadline_is_the_earliest() {
        let base = Instant::now();
        let mut slots = TimerSlots::new();
        assert_eq!(slots.next_deadline(), None);
        slots.schedule(TimerSlot::BannerClear, base + Duration::from_secs(4));
        slots.schedule(TimerSlot::EffectExpiry, base + Duration::from_millis(1200));
        assert_eq!(slots.next_deadline(), Some(base + Duration::from_millis(1200)));
    }

    #[test]
    fn take_due_orders_by_deadline() {
        let base = Instant::now();
        let mut slots = TimerSlots::new();
        slots.schedule(TimerSlot::BannerClear, base + Duration::from_secs(1));
        slots.schedule(TimerSlot::BallCountdownTick, base + Duration::from_secs(2));
        slots.schedule(TimerSlot::EffectExpiry, base + Duration::from_secs(1));

        let fired = slots.take_due(base + Duration::from_secs(2));
        assert_eq!(
            fired,
            vec![
                TimerSlot::EffectExpiry,
                TimerSlot::BannerClear,
                TimerSlot::BallCountdownTick
            ]
        );
        assert_eq!(slots.next_deadline(), None);
    }

    #[test]
    fn cancel_all_clears_every_slot() {
        let base = Instant::now();
        let mut slots = TimerSlots::new();
        for slot in TimerSlot::ALL {
            slots.schedule(slot, base);
        }
        slots.cancel_all();
        assert!(slots.take_due(base + Duration::from_secs(60)).is_empty());
        assert!(!slots.cancel(TimerSlot::EffectExpiry));
    }
}
