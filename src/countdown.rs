//! Advisory countdown displays.
//!
//! Two independent countdowns mirror the server's timeouts: the ball-action
//! countdown (bat or bowl) and the captain-pick countdown (next batter or next
//! bowler). Both tick down once per [`tick`](Countdowns::new) and clear
//! themselves at zero. Nothing happens when a countdown runs out; the server
//! alone decides what a timeout means.
//!
//! Each countdown owns one [`TimerSlot`], so re-seeding a countdown always
//! replaces its pending tick.

use std::time::Duration;

use tokio::time::Instant;

use crate::protocol::CountdownRole;
use crate::timers::{TimerSlot, TimerSlots};

/// Role of the ball-action countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BallRole {
    Bat,
    Bowl,
}

impl BallRole {
    /// Map a server hint role. `captain` hints are not ball roles.
    pub fn from_hint(role: CountdownRole) -> Option<Self> {
        match role {
            CountdownRole::Bat => Some(Self::Bat),
            CountdownRole::Bowl => Some(Self::Bowl),
            CountdownRole::Captain => None,
        }
    }
}

/// Role of the captain-pick countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickRole {
    /// Picking the next batter.
    Batter,
    /// Picking the next bowler.
    Bowler,
}

/// A running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown<R> {
    pub role: R,
    pub remaining: u32,
}

/// The pair of countdowns and their tick schedule.
#[derive(Debug, Clone)]
pub struct Countdowns {
    tick: Duration,
    ball: Option<Countdown<BallRole>>,
    captain: Option<Countdown<PickRole>>,
    /// Pick role last derived from a match snapshot, independent of whether
    /// its countdown has already run out.
    pending_pick: Option<PickRole>,
}

impl Countdowns {
    /// Create idle countdowns that decrement every `tick`.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            ball: None,
            captain: None,
            pending_pick: None,
        }
    }

    /// The ball-action countdown, if running.
    pub fn ball(&self) -> Option<Countdown<BallRole>> {
        self.ball
    }

    /// The captain-pick countdown, if running.
    pub fn captain(&self) -> Option<Countdown<PickRole>> {
        self.captain
    }

    /// The pick the local captain owes, as last derived from a snapshot.
    pub fn pending_pick(&self) -> Option<PickRole> {
        self.pending_pick
    }

    /// Start the ball-action countdown, replacing any running one.
    pub fn seed_ball(&mut self, role: BallRole, seconds: u32, now: Instant, timers: &mut TimerSlots) {
        if seconds == 0 {
            self.cancel_ball(timers);
            return;
        }
        tracing::debug!(?role, seconds, "ball countdown seeded");
        self.ball = Some(Countdown {
            role,
            remaining: seconds,
        });
        timers.schedule(TimerSlot::BallCountdownTick, now + self.tick);
    }

    /// Stop the ball-action countdown.
    pub fn cancel_ball(&mut self, timers: &mut TimerSlots) {
        self.ball = None;
        timers.cancel(TimerSlot::BallCountdownTick);
    }

    /// Restart the captain-pick countdown for the pending pick, if any.
    ///
    /// Returns `false` when no pick is pending and the hint was ignored.
    pub fn reseed_captain(&mut self, seconds: u32, now: Instant, timers: &mut TimerSlots) -> bool {
        match self.pending_pick {
            Some(role) => {
                self.start_captain(role, seconds, now, timers);
                true
            }
            None => false,
        }
    }

    /// Align the captain-pick countdown with the pick a snapshot asks for.
    ///
    /// A newly pending pick seeds `seconds`; a pick that is no longer pending
    /// clears the countdown at once. An unchanged pick leaves the countdown
    /// alone, including when it has already run out.
    pub fn reconcile_captain(
        &mut self,
        desired: Option<PickRole>,
        seconds: u32,
        now: Instant,
        timers: &mut TimerSlots,
    ) {
        if desired == self.pending_pick {
            return;
        }
        self.pending_pick = desired;
        match desired {
            Some(role) => self.start_captain(role, seconds, now, timers),
            None => self.stop_captain(timers),
        }
    }

    /// Handle a fired tick slot. Returns `true` if a countdown changed.
    pub fn on_tick(&mut self, slot: TimerSlot, now: Instant, timers: &mut TimerSlots) -> bool {
        match slot {
            TimerSlot::BallCountdownTick => {
                self.ball = decrement(self.ball);
                if self.ball.is_some() {
                    timers.schedule(slot, now + self.tick);
                }
                true
            }
            TimerSlot::CaptainCountdownTick => {
                self.captain = decrement(self.captain);
                if self.captain.is_some() {
                    timers.schedule(slot, now + self.tick);
                }
                true
            }
            _ => false,
        }
    }

    /// Stop both countdowns and forget the pending pick.
    pub fn clear(&mut self, timers: &mut TimerSlots) {
        self.cancel_ball(timers);
        self.pending_pick = None;
        self.stop_captain(timers);
    }

    fn start_captain(&mut self, role: PickRole, seconds: u32, now: Instant, timers: &mut TimerSlots) {
        if seconds == 0 {
            self.stop_captain(timers);
            return;
        }
        tracing::debug!(?role, seconds, "captain countdown seeded");
        self.captain = Some(Countdown {
            role,
            remaining: seconds,
        });
        timers.schedule(TimerSlot::CaptainCountdownTick, now + self.tick);
    }

    fn stop_captain(&mut self, timers: &mut TimerSlots) {
        self.captain = None;
        timers.cancel(TimerSlot::CaptainCountdownTick);
    }
}

fn decrement<R>(countdown: Option<Countdown<R>>) -> Option<Countdown<R>> {
    countdown.and_then(|c| {
        let remaining = c.remaining.saturating_sub(1);
        (remaining > 0).then_some(Countdown {
            role: c.role,
            remaining,
        })
    })
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

    const TICK: Duration = Duration::from_secs(1);

    fn run_until(countdowns: &mut Countdowns, timers: &mut TimerSlots, until: Instant) {
        while let Some(deadline) = timers.next_deadline() {
            if deadline > until {
                break;
            }
            for slot in timers.take_due(deadline) {
                countdowns.on_tick(slot, deadline, timers);
            }
        }
    }

    #[test]
    fn ball_countdown_ticks_to_zero_and_clears() {
        let start = Instant::now();
        let mut timers = TimerSlots::new();
        let mut countdowns = Countdowns::new(TICK);
        countdowns.seed_ball(BallRole::Bat, 3, start, &mut timers);

        run_until(&mut countdowns, &mut timers, start + Duration::from_secs(2));
        assert_eq!(countdowns.ball().map(|c| c.remaining), Some(1));

        run_until(&mut countdowns, &mut timers, start + Duration::from_secs(3));
        assert_eq!(countdowns.ball(), None);
        assert!(!timers.is_pending(TimerSlot::BallCountdownTick));
    }

    #[test]
    fn reseed_replaces_the_running_ball_countdown() {
        let start = Instant::now();
        let mut timers = TimerSlots::new();
        let mut countdowns = Countdowns::new(TICK);
        countdowns.seed_ball(BallRole::Bat, 10, start, &mut timers);
        run_until(&mut countdowns, &mut timers, start + Duration::from_millis(2500));

        let reseed_at = start + Duration::from_millis(2500);
        countdowns.seed_ball(BallRole::Bowl, 10, reseed_at, &mut timers);
        assert_eq!(
            countdowns.ball(),
            Some(Countdown {
                role: BallRole::Bowl,
                remaining: 10
            })
        );
        assert_eq!(
            timers.deadline(TimerSlot::BallCountdownTick),
            Some(reseed_at + TICK)
        );
    }

    #[test]
    fn captain_countdown_follows_pending_pick() {
        let start = Instant::now();
        let mut timers = TimerSlots::new();
        let mut countdowns = Countdowns::new(TICK);

        countdowns.reconcile_captain(Some(PickRole::Batter), 5, start, &mut timers);
        assert_eq!(countdowns.captain().map(|c| c.remaining), Some(5));

        // Same pick on the next snapshot does not restart the countdown.
        run_until(&mut countdowns, &mut timers, start + Duration::from_secs(2));
        countdowns.reconcile_captain(
            Some(PickRole::Batter),
            5,
            start + Duration::from_secs(2),
            &mut timers,
        );
        assert_eq!(countdowns.captain().map(|c| c.remaining), Some(3));

        countdowns.reconcile_captain(None, 5, start + Duration::from_secs(2), &mut timers);
        assert_eq!(countdowns.captain(), None);
        assert!(!timers.is_pending(TimerSlot::CaptainCountdownTick));
    }

    #[test]
    fn captain_hint_ignored_without_pending_pick() {
        let start = Instant::now();
        let mut timers = TimerSlots::new();
        let mut countdowns = Countdowns::new(TICK);
        assert!(!countdowns.reseed_captain(5, start, &mut timers));
        assert_eq!(countdowns.captain(), None);

        countdowns.reconcile_captain(Some(PickRole::Bowler), 5, start, &mut timers);
        run_until(&mut countdowns, &mut timers, start + Duration::from_secs(6));
        assert_eq!(countdowns.captain(), None);

        assert!(countdowns.reseed_captain(4, start + Duration::from_secs(6), &mut timers));
        assert_eq!(
            countdowns.captain(),
            Some(Countdown {
                role: PickRole::Bowler,
                remaining: 4
            })
        );
    }

    #[test]
    fn ball_and_captain_countdowns_are_independent() {
        let start = Instant::now();
        let mut timers = TimerSlots::new();
        let mut countdowns = Countdowns::new(TICK);
        countdowns.seed_ball(BallRole::Bowl, 10, start, &mut timers);
        countdowns.reconcile_captain(Some(PickRole::Batter), 5, start, &mut timers);

        countdowns.cancel_ball(&mut timers);
        assert_eq!(countdowns.ball(), None);
        assert!(countdowns.captain().is_some());
    }
}
