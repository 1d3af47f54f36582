//! Timed banners.
//!
//! Server errors, auto-move warnings, cancellation reasons and connection
//! problems are shown as a single banner that clears itself after a
//! kind-specific duration. A new banner replaces the current one.

use std::time::Duration;

use tokio::time::Instant;

use crate::timers::{TimerSlot, TimerSlots};

/// What raised a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerKind {
    /// `ERROR` from the server.
    ServerError,
    /// `AUTO_MOVE_WARNING` from the server.
    AutoMoveWarning,
    /// The host cancelled the match.
    MatchCancelled,
    /// The room could not be found.
    RoomNotFound,
    /// The connection dropped or carries garbage.
    Connectivity,
}

/// A banner on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub expires_at: Instant,
}

/// Single-slot banner display.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<Banner>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` for `duration`, replacing the current banner.
    pub fn show(
        &mut self,
        kind: BannerKind,
        text: impl Into<String>,
        duration: Duration,
        now: Instant,
        timers: &mut TimerSlots,
    ) -> &Banner {
        let expires_at = now + duration;
        timers.schedule(TimerSlot::BannerClear, expires_at);
        self.current.insert(Banner {
            kind,
            text: text.into(),
            expires_at,
        })
    }

    /// Drop the banner once its slot fires.
    pub fn expire(&mut self) {
        self.current = None;
    }

    /// Drop the banner and its pending clear.
    pub fn clear(&mut self, timers: &mut TimerSlots) {
        self.current = None;
        timers.cancel(TimerSlot::BannerClear);
    }

    pub fn current(&self) -> Option<&Banner> {
        self.current.as_ref()
    }
}

/// Banner text for an `AUTO_MOVE_WARNING`.
pub fn auto_move_text(player: &str, strikes: u32, max: u32) -> String {
    format!("{player} did not move in time and was auto-played ({strikes}/{max} strikes)")
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
    fn new_banner_replaces_old_and_rearms_clear() {
        let now = Instant::now();
        let mut timers = TimerSlots::new();
        let mut board = NoticeBoard::new();

        board.show(
            BannerKind::ServerError,
            "Not your turn",
            Duration::from_millis(4500),
            now,
            &mut timers,
        );
        board.show(
            BannerKind::AutoMoveWarning,
            auto_move_text("ravi", 1, 3),
            Duration::from_secs(4),
            now,
            &mut timers,
        );

        let banner = board.current().unwrap();
        assert_eq!(banner.kind, BannerKind::AutoMoveWarning);
        assert_eq!(
            timers.deadline(TimerSlot::BannerClear),
            Some(now + Duration::from_secs(4))
        );
    }

    #[test]
    fn auto_move_text_mentions_strikes() {
        let text = auto_move_text("ravi", 2, 3);
        assert!(text.starts_with("ravi"));
        assert!(text.contains("2/3"));
    }
}
