#![no_main]

use std::time::Duration;

use cricket_session_client::{MatchSession, SessionTimings};
use libfuzzer_sys::fuzz_target;
use tokio::time::Instant;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut session = MatchSession::new(SessionTimings::default());
    let mut now = Instant::now();

    // One frame per line, with half a second between frames.
    for line in text.lines() {
        session.handle_frame(line, now);
        now += Duration::from_millis(500);
        session.fire_due(now);
    }
    let _ = session.view();
});
