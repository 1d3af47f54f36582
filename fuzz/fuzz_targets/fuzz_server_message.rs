#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The decoder only sees text frames, so non-UTF-8 input never reaches it.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = cricket_session_client::decoder::decode(s);
    }
});
