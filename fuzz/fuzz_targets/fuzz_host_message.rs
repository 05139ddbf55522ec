#![no_main]

use headroom_web::input_parser::parse_host_message;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(input) = parse_host_message(text) {
        // Every accepted message names a known kind and keeps its timestamp.
        assert!(["scroll", "resize", "route", "dismiss", "tick"].contains(&input.kind()));
        let _ = input.ts_ms();
    }
});
