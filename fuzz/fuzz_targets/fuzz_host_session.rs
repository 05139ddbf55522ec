#![no_main]

use arbitrary::Arbitrary;
use headroom_runtime::{BannerState, ChromePolicy, NavState};
use headroom_web::ChromeHost;
use headroom_web::session_record::{SessionRecorder, replay};
use headroom_web::HostInput;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Scroll { gap: u8, y: f64 },
    Tick { gap: u16 },
    Resize { gap: u8, width: u16 },
    Route { gap: u8, landing: bool },
    Dismiss { gap: u8 },
}

fuzz_target!(|ops: Vec<Op>| {
    let host = match ChromeHost::new(ChromePolicy::default(), "/", 1280) {
        Ok(host) => host,
        Err(_) => return,
    };
    let mut rec = SessionRecorder::new(host);
    let mut ts = 0u64;
    let mut dismissed = false;
    let mut last_at = None;

    for op in ops.into_iter().take(512) {
        let input = match op {
            Op::Scroll { gap, y } => {
                ts += u64::from(gap);
                HostInput::Scroll { ts_ms: ts, y }
            }
            Op::Tick { gap } => {
                ts += u64::from(gap);
                HostInput::Tick { ts_ms: ts }
            }
            Op::Resize { gap, width } => {
                ts += u64::from(gap);
                HostInput::Resize { ts_ms: ts, width_px: u32::from(width) }
            }
            Op::Route { gap, landing } => {
                ts += u64::from(gap);
                let path = if landing { "/" } else { "/docs" };
                HostInput::Route { ts_ms: ts, path: path.to_string() }
            }
            Op::Dismiss { gap } => {
                ts += u64::from(gap);
                dismissed = true;
                HostInput::Dismiss { ts_ms: ts }
            }
        };

        for t in rec.apply(input) {
            // Transitions never go back in time.
            if let Some(prev) = last_at {
                assert!(t.at() >= prev, "transition out of order");
            }
            last_at = Some(t.at());
        }

        let snap = rec.host().snapshot();
        if dismissed {
            assert_eq!(snap.chrome.banner, BannerState::Dismissed, "dismiss not sticky");
        }
        if snap.chrome.banner_visible && rec.host().next_deadline().is_none() {
            assert_eq!(snap.chrome.navbar, NavState::Shown, "banner above hidden nav");
        }
    }

    let trace = rec.finish();
    let result = replay(ChromePolicy::default(), &trace).expect("header present");
    assert!(result.ok(), "replay diverged: {:?}", result.first_mismatch);
});
