//! Property-based invariant tests for the threshold unit and scroll signal.
//!
//! 1. Inside the hysteresis band no trace changes visibility
//! 2. Position 0 always yields `visible == true`
//! 3. A single-threshold unit is a pure function of position
//! 4. The signal clamps every raw offset and chains previous positions
//! 5. Coalescing never hides a direction reversal

use core::time::Duration;
use std::cell::RefCell;
use std::rc::Rc;

use headroom_core::{
    Direction, ScrollCoalescer, ScrollObservation, ScrollSignal, ThresholdConfig, ThresholdUnit,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn band_trace() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(30u32..=50, 1..64)
}

fn any_trace() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..2_000, 1..128)
}

fn raw_trace() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            -500.0f64..5_000.0,
            Just(f64::NAN),
            Just(-0.0),
            Just(f64::NEG_INFINITY),
        ],
        1..64,
    )
}

fn feed(unit: &mut ThresholdUnit, start: u32, trace: &[u32]) -> Vec<bool> {
    let mut prev = start;
    trace
        .iter()
        .map(|&pos| {
            let v = unit.update(&ScrollObservation::new(pos, prev, Duration::ZERO));
            prev = pos;
            v
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Hysteresis band
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn band_trace_never_toggles_when_visible(trace in band_trace()) {
        let mut unit = ThresholdUnit::new(ThresholdConfig::directional(20, 60));
        let out = feed(&mut unit, 40, &trace);
        prop_assert!(out.iter().all(|v| *v));
    }

    #[test]
    fn band_trace_only_shows_on_up_when_hidden(trace in band_trace()) {
        let mut unit = ThresholdUnit::with_initial(ThresholdConfig::directional(20, 60), false);
        let mut prev = 40u32;
        for &pos in &trace {
            let before = unit.visible();
            let obs = ScrollObservation::new(pos, prev, Duration::ZERO);
            let after = unit.update(&obs);
            if before != after {
                prop_assert_eq!(obs.direction(), Direction::Up);
            }
            prev = pos;
        }
    }
}

#[test]
fn oscillation_between_30_and_50_is_silent() {
    let mut unit = ThresholdUnit::new(ThresholdConfig::directional(20, 60));
    let trace: Vec<u32> = (0..40).map(|i| if i % 2 == 0 { 30 } else { 50 }).collect();
    let out = feed(&mut unit, 30, &trace);
    assert!(out.iter().all(|v| *v));
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Top override
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zero_is_always_visible(
        trace in any_trace(),
        show in 0u32..200,
        extra in 0u32..200,
        directional in any::<bool>(),
    ) {
        let config = ThresholdConfig {
            show_below: show,
            hide_above_when_scrolling_down: show + extra,
            require_direction: directional,
        };
        let mut unit = ThresholdUnit::new(config);
        feed(&mut unit, 0, &trace);
        for dir in [Direction::Down, Direction::Up, Direction::None] {
            let mut probe = unit.clone();
            prop_assert!(probe.update_with_direction(0, dir));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Single threshold is memoryless
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn single_threshold_is_pure(trace in any_trace(), t in 1u32..1_000) {
        let mut unit = ThresholdUnit::new(ThresholdConfig::single(t));
        let out = feed(&mut unit, 0, &trace);
        for (pos, vis) in trace.iter().zip(out) {
            prop_assert_eq!(vis, *pos <= t);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Signal clamping and chaining
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn signal_chains_and_clamps(raw in raw_trace()) {
        let signal = ScrollSignal::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = signal.subscribe(move |o| sink.borrow_mut().push(*o));

        for (i, y) in raw.iter().enumerate() {
            signal.emit(*y, Duration::from_millis(i as u64));
        }

        let seen = seen.borrow();
        prop_assert_eq!(seen.len(), raw.len());
        let mut prev = 0u32;
        for (obs, y) in seen.iter().zip(&raw) {
            prop_assert_eq!(obs.previous_position, prev);
            if !(*y > 0.0) {
                prop_assert_eq!(obs.position, 0);
            }
            prev = obs.position;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Coalescing preserves reversals
// ═══════════════════════════════════════════════════════════════════════

fn reversals(points: &[f64], start: f64) -> usize {
    let mut last = start;
    let mut dir = 0i8;
    let mut count = 0;
    for &p in points {
        let d = if p > last {
            1
        } else if p < last {
            -1
        } else {
            0
        };
        if d != 0 {
            if dir != 0 && d != dir {
                count += 1;
            }
            dir = d;
        }
        last = p;
    }
    count
}

proptest! {
    #[test]
    fn coalescer_keeps_every_reversal(trace in prop::collection::vec(0u32..500, 1..96)) {
        let raw: Vec<f64> = trace.iter().map(|&v| f64::from(v)).collect();
        let mut c = ScrollCoalescer::new(0.0);
        let mut delivered = Vec::new();
        for (i, y) in raw.iter().enumerate() {
            if let Some((p, _)) = c.push(*y, Duration::from_millis(i as u64)) {
                delivered.push(p);
            }
        }
        if let Some((p, _)) = c.flush() {
            delivered.push(p);
        }
        prop_assert_eq!(reversals(&delivered, 0.0), reversals(&raw, 0.0));
        prop_assert_eq!(delivered.last().copied(), raw.last().copied());
    }
}
