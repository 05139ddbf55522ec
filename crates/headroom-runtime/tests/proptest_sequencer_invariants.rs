//! Property-based invariant tests for the chrome sequencer.
//!
//! 1. Dismissal is terminal
//! 2. Downward scroll: the banner leaves no later than the nav bar
//! 3. Upward scroll: the nav bar returns no later than the banner
//! 4. A contradicting observation cancels the pending transition
//! 5. Transition timestamps are monotone

use core::time::Duration;

use headroom_core::{PageContext, ScrollObservation};
use headroom_runtime::{
    BannerState, ChromeSequencer, ChromeTransition, NavState, SequencingPolicy,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Scroll { gap_ms: u64, position: u32 },
    Advance { gap_ms: u64 },
    Dismiss,
    Context(PageContext),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..150, 0u32..600).prop_map(|(gap_ms, position)| Op::Scroll { gap_ms, position }),
        2 => (0u64..400).prop_map(|gap_ms| Op::Advance { gap_ms }),
        1 => Just(Op::Dismiss),
        1 => (any::<bool>(), any::<bool>()).prop_map(|(l, m)| Op::Context(PageContext {
            is_landing_route: l,
            is_mobile_viewport: m,
        })),
    ]
}

/// Runs `ops`, returning every transition plus the index of the first dismiss.
fn run(ops: &[Op]) -> (ChromeSequencer, Vec<ChromeTransition>, Option<usize>) {
    let mut seq = ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
    let mut now = 0u64;
    let mut prev = 0u32;
    let mut log = Vec::new();
    let mut dismissed_at = None;
    for op in ops {
        let t = match *op {
            Op::Scroll { gap_ms, position } => {
                now += gap_ms;
                let obs = ScrollObservation::new(position, prev, Duration::from_millis(now));
                prev = position;
                seq.observe(&obs)
            }
            Op::Advance { gap_ms } => {
                now += gap_ms;
                seq.advance(Duration::from_millis(now))
            }
            Op::Dismiss => {
                let t = seq.dismiss(Duration::from_millis(now));
                if dismissed_at.is_none() {
                    dismissed_at = Some(log.len() + t.len());
                }
                t
            }
            Op::Context(ctx) => seq.set_context(ctx, Duration::from_millis(now)),
        };
        log.extend(t);
    }
    (seq, log, dismissed_at)
}

fn drive(seq: &mut ChromeSequencer, samples: &[u32], start: u32, t0: u64) -> Vec<ChromeTransition> {
    let mut prev = start;
    let mut out = Vec::new();
    for (i, &p) in samples.iter().enumerate() {
        let at = Duration::from_millis(t0 + i as u64 * 16);
        out.extend(seq.observe(&ScrollObservation::new(p, prev, at)));
        prev = p;
    }
    out
}

fn first_at(log: &[ChromeTransition], pred: impl Fn(&ChromeTransition) -> bool) -> Option<Duration> {
    log.iter().find(|t| pred(t)).map(ChromeTransition::at)
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Dismissal is terminal
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dismissal_is_terminal(ops in prop::collection::vec(op(), 1..80)) {
        let (seq, log, dismissed_at) = run(&ops);
        if let Some(idx) = dismissed_at {
            prop_assert_eq!(seq.banner(), BannerState::Dismissed);
            prop_assert!(log[idx..].iter().all(|t| !t.is_banner()));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2/3. Ordering
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn banner_leaves_before_nav(mut steps in prop::collection::vec(0u32..800, 1..40)) {
        steps.sort_unstable();
        let mut seq = ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        let mut log = drive(&mut seq, &steps, 0, 0);
        log.extend(seq.advance(Duration::from_secs(10)));

        let nav_hidden = first_at(&log, |t| matches!(t, ChromeTransition::Navbar { to: NavState::Hidden, .. }));
        let banner_hidden = first_at(&log, |t| matches!(t, ChromeTransition::Banner { to: BannerState::ScrollHidden, .. }));
        if let Some(nav) = nav_hidden {
            prop_assert!(banner_hidden.is_some_and(|b| b <= nav));
        }
    }

    #[test]
    fn nav_returns_before_banner(mut steps in prop::collection::vec(0u32..800, 1..40)) {
        let mut seq = ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        // Both retracted first.
        drive(&mut seq, &[900], 0, 0);
        seq.advance(Duration::from_millis(500));
        prop_assert_eq!(seq.navbar(), NavState::Hidden);

        steps.sort_unstable_by(|a, b| b.cmp(a));
        let mut log = drive(&mut seq, &steps, 900, 1_000);
        log.extend(seq.advance(Duration::from_secs(10)));

        let nav_shown = first_at(&log, |t| matches!(t, ChromeTransition::Navbar { to: NavState::Shown, .. }));
        let banner_shown = first_at(&log, |t| matches!(t, ChromeTransition::Banner { to: BannerState::Shown, .. }));
        if let Some(banner) = banner_shown {
            prop_assert!(nav_shown.is_some_and(|n| n <= banner));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Cancellation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn upward_step_cancels_nav_hide(
        mut steps in prop::collection::vec(61u32..800, 1..12),
        back in 1u32..60,
    ) {
        steps.sort_unstable();
        let mut seq = ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        drive(&mut seq, &steps, 0, 0);
        let last = *steps.last().unwrap_or(&61);
        // Every sample lands inside D1, so the check is still pending.
        prop_assert_eq!(seq.navbar(), NavState::Shown);
        prop_assert!(seq.next_deadline().is_some());
        let reverse = ScrollObservation::new(last - back, last, Duration::from_millis(16 * steps.len() as u64));
        seq.observe(&reverse);
        let later = seq.advance(Duration::from_secs(30));
        prop_assert!(later.iter().all(|t| !matches!(t, ChromeTransition::Navbar { to: NavState::Hidden, .. })), "later transitions must not hide the navbar");
        prop_assert_eq!(seq.navbar(), NavState::Shown);
    }

    #[test]
    fn downward_step_cancels_banner_show(start in 200u32..800, up in 1u32..100, down in 1u32..100) {
        let mut seq = ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
        drive(&mut seq, &[start], 0, 0);
        seq.advance(Duration::from_millis(500));
        let high = start - up;
        seq.observe(&ScrollObservation::new(high, start, Duration::from_millis(600)));
        prop_assert!(seq.next_deadline().is_some());
        seq.observe(&ScrollObservation::new(high + down, high, Duration::from_millis(610)));
        let later = seq.advance(Duration::from_secs(30));
        prop_assert!(later.iter().all(|t| !t.is_banner()));
        prop_assert_eq!(seq.banner(), BannerState::ScrollHidden);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Time order
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn transitions_are_time_ordered(ops in prop::collection::vec(op(), 1..120)) {
        let (_, log, _) = run(&ops);
        for pair in log.windows(2) {
            prop_assert!(pair[0].at() <= pair[1].at());
        }
    }
}
