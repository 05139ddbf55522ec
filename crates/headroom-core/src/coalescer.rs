#![forbid(unsafe_code)]

//! Animation-frame coalescing for raw scroll offsets.
//!
//! Hosts that listen passively and only forward offsets once per animation
//! frame can push every raw tick through a [`ScrollCoalescer`] and call
//! [`flush`](ScrollCoalescer::flush) from their frame callback.
//!
//! # Design
//!
//! "Latest wins" while the direction stays the same. A tick that reverses
//! direction first releases the pending sample, so a reversal is never folded
//! away: every direction change the raw stream contains is still visible to
//! consumers, and the last position of each frame is always delivered.
//!
//! ```
//! use headroom_core::coalescer::ScrollCoalescer;
//! use core::time::Duration;
//!
//! let mut c = ScrollCoalescer::new(0.0);
//! assert!(c.push(10.0, Duration::from_millis(1)).is_none());
//! assert!(c.push(30.0, Duration::from_millis(2)).is_none());
//! // Reversal releases the pending downward sample.
//! let released = c.push(25.0, Duration::from_millis(3)).unwrap();
//! assert_eq!(released.0, 30.0);
//! assert_eq!(c.flush().unwrap().0, 25.0);
//! ```

use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Up,
    Down,
    Flat,
}

fn trend(from: f64, to: f64) -> Trend {
    if to > from {
        Trend::Down
    } else if to < from {
        Trend::Up
    } else {
        Trend::Flat
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTick {
    raw: f64,
    timestamp: Duration,
    trend: Trend,
    count: u32,
}

/// Folds raw offsets between frames.
///
/// Not thread-safe; use it from the host's UI thread only.
#[derive(Debug, Clone)]
pub struct ScrollCoalescer {
    /// Last offset released to consumers.
    anchor: f64,
    pending: Option<PendingTick>,
}

impl ScrollCoalescer {
    /// New coalescer anchored at the mount offset.
    #[must_use]
    pub const fn new(initial: f64) -> Self {
        Self {
            anchor: initial,
            pending: None,
        }
    }

    /// Push one raw tick.
    ///
    /// Returns an older sample that must be delivered now because this tick
    /// reverses its direction.
    pub fn push(&mut self, raw: f64, timestamp: Duration) -> Option<(f64, Duration)> {
        match self.pending {
            None => {
                self.pending = Some(PendingTick {
                    raw,
                    timestamp,
                    trend: trend(self.anchor, raw),
                    count: 1,
                });
                None
            }
            Some(p) => {
                let next = trend(p.raw, raw);
                let compatible = next == Trend::Flat || p.trend == Trend::Flat || next == p.trend;
                if compatible {
                    let merged = if p.trend == Trend::Flat { next } else { p.trend };
                    self.pending = Some(PendingTick {
                        raw,
                        timestamp,
                        trend: merged,
                        count: p.count.saturating_add(1),
                    });
                    None
                } else {
                    self.anchor = p.raw;
                    self.pending = Some(PendingTick {
                        raw,
                        timestamp,
                        trend: next,
                        count: 1,
                    });
                    Some((p.raw, p.timestamp))
                }
            }
        }
    }

    /// Release the pending sample, if any.
    #[must_use]
    pub fn flush(&mut self) -> Option<(f64, Duration)> {
        let p = self.pending.take()?;
        self.anchor = p.raw;
        Some((p.raw, p.timestamp))
    }

    /// Whether a sample is waiting for the next frame.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Raw ticks folded into the pending sample (0 if none).
    #[must_use]
    pub fn pending_count(&self) -> u32 {
        self.pending.map(|p| p.count).unwrap_or(0)
    }

    /// Drop the pending sample without releasing it.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Adopt `raw` as the last released offset, dropping any pending sample.
    ///
    /// For hosts that also deliver offsets directly, past the coalescer.
    pub fn reanchor(&mut self, raw: f64) {
        self.pending = None;
        self.anchor = raw;
    }
}
