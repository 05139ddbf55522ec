#![forbid(unsafe_code)]

//! Scroll observations and direction classification.
//!
//! A [`ScrollObservation`] is produced for every scroll tick and consumed
//! synchronously. Only the current and previous positions are carried; no
//! consumer keeps a longer history.

use core::time::Duration;

/// Vertical scroll direction derived from two consecutive positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Position decreased (content moves down, viewport moves up).
    Up,
    /// Position increased.
    Down,
    /// Position unchanged.
    None,
}

impl Direction {
    /// Stable lowercase name, used in structured log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::None => "none",
        }
    }
}

/// Clamp a raw host scroll offset to a pixel position.
///
/// Browsers report fractional offsets and, during elastic overscroll,
/// negative ones. Negative, NaN and infinite-negative inputs become `0`;
/// values past `u32::MAX` saturate.
#[must_use]
pub fn clamp_position(raw: f64) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    if raw >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    raw.round() as u32
}

/// One scroll tick: where the viewport is now and where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollObservation {
    /// Pixels from the top of the document.
    pub position: u32,
    /// Position reported by the previous tick (or the mount position).
    pub previous_position: u32,
    /// Host monotonic time of the tick.
    pub timestamp: Duration,
}

impl ScrollObservation {
    /// Create an observation.
    #[must_use]
    pub const fn new(position: u32, previous_position: u32, timestamp: Duration) -> Self {
        Self {
            position,
            previous_position,
            timestamp,
        }
    }

    /// Signed pixel delta since the previous tick.
    #[must_use]
    pub fn delta(&self) -> i64 {
        i64::from(self.position) - i64::from(self.previous_position)
    }

    /// Direction as the sign of [`delta`](Self::delta).
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self.position.cmp(&self.previous_position) {
            core::cmp::Ordering::Greater => Direction::Down,
            core::cmp::Ordering::Less => Direction::Up,
            core::cmp::Ordering::Equal => Direction::None,
        }
    }

    /// Direction, but upward steps shorter than `min_up_delta` pixels
    /// classify as [`Direction::None`].
    ///
    /// `min_up_delta == 0` (or `1`) is identical to [`direction`](Self::direction).
    #[must_use]
    pub fn direction_with_tolerance(&self, min_up_delta: u32) -> Direction {
        match self.direction() {
            Direction::Up if self.previous_position - self.position < min_up_delta => {
                Direction::None
            }
            other => other,
        }
    }

    /// Whether this tick sits at the very top of the document.
    #[must_use]
    pub const fn is_at_top(&self) -> bool {
        self.position == 0
    }
}
