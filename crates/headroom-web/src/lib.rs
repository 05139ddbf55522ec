#![forbid(unsafe_code)]

//! `headroom-web` drives the chrome controllers from an embedding host.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes scroll offsets,
//!   viewport widths, route changes and dismissals.
//! - **Deterministic time**: every input carries its own timestamp; nothing
//!   here reads a clock unless the host asks for [`SystemClock`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate does not bind to `wasm-bindgen`. It provides the driver a thin
//! JS binding can wrap.

pub mod host;
#[cfg(feature = "input-parser")]
pub mod input_parser;
pub mod session_record;

use core::time::Duration;

pub use host::{ChromeHost, HostOutputs, HostSnapshot};

/// Host driver error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The policy failed validation; carries every violation.
    InvalidPolicy(Vec<String>),
}

impl core::fmt::Display for HostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPolicy(errors) => write!(f, "invalid policy: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for HostError {}

/// One input pushed by the host.
///
/// Timestamps are milliseconds on the host's monotonic clock.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    /// Raw vertical scroll offset.
    Scroll { ts_ms: u64, y: f64 },
    /// Viewport width changed.
    Resize { ts_ms: u64, width_px: u32 },
    /// Client-side navigation.
    Route { ts_ms: u64, path: String },
    /// User closed the banner.
    Dismiss { ts_ms: u64 },
    /// Time passed with no other input.
    Tick { ts_ms: u64 },
}

impl HostInput {
    /// Timestamp carried by the input.
    #[must_use]
    pub const fn ts_ms(&self) -> u64 {
        match self {
            Self::Scroll { ts_ms, .. }
            | Self::Resize { ts_ms, .. }
            | Self::Route { ts_ms, .. }
            | Self::Dismiss { ts_ms }
            | Self::Tick { ts_ms } => *ts_ms,
        }
    }

    /// Stable lowercase kind, matching the JSON `kind` field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scroll { .. } => "scroll",
            Self::Resize { .. } => "resize",
            Self::Route { .. } => "route",
            Self::Dismiss { .. } => "dismiss",
            Self::Tick { .. } => "tick",
        }
    }
}

/// Monotonic time source.
pub trait HostClock {
    /// Time since the clock's origin.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Move to `at` unless that would go backwards. Returns the new time.
    pub fn catch_up(&mut self, at: Duration) -> Duration {
        self.now = self.now.max(at);
        self.now
    }
}

impl HostClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Wall clock for hosts that do not timestamp their own inputs.
///
/// Backed by `web_time::Instant`, which maps to `performance.now()` on wasm.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: web_time::Instant,
}

impl SystemClock {
    /// Clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }

    /// Milliseconds since the origin, in the unit [`HostInput`] carries.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.now_mono().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut clock = DeterministicClock::new();
        assert_eq!(clock.now_mono(), Duration::ZERO);

        clock.advance(Duration::from_millis(10));
        assert_eq!(clock.now_mono(), Duration::from_millis(10));

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now_mono(), Duration::from_millis(15));

        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now_mono(), Duration::from_secs(1));
    }

    #[test]
    fn catch_up_never_rewinds() {
        let mut clock = DeterministicClock::new();
        assert_eq!(clock.catch_up(Duration::from_millis(50)), Duration::from_millis(50));
        assert_eq!(clock.catch_up(Duration::from_millis(20)), Duration::from_millis(50));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_mono();
        let b = clock.now_mono();
        assert!(b >= a);
        assert!(clock.now_ms() < 60_000);
    }

    #[test]
    fn host_input_accessors() {
        let input = HostInput::Route {
            ts_ms: 42,
            path: "/docs".into(),
        };
        assert_eq!(input.ts_ms(), 42);
        assert_eq!(input.kind(), "route");
        assert_eq!(HostInput::Tick { ts_ms: 7 }.kind(), "tick");
    }

    #[test]
    fn host_error_display() {
        let err = HostError::InvalidPolicy(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid policy: a; b");
    }
}
