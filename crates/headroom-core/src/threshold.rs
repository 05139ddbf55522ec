#![forbid(unsafe_code)]

//! Threshold visibility unit: one boolean flag with hysteresis.
//!
//! # Rules
//!
//! For an observation at `position` moving in `direction`:
//!
//! | condition                                          | next `visible` |
//! |----------------------------------------------------|----------------|
//! | `position == 0`                                    | `true`         |
//! | moving down and `position > hide_above`            | `false`        |
//! | moving up, or `position <= show_below`             | `true`         |
//! | otherwise (the hysteresis band)                    | unchanged      |
//!
//! With `require_direction == false` the direction column is ignored: any
//! position past `hide_above` hides, any position at or under `show_below`
//! shows. A config with `show_below == hide_above` and no direction is a
//! plain single-threshold switch.
//!
//! The unit has no internal delay. Observations are applied in the order they
//! arrive.

use crate::observation::{Direction, ScrollObservation};

/// Immutable thresholds for one consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    /// At or below this position the unit is visible.
    pub show_below: u32,
    /// Past this position (moving down, if direction is required) the unit
    /// is hidden.
    pub hide_above_when_scrolling_down: u32,
    /// Whether hide/show also depend on scroll direction.
    pub require_direction: bool,
}

impl ThresholdConfig {
    /// Direction-sensitive config with a hysteresis band
    /// `(show_below, hide_above]`.
    #[must_use]
    pub const fn directional(show_below: u32, hide_above: u32) -> Self {
        Self {
            show_below,
            hide_above_when_scrolling_down: hide_above,
            require_direction: true,
        }
    }

    /// Single-threshold switch: visible iff `position <= threshold`.
    #[must_use]
    pub const fn single(threshold: u32) -> Self {
        Self {
            show_below: threshold,
            hide_above_when_scrolling_down: threshold,
            require_direction: false,
        }
    }

    /// The flag a sample forces, or `None` inside the hysteresis band.
    #[must_use]
    pub fn decide(&self, position: u32, direction: Direction) -> Option<bool> {
        if position == 0 {
            return Some(true);
        }
        let moving_down = !self.require_direction || direction == Direction::Down;
        if moving_down && position > self.hide_above_when_scrolling_down {
            Some(false)
        } else if (self.require_direction && direction == Direction::Up)
            || position <= self.show_below
        {
            Some(true)
        } else {
            None
        }
    }

    /// Width of the band in which no change happens.
    #[must_use]
    pub const fn band_width(&self) -> u32 {
        self.hide_above_when_scrolling_down
            .saturating_sub(self.show_below)
    }
}

/// A single visibility flag driven by scroll observations.
#[derive(Debug, Clone)]
pub struct ThresholdUnit {
    config: ThresholdConfig,
    visible: bool,
}

impl ThresholdUnit {
    /// New unit, visible at mount.
    #[must_use]
    pub const fn new(config: ThresholdConfig) -> Self {
        Self {
            config,
            visible: true,
        }
    }

    /// New unit with an explicit mount state.
    #[must_use]
    pub const fn with_initial(config: ThresholdConfig, visible: bool) -> Self {
        Self { config, visible }
    }

    /// The unit's configuration.
    #[must_use]
    pub const fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Current flag.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Apply one observation and return the new flag.
    pub fn update(&mut self, observation: &ScrollObservation) -> bool {
        self.update_with_direction(observation.position, observation.direction())
    }

    /// Apply a position with an already-classified direction.
    ///
    /// Callers that filter jitter classify the direction themselves and
    /// feed it here.
    pub fn update_with_direction(&mut self, position: u32, direction: Direction) -> bool {
        self.apply(position, direction);
        self.visible
    }

    /// Like [`update_with_direction`](Self::update_with_direction), but
    /// reports whether a rule fired: `Some(flag)` when the sample forced the
    /// flag, `None` when it fell in the band.
    pub fn apply(&mut self, position: u32, direction: Direction) -> Option<bool> {
        let forced = self.config.decide(position, direction);
        if let Some(flag) = forced {
            self.visible = flag;
        }
        forced
    }
}
