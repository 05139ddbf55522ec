#![forbid(unsafe_code)]

//! Standalone single-element scroll consumers.
//!
//! None of these take part in sequencing. Each owns its own
//! [`ThresholdUnit`] and nothing else.
//!
//! - [`SimpleNavbar`]: the nav bar of pages that never render the banner.
//! - [`ScrollToTop`]: the back-to-top affordance.
//! - [`ScrolledIndicator`]: the compact-backdrop flag of the main nav bar.
//!
//! The last two are the complement of a single-threshold unit: the unit
//! tracks "near the top", the element shows once the page is past it. That
//! keeps the unit's top-of-page override intact (at position 0 the unit is
//! `true`, so the affordance is hidden).

use headroom_core::{ScrollObservation, ThresholdConfig, ThresholdUnit};

/// Common seam for anything that derives one flag from scroll observations.
pub trait ScrollConsumer {
    /// Short stable name for logs and host output.
    fn name(&self) -> &'static str;

    /// Apply one observation. Returns `true` if [`visible`](Self::visible)
    /// changed.
    fn observe(&mut self, observation: &ScrollObservation) -> bool;

    /// Current flag.
    fn visible(&self) -> bool;
}

/// Nav bar for pages without a banner: hides moving down past its
/// threshold, returns on any upward step.
#[derive(Debug, Clone)]
pub struct SimpleNavbar {
    unit: ThresholdUnit,
}

impl Default for SimpleNavbar {
    fn default() -> Self {
        Self::new(0, 100)
    }
}

impl SimpleNavbar {
    /// Shown at or above `show_below`, hidden moving down past `hide_above`.
    #[must_use]
    pub const fn new(show_below: u32, hide_above: u32) -> Self {
        Self {
            unit: ThresholdUnit::new(ThresholdConfig::directional(show_below, hide_above)),
        }
    }

    /// Underlying thresholds.
    #[must_use]
    pub const fn config(&self) -> &ThresholdConfig {
        self.unit.config()
    }
}

impl ScrollConsumer for SimpleNavbar {
    fn name(&self) -> &'static str {
        "simple_navbar"
    }

    fn observe(&mut self, observation: &ScrollObservation) -> bool {
        let before = self.unit.visible();
        before != self.unit.update(observation)
    }

    fn visible(&self) -> bool {
        self.unit.visible()
    }
}

/// Shows once the page is scrolled past a fixed depth.
#[derive(Debug, Clone)]
struct PastThreshold {
    near_top: ThresholdUnit,
}

impl PastThreshold {
    const fn new(threshold: u32) -> Self {
        Self {
            near_top: ThresholdUnit::new(ThresholdConfig::single(threshold)),
        }
    }

    fn observe(&mut self, observation: &ScrollObservation) -> bool {
        let before = self.near_top.visible();
        before != self.near_top.update(observation)
    }

    const fn past(&self) -> bool {
        !self.near_top.visible()
    }

    const fn threshold(&self) -> u32 {
        self.near_top.config().show_below
    }
}

/// How the host should perform a programmatic scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Command for the host: scroll the viewport to `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub top: u32,
    pub behavior: ScrollBehavior,
}

/// Back-to-top affordance: visible iff `position > threshold`.
#[derive(Debug, Clone)]
pub struct ScrollToTop {
    inner: PastThreshold,
}

impl Default for ScrollToTop {
    fn default() -> Self {
        Self::new(300)
    }
}

impl ScrollToTop {
    #[must_use]
    pub const fn new(threshold: u32) -> Self {
        Self {
            inner: PastThreshold::new(threshold),
        }
    }

    /// Depth past which the affordance shows.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.inner.threshold()
    }

    /// The user pressed the affordance.
    ///
    /// The flag is left alone; it follows the scroll observations the host
    /// produces while performing the request.
    #[must_use]
    pub const fn activate(&self) -> ScrollRequest {
        ScrollRequest {
            top: 0,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

impl ScrollConsumer for ScrollToTop {
    fn name(&self) -> &'static str {
        "scroll_to_top"
    }

    fn observe(&mut self, observation: &ScrollObservation) -> bool {
        self.inner.observe(observation)
    }

    fn visible(&self) -> bool {
        self.inner.past()
    }
}

/// Whether the page has scrolled far enough for the nav bar to switch to its
/// compact backdrop.
#[derive(Debug, Clone)]
pub struct ScrolledIndicator {
    inner: PastThreshold,
}

impl Default for ScrolledIndicator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ScrolledIndicator {
    #[must_use]
    pub const fn new(threshold: u32) -> Self {
        Self {
            inner: PastThreshold::new(threshold),
        }
    }

    /// Alias for [`ScrollConsumer::visible`].
    #[must_use]
    pub const fn scrolled(&self) -> bool {
        self.inner.past()
    }
}

impl ScrollConsumer for ScrolledIndicator {
    fn name(&self) -> &'static str {
        "scrolled_indicator"
    }

    fn observe(&mut self, observation: &ScrollObservation) -> bool {
        self.inner.observe(observation)
    }

    fn visible(&self) -> bool {
        self.inner.past()
    }
}
