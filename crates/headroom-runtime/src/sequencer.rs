#![forbid(unsafe_code)]

//! Chrome sequencer: ordered hide/reveal of the announcement banner and the
//! navigation bar.
//!
//! # State machine
//!
//! Banner: `Shown | ScrollHidden | Dismissed`. Nav bar: `Shown | Hidden`.
//!
//! | input                                   | effect |
//! |-----------------------------------------|--------|
//! | dismiss                                 | banner → `Dismissed` (terminal) |
//! | down past T1, banner retreating         | banner → `ScrollHidden`, nav-hide check after D1 |
//! | down past T1, banner out of the way     | nav → `Hidden` now |
//! | up (any step) or position ≤ T3          | nav → `Shown` now, banner-show check after D2 |
//! | nav-hide check fires                    | nav → `Hidden` iff position > T2 |
//! | banner-show check fires                 | banner → `Shown` iff eligible, `ScrollHidden`, nav `Shown` |
//! | context turns eligible, nav settled     | banner-show check after D2 if `ScrollHidden` |
//!
//! The T1/T3 column is a directional [`ThresholdUnit`] with band `(T3, T1]`:
//! a sample that forces it hidden takes the downward rows, one that forces it
//! shown takes the upward rows, and samples inside the band change nothing.
//!
//! The banner is *retreating* when it is eligible and either still `Shown` or
//! already `ScrollHidden` with its nav-hide check still pending. It is *out of
//! the way* when it is `Dismissed`, ineligible, or `ScrollHidden` with no
//! pending check.
//!
//! A pending nav-hide check armed by a sample already past T2 is kept when
//! more downward samples arrive; a check armed short of T2 is replaced by the
//! next downward sample. Every upward or near-top sample that moves re-arms
//! the banner-show check.
//!
//! # Cancellation
//!
//! Each element has exactly one [`TimerSlot`]. A downward step past T1 clears
//! the banner-show slot; an upward or near-top step clears the nav-hide slot.
//! A scheduled transition is therefore never applied after a contradicting
//! observation. [`ChromeSequencer::teardown`] clears both slots and makes the
//! sequencer inert.
//!
//! # Ordering
//!
//! During a continuous downward scroll the banner leaves no later than the
//! nav bar; during a continuous upward scroll the nav bar returns no later
//! than the banner.
//!
//! # Time
//!
//! The sequencer never reads a clock. Observations carry their timestamp and
//! the host calls [`ChromeSequencer::advance`] to let due checks fire. Due
//! checks always fire before a later observation is applied.

use core::time::Duration;

use headroom_core::{
    Direction, PageContext, ScrollObservation, ThresholdConfig, ThresholdUnit, TimerSlot,
};
use tracing::{debug, trace};

/// Announcement banner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerState {
    /// Visible (when eligible).
    Shown,
    /// Retracted by scrolling; reversible.
    ScrollHidden,
    /// Closed by the user; terminal for this mount.
    Dismissed,
}

impl BannerState {
    /// Stable lowercase name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::ScrollHidden => "scroll_hidden",
            Self::Dismissed => "dismissed",
        }
    }
}

/// Navigation bar state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavState {
    /// Pinned at the top of the viewport.
    Shown,
    /// Slid out of view by a downward scroll.
    Hidden,
}

impl NavState {
    /// Stable lowercase name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        }
    }
}

/// One applied state change, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeTransition {
    Banner {
        at: Duration,
        from: BannerState,
        to: BannerState,
    },
    Navbar {
        at: Duration,
        from: NavState,
        to: NavState,
    },
}

impl ChromeTransition {
    /// Host time of the change.
    #[must_use]
    pub const fn at(&self) -> Duration {
        match self {
            Self::Banner { at, .. } | Self::Navbar { at, .. } => *at,
        }
    }

    /// Whether this change touched the banner.
    #[must_use]
    pub const fn is_banner(&self) -> bool {
        matches!(self, Self::Banner { .. })
    }
}

/// Snapshot handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChromeVisibility {
    /// Banner state machine value.
    pub banner: BannerState,
    /// Whether the banner should be drawn at all (eligible and `Shown`).
    pub banner_visible: bool,
    /// Nav bar state.
    pub navbar: NavState,
}

/// Thresholds and delays for the sequencer.
///
/// Defaults: T1 = 60px, T2 = 120px, T3 = 20px, D1 = 200ms, D2 = 100ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencingPolicy {
    /// T1: moving down past this position starts hiding.
    pub hide_start_px: u32,
    /// T2: the nav bar follows the banner only past this position.
    pub dependent_hide_px: u32,
    /// T3: at or above this position everything comes back.
    pub reveal_px: u32,
    /// D1: delay between the banner retreating and the nav-hide check.
    pub hide_delay: Duration,
    /// D2: delay between the nav bar returning and the banner-show check.
    pub show_delay: Duration,
    /// Time an element's hide/show animation needs to be visibly underway.
    pub animation_lead: Duration,
    /// Upward steps shorter than this are treated as no movement.
    /// `0` reverses on any upward pixel.
    pub min_up_delta: u32,
}

impl Default for SequencingPolicy {
    fn default() -> Self {
        Self {
            hide_start_px: 60,
            dependent_hide_px: 120,
            reveal_px: 20,
            hide_delay: Duration::from_millis(200),
            show_delay: Duration::from_millis(100),
            animation_lead: Duration::from_millis(100),
            min_up_delta: 0,
        }
    }
}

impl SequencingPolicy {
    /// Check the ordering constraints between thresholds and delays.
    ///
    /// Returns human-readable violations; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.hide_start_px >= self.dependent_hide_px {
            errors.push(format!(
                "hide_start_px ({}) must be < dependent_hide_px ({})",
                self.hide_start_px, self.dependent_hide_px
            ));
        }
        if self.reveal_px > self.hide_start_px {
            errors.push(format!(
                "reveal_px ({}) must be <= hide_start_px ({})",
                self.reveal_px, self.hide_start_px
            ));
        }
        if self.hide_delay < self.animation_lead {
            errors.push(format!(
                "hide_delay ({:?}) must be >= animation_lead ({:?})",
                self.hide_delay, self.animation_lead
            ));
        }
        if self.show_delay < self.animation_lead {
            errors.push(format!(
                "show_delay ({:?}) must be >= animation_lead ({:?})",
                self.show_delay, self.animation_lead
            ));
        }
        errors
    }
}

#[derive(Debug, Clone, Copy)]
struct NavHideCheck {
    armed_position: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    NavHide,
    BannerShow,
}

/// Banner + nav bar coordinator.
///
/// Single-threaded and run-to-completion: every call finishes its transitions
/// before returning, and every call returns the transitions it applied.
#[derive(Debug, Clone)]
pub struct ChromeSequencer {
    policy: SequencingPolicy,
    context: PageContext,
    banner: BannerState,
    navbar: NavState,
    trigger: ThresholdUnit,
    nav_hide: TimerSlot<NavHideCheck>,
    banner_show: TimerSlot<()>,
    last_position: u32,
    now: Duration,
    torn_down: bool,
}

impl ChromeSequencer {
    /// Mount with both elements shown.
    #[must_use]
    pub fn new(policy: SequencingPolicy, context: PageContext) -> Self {
        Self {
            policy,
            context,
            banner: BannerState::Shown,
            navbar: NavState::Shown,
            trigger: ThresholdUnit::new(ThresholdConfig::directional(
                policy.reveal_px,
                policy.hide_start_px,
            )),
            nav_hide: TimerSlot::new(),
            banner_show: TimerSlot::new(),
            last_position: 0,
            now: Duration::ZERO,
            torn_down: false,
        }
    }

    /// Mount with the banner already dismissed (dismissal persisted by the
    /// host from an earlier visit).
    #[must_use]
    pub fn with_dismissed(policy: SequencingPolicy, context: PageContext) -> Self {
        Self {
            banner: BannerState::Dismissed,
            ..Self::new(policy, context)
        }
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> &SequencingPolicy {
        &self.policy
    }

    /// Current page context.
    #[must_use]
    pub const fn context(&self) -> PageContext {
        self.context
    }

    /// Banner state.
    #[must_use]
    pub const fn banner(&self) -> BannerState {
        self.banner
    }

    /// Nav bar state.
    #[must_use]
    pub const fn navbar(&self) -> NavState {
        self.navbar
    }

    /// Whether the banner takes part in sequencing.
    #[must_use]
    pub const fn banner_eligible(&self) -> bool {
        self.context.banner_eligible()
    }

    /// Renderer snapshot.
    #[must_use]
    pub fn visibility(&self) -> ChromeVisibility {
        ChromeVisibility {
            banner: self.banner,
            banner_visible: self.banner_eligible() && self.banner == BannerState::Shown,
            navbar: self.navbar,
        }
    }

    /// Earliest pending deadline, for hosts that schedule a wake-up.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.nav_hide.deadline(), self.banner_show.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Apply one scroll observation.
    ///
    /// Checks due at or before the observation's timestamp fire first.
    pub fn observe(&mut self, observation: &ScrollObservation) -> Vec<ChromeTransition> {
        let mut out = Vec::new();
        if self.torn_down {
            return out;
        }
        self.fire_due(observation.timestamp, &mut out);
        self.now = self.now.max(observation.timestamp);

        let position = observation.position;
        self.last_position = position;
        let direction = observation.direction_with_tolerance(self.policy.min_up_delta);

        match self.trigger.apply(position, direction) {
            Some(false) => self.on_scroll_down(position, &mut out),
            Some(true) => self.on_scroll_up(position, direction, &mut out),
            None => {}
        }
        out
    }

    /// Let checks due at or before `now` fire.
    pub fn advance(&mut self, now: Duration) -> Vec<ChromeTransition> {
        let mut out = Vec::new();
        if self.torn_down {
            return out;
        }
        self.fire_due(now, &mut out);
        self.now = self.now.max(now);
        out
    }

    /// User closed the banner.
    pub fn dismiss(&mut self, now: Duration) -> Vec<ChromeTransition> {
        let mut out = Vec::new();
        if self.torn_down {
            return out;
        }
        self.fire_due(now, &mut out);
        self.now = self.now.max(now);
        if let Some(id) = self.banner_show.cancel() {
            trace!(timer = id.get(), "banner-show check cancelled by dismiss");
        }
        self.set_banner(BannerState::Dismissed, &mut out);
        out
    }

    /// Route or viewport changed.
    ///
    /// While the banner is ineligible its state is frozen. When it becomes
    /// eligible again while the nav bar is hidden, it stays retracted so it
    /// never hangs above a hidden nav bar. When the nav bar is already back
    /// and settled, a retracted banner follows it after the show delay.
    pub fn set_context(&mut self, context: PageContext, now: Duration) -> Vec<ChromeTransition> {
        let mut out = Vec::new();
        if self.torn_down || context == self.context {
            self.context = context;
            return out;
        }
        self.fire_due(now, &mut out);
        self.now = self.now.max(now);

        let was_eligible = self.banner_eligible();
        self.context = context;
        debug!(
            is_landing_route = context.is_landing_route,
            is_mobile_viewport = context.is_mobile_viewport,
            banner_eligible = context.banner_eligible(),
            "page context changed"
        );

        if !context.banner_eligible() {
            if let Some(id) = self.banner_show.cancel() {
                trace!(timer = id.get(), "banner-show check cancelled: banner ineligible");
            }
        } else if !was_eligible {
            match (self.navbar, self.banner) {
                (NavState::Hidden, BannerState::Shown) => {
                    self.set_banner(BannerState::ScrollHidden, &mut out);
                }
                (NavState::Shown, BannerState::ScrollHidden) if !self.nav_hide.is_armed() => {
                    let (id, replaced) = self.banner_show.arm(self.now, self.policy.show_delay, ());
                    trace!(
                        timer = id.get(),
                        replaced = replaced.map(|r| r.get()),
                        position = self.last_position,
                        "banner-show check armed: banner eligible again"
                    );
                }
                _ => {}
            }
        }
        out
    }

    /// Cancel every pending check and stop reacting to input.
    pub fn teardown(&mut self) {
        let nav = self.nav_hide.cancel();
        let banner = self.banner_show.cancel();
        self.torn_down = true;
        trace!(
            nav_hide_cancelled = nav.is_some(),
            banner_show_cancelled = banner.is_some(),
            "sequencer torn down"
        );
    }

    // ── transitions ─────────────────────────────────────────────────────

    fn on_scroll_down(&mut self, position: u32, out: &mut Vec<ChromeTransition>) {
        if let Some(id) = self.banner_show.cancel() {
            trace!(timer = id.get(), position, "banner-show check cancelled by downward scroll");
        }

        let retreating = self.banner_eligible()
            && match self.banner {
                BannerState::Shown => true,
                BannerState::ScrollHidden => self.nav_hide.is_armed(),
                BannerState::Dismissed => false,
            };

        if retreating {
            self.set_banner(BannerState::ScrollHidden, out);
            let keep = self
                .nav_hide
                .payload()
                .is_some_and(|c| c.armed_position > self.policy.dependent_hide_px);
            if !keep {
                let (id, replaced) = self.nav_hide.arm(
                    self.now,
                    self.policy.hide_delay,
                    NavHideCheck {
                        armed_position: position,
                    },
                );
                trace!(
                    timer = id.get(),
                    replaced = replaced.map(|r| r.get()),
                    position,
                    "nav-hide check armed"
                );
            }
        } else {
            if let Some(id) = self.nav_hide.cancel() {
                trace!(timer = id.get(), "nav-hide check superseded by immediate hide");
            }
            self.set_navbar(NavState::Hidden, out);
        }
    }

    fn on_scroll_up(&mut self, position: u32, direction: Direction, out: &mut Vec<ChromeTransition>) {
        if let Some(id) = self.nav_hide.cancel() {
            trace!(timer = id.get(), position, "nav-hide check cancelled by upward scroll");
        }
        self.set_navbar(NavState::Shown, out);

        let wants_banner = self.banner_eligible() && self.banner == BannerState::ScrollHidden;
        if wants_banner && (direction != Direction::None || !self.banner_show.is_armed()) {
            let (id, replaced) = self.banner_show.arm(self.now, self.policy.show_delay, ());
            trace!(
                timer = id.get(),
                replaced = replaced.map(|r| r.get()),
                position,
                "banner-show check armed"
            );
        }
    }

    fn fire_due(&mut self, now: Duration, out: &mut Vec<ChromeTransition>) {
        loop {
            let next = match (self.nav_hide.deadline(), self.banner_show.deadline()) {
                (Some(a), Some(b)) if a <= b => Some((Slot::NavHide, a)),
                (Some(_), Some(b)) => Some((Slot::BannerShow, b)),
                (Some(a), None) => Some((Slot::NavHide, a)),
                (None, Some(b)) => Some((Slot::BannerShow, b)),
                (None, None) => None,
            };
            let Some((slot, deadline)) = next else { break };
            if deadline > now {
                break;
            }
            self.now = self.now.max(deadline);
            match slot {
                Slot::NavHide => {
                    if let Some((id, _, check)) = self.nav_hide.take_due(deadline) {
                        let holds = self.last_position > self.policy.dependent_hide_px;
                        trace!(
                            timer = id.get(),
                            armed_position = check.armed_position,
                            position = self.last_position,
                            holds,
                            "nav-hide check fired"
                        );
                        if holds {
                            self.set_navbar(NavState::Hidden, out);
                        }
                    }
                }
                Slot::BannerShow => {
                    if let Some((id, _, ())) = self.banner_show.take_due(deadline) {
                        let holds = self.banner_eligible()
                            && self.banner == BannerState::ScrollHidden
                            && self.navbar == NavState::Shown;
                        trace!(timer = id.get(), holds, "banner-show check fired");
                        if holds {
                            self.set_banner(BannerState::Shown, out);
                        }
                    }
                }
            }
        }
    }

    fn set_banner(&mut self, to: BannerState, out: &mut Vec<ChromeTransition>) {
        let from = self.banner;
        if from == to || from == BannerState::Dismissed {
            return;
        }
        self.banner = to;
        debug!(
            element = "banner",
            from = from.as_str(),
            to = to.as_str(),
            position = self.last_position,
            at_ms = self.now.as_millis() as u64,
            "chrome transition"
        );
        out.push(ChromeTransition::Banner {
            at: self.now,
            from,
            to,
        });
    }

    fn set_navbar(&mut self, to: NavState, out: &mut Vec<ChromeTransition>) {
        let from = self.navbar;
        if from == to {
            return;
        }
        self.navbar = to;
        debug!(
            element = "navbar",
            from = from.as_str(),
            to = to.as_str(),
            position = self.last_position,
            at_ms = self.now.as_millis() as u64,
            "chrome transition"
        );
        out.push(ChromeTransition::Navbar {
            at: self.now,
            from,
            to,
        });
    }
}
