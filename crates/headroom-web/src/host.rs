#![forbid(unsafe_code)]

//! Host-driven chrome driver.
//!
//! [`ChromeHost`] owns one [`ScrollSignal`] and attaches every chrome
//! controller to it as a subscriber: the [`ChromeSequencer`] for the banner +
//! nav bar pair, then the standalone consumers. The embedding host forwards
//! raw inputs; the driver answers with the transitions they caused and a
//! [`HostSnapshot`] for rendering.
//!
//! # Design
//!
//! - **One listener**: the host registers a single scroll listener and calls
//!   [`ChromeHost::scroll`]. Additional consumers join through
//!   [`ChromeHost::subscribe`] instead of registering listeners of their own.
//! - **Host time**: every call carries a timestamp. Timestamps that go
//!   backwards are clamped to the latest one seen.
//! - **Frame coalescing**: hosts that receive many raw ticks per frame can use
//!   [`ChromeHost::scroll_raw`] + [`ChromeHost::frame`]; reversals are still
//!   delivered.
//!
//! # Teardown
//!
//! [`ChromeHost::teardown`] (also run on drop) cancels pending sequencer
//! checks and releases every subscription the driver created. Later calls are
//! no-ops.

use std::cell::RefCell;
use std::rc::Rc;

use core::time::Duration;

use headroom_core::{
    ContextTracker, PageContext, ScrollCoalescer, ScrollObservation, ScrollSignal,
    SignalSubscription,
};
use headroom_runtime::{
    ChromePolicy, ChromeSequencer, ChromeTransition, ChromeVisibility, ScrollConsumer,
    ScrollRequest, ScrollToTop, ScrolledIndicator, SimpleNavbar,
};
use tracing::{debug, info, trace, warn};

use crate::{DeterministicClock, HostClock, HostError, HostInput};

type Shared<T> = Rc<RefCell<T>>;

/// Everything a renderer needs after a host call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostSnapshot {
    /// Last clamped scroll position.
    pub position: u32,
    /// Current gating facts.
    pub context: PageContext,
    /// Banner + nav bar pair.
    pub chrome: ChromeVisibility,
    /// Nav bar of banner-less pages.
    pub simple_navbar: bool,
    /// Back-to-top affordance.
    pub scroll_to_top: bool,
    /// Compact nav backdrop.
    pub scrolled: bool,
}

/// Accumulated outputs for host consumption.
#[derive(Debug, Default, Clone)]
pub struct HostOutputs {
    /// Every sequencer transition since the last drain, in order.
    pub transitions: Vec<ChromeTransition>,
    /// Programmatic scrolls the host should perform.
    pub scroll_requests: Vec<ScrollRequest>,
}

/// Host-driven driver for every chrome controller of one page mount.
pub struct ChromeHost {
    policy: ChromePolicy,
    signal: ScrollSignal,
    coalescer: ScrollCoalescer,
    sequencer: Shared<ChromeSequencer>,
    pending: Shared<Vec<ChromeTransition>>,
    simple_navbar: Shared<SimpleNavbar>,
    scroll_to_top: Shared<ScrollToTop>,
    scrolled: Shared<ScrolledIndicator>,
    subscriptions: Vec<SignalSubscription>,
    context: ContextTracker,
    clock: DeterministicClock,
    outputs: HostOutputs,
    torn_down: bool,
}

fn attach_consumer<C>(signal: &ScrollSignal, consumer: &Shared<C>) -> SignalSubscription
where
    C: ScrollConsumer + 'static,
{
    let consumer = Rc::clone(consumer);
    signal.subscribe(move |obs| {
        let mut c = consumer.borrow_mut();
        if c.observe(obs) {
            trace!(
                consumer = c.name(),
                visible = c.visible(),
                position = obs.position,
                "consumer changed"
            );
        }
    })
}

impl ChromeHost {
    /// Mount on `route` with a viewport `width_px` wide, scrolled to the top.
    pub fn new(policy: ChromePolicy, route: &str, width_px: u32) -> Result<Self, HostError> {
        let errors = policy.validate();
        if !errors.is_empty() {
            warn!(violations = errors.len(), "chrome host rejected policy");
            return Err(HostError::InvalidPolicy(errors));
        }

        let context = ContextTracker::new(policy.to_context_rules(), route, width_px);
        let signal = ScrollSignal::new(0);
        let sequencer = Rc::new(RefCell::new(ChromeSequencer::new(
            policy.to_sequencing_policy(),
            context.current(),
        )));
        let pending = Rc::new(RefCell::new(Vec::new()));
        let simple_navbar = Rc::new(RefCell::new(policy.build_simple_navbar()));
        let scroll_to_top = Rc::new(RefCell::new(policy.build_scroll_to_top()));
        let scrolled = Rc::new(RefCell::new(policy.build_scrolled_indicator()));

        let sequencer_sub = {
            let sequencer = Rc::clone(&sequencer);
            let pending = Rc::clone(&pending);
            signal.subscribe(move |obs: &ScrollObservation| {
                let applied = sequencer.borrow_mut().observe(obs);
                pending.borrow_mut().extend(applied);
            })
        };
        let subscriptions = vec![
            sequencer_sub,
            attach_consumer(&signal, &simple_navbar),
            attach_consumer(&signal, &scroll_to_top),
            attach_consumer(&signal, &scrolled),
        ];

        info!(
            route,
            width_px,
            banner_eligible = context.current().banner_eligible(),
            "chrome host mounted"
        );

        Ok(Self {
            policy,
            signal,
            coalescer: ScrollCoalescer::new(0.0),
            sequencer,
            pending,
            simple_navbar,
            scroll_to_top,
            scrolled,
            subscriptions,
            context,
            clock: DeterministicClock::new(),
            outputs: HostOutputs::default(),
            torn_down: false,
        })
    }

    /// Start with the banner already dismissed (the host persisted an earlier
    /// dismissal). Call before forwarding any input.
    #[must_use]
    pub fn with_persisted_dismissal(self) -> Self {
        *self.sequencer.borrow_mut() =
            ChromeSequencer::with_dismissed(self.policy.to_sequencing_policy(), self.context.current());
        self
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> &ChromePolicy {
        &self.policy
    }

    /// Current route.
    #[must_use]
    pub fn route(&self) -> &str {
        self.context.route()
    }

    /// Current viewport width.
    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.context.width_px()
    }

    /// Latest host time seen.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Earliest pending sequencer check. Hosts schedule a [`tick`](Self::tick)
    /// for it.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.sequencer.borrow().next_deadline()
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Current visibility of every element.
    #[must_use]
    pub fn snapshot(&self) -> HostSnapshot {
        HostSnapshot {
            position: self.signal.last_position(),
            context: self.context.current(),
            chrome: self.sequencer.borrow().visibility(),
            simple_navbar: self.simple_navbar.borrow().visible(),
            scroll_to_top: self.scroll_to_top.borrow().visible(),
            scrolled: self.scrolled.borrow().visible(),
        }
    }

    /// Accumulated outputs.
    #[must_use]
    pub const fn outputs(&self) -> &HostOutputs {
        &self.outputs
    }

    /// Take and clear accumulated outputs.
    pub fn take_outputs(&mut self) -> HostOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Attach another consumer to the shared scroll signal.
    pub fn subscribe(&self, callback: impl Fn(&ScrollObservation) + 'static) -> SignalSubscription {
        self.signal.subscribe(callback)
    }

    /// Apply one host input.
    pub fn apply(&mut self, input: &HostInput) -> Vec<ChromeTransition> {
        let at = Duration::from_millis(input.ts_ms());
        match input {
            HostInput::Scroll { y, .. } => self.scroll(at, *y),
            HostInput::Resize { width_px, .. } => self.resize(at, *width_px),
            HostInput::Route { path, .. } => self.navigate(at, path),
            HostInput::Dismiss { .. } => self.dismiss(at),
            HostInput::Tick { .. } => self.tick(at),
        }
    }

    /// Forward one raw scroll offset immediately.
    ///
    /// A sample still queued by [`scroll_raw`](Self::scroll_raw) arrived
    /// earlier, so it is delivered first.
    pub fn scroll(&mut self, at: Duration, y: f64) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        if let Some((queued, ts)) = self.coalescer.flush() {
            self.signal.emit(queued, ts);
        }
        self.signal.emit(y, at);
        self.coalescer.reanchor(y);
        self.collect()
    }

    /// Queue one raw scroll offset for the next [`frame`](Self::frame).
    ///
    /// A tick that reverses the queued direction delivers the queued sample
    /// right away.
    pub fn scroll_raw(&mut self, at: Duration, y: f64) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        if let Some((released, ts)) = self.coalescer.push(y, at) {
            self.signal.emit(released, ts);
        }
        self.collect()
    }

    /// Animation frame: deliver the queued sample and let due checks fire.
    pub fn frame(&mut self, at: Duration) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        if let Some((y, ts)) = self.coalescer.flush() {
            self.signal.emit(y, ts);
        }
        let fired = self.sequencer.borrow_mut().advance(at);
        self.pending.borrow_mut().extend(fired);
        self.collect()
    }

    /// Time passed with no other input.
    pub fn tick(&mut self, at: Duration) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        let fired = self.sequencer.borrow_mut().advance(at);
        self.pending.borrow_mut().extend(fired);
        self.collect()
    }

    /// Viewport width changed.
    pub fn resize(&mut self, at: Duration, width_px: u32) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        if let Some(ctx) = self.context.set_viewport_width(width_px) {
            self.set_context(ctx, at);
        }
        self.collect()
    }

    /// Client-side navigation.
    pub fn navigate(&mut self, at: Duration, path: &str) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        debug!(path, "route changed");
        if let Some(ctx) = self.context.set_route(path) {
            self.set_context(ctx, at);
        }
        self.collect()
    }

    /// User closed the banner.
    pub fn dismiss(&mut self, at: Duration) -> Vec<ChromeTransition> {
        if self.torn_down {
            return Vec::new();
        }
        let at = self.clock.catch_up(at);
        let applied = self.sequencer.borrow_mut().dismiss(at);
        self.pending.borrow_mut().extend(applied);
        self.collect()
    }

    /// User pressed the back-to-top affordance.
    ///
    /// Returns `None` while the affordance is hidden or after teardown.
    pub fn activate_scroll_to_top(&mut self) -> Option<ScrollRequest> {
        if self.torn_down {
            return None;
        }
        let stt = self.scroll_to_top.borrow();
        if !stt.visible() {
            return None;
        }
        let request = stt.activate();
        drop(stt);
        debug!(top = request.top, "scroll-to-top requested");
        self.outputs.scroll_requests.push(request);
        Some(request)
    }

    /// Cancel pending checks and release every subscription.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.sequencer.borrow_mut().teardown();
        self.subscriptions.clear();
        self.coalescer.clear();
        self.torn_down = true;
        info!(emitted = self.signal.emitted(), "chrome host torn down");
    }

    fn set_context(&mut self, ctx: PageContext, at: Duration) {
        let applied = self.sequencer.borrow_mut().set_context(ctx, at);
        self.pending.borrow_mut().extend(applied);
    }

    fn collect(&mut self) -> Vec<ChromeTransition> {
        let applied = std::mem::take(&mut *self.pending.borrow_mut());
        self.outputs.transitions.extend_from_slice(&applied);
        applied
    }
}

impl Drop for ChromeHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for ChromeHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeHost")
            .field("route", &self.context.route())
            .field("width_px", &self.context.width_px())
            .field("now", &self.clock.now_mono())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
