#![forbid(unsafe_code)]

//! Shared scroll signal with publish/subscribe fan-out.
//!
//! # Design
//!
//! A page registers exactly one host scroll listener and forwards every raw
//! offset into a [`ScrollSignal`]. The signal clamps the offset, pairs it with
//! the previously emitted position, and hands the resulting
//! [`ScrollObservation`] to every live subscriber in registration order.
//! Consumers never register host listeners of their own.
//!
//! Storage is `Rc<RefCell<..>>`: the signal lives on the host's UI thread and
//! is never sent across threads.
//!
//! # Failure Modes
//!
//! - **Re-entrant emit**: a subscriber may call [`ScrollSignal::emit`] from its
//!   callback. The nested observation is delivered in full before the outer
//!   fan-out continues, so subscribers later in the list see the nested tick
//!   first. Avoid it.
//! - **No scroll surface**: if the host never forwards offsets, the signal
//!   never emits and consumers stay in their mount state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use core::time::Duration;
use tracing::{trace, trace_span};
use web_time::Instant;

use crate::observation::{ScrollObservation, clamp_position};

type Callback = Rc<dyn Fn(&ScrollObservation)>;

struct SignalInner {
    last_position: u32,
    next_id: u64,
    emitted: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// The single scroll source for a consumer tree.
///
/// Cloning a `ScrollSignal` creates another handle to the same source.
///
/// # Invariants
///
/// 1. Every call to [`emit`](Self::emit) reaches every subscriber that was
///    live when the call started, in registration order.
/// 2. `previous_position` of an emitted observation equals the `position` of
///    the observation emitted before it (or the mount position).
/// 3. Dropping a [`SignalSubscription`] removes its callback immediately;
///    [`subscriber_count`](Self::subscriber_count) never counts dead entries.
pub struct ScrollSignal {
    inner: Rc<RefCell<SignalInner>>,
}

impl Clone for ScrollSignal {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for ScrollSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ScrollSignal")
            .field("last_position", &inner.last_position)
            .field("emitted", &inner.emitted)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl Default for ScrollSignal {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ScrollSignal {
    /// Create a signal whose first observation will report
    /// `initial_position` as its previous position.
    #[must_use]
    pub fn new(initial_position: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                last_position: initial_position,
                next_id: 0,
                emitted: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a callback for every future observation.
    ///
    /// The returned guard owns the registration; dropping it unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&ScrollObservation) + 'static) -> SignalSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let callback: Callback = Rc::new(callback);
        inner.subscribers.push((id, callback));
        trace!(sub_id = id, subscribers = inner.subscribers.len(), "scroll subscriber added");
        SignalSubscription {
            id,
            source: Rc::downgrade(&self.inner),
        }
    }

    /// Forward one raw host offset.
    ///
    /// The offset is clamped with [`clamp_position`] and delivered to all
    /// subscribers. Returns the observation that was delivered.
    pub fn emit(&self, raw_position: f64, timestamp: Duration) -> ScrollObservation {
        let (observation, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let position = clamp_position(raw_position);
            let observation = ScrollObservation::new(position, inner.last_position, timestamp);
            inner.last_position = position;
            inner.emitted += 1;
            let callbacks: Vec<Callback> =
                inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect();
            (observation, callbacks)
        };

        if callbacks.is_empty() {
            return observation;
        }

        let started = Instant::now();
        let span = trace_span!(
            "headroom.emit",
            position = observation.position,
            subscribers = callbacks.len() as u64,
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        for cb in &callbacks {
            cb(&observation);
        }

        span.record("duration_us", started.elapsed().as_micros() as u64);
        observation
    }

    /// Position carried by the most recent observation.
    #[must_use]
    pub fn last_position(&self) -> u32 {
        self.inner.borrow().last_position
    }

    /// Number of observations emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.inner.borrow().emitted
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Drop every registration. Outstanding guards become inert.
    pub fn clear(&self) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let n = inner.subscribers.len();
            inner.subscribers.clear();
            n
        };
        trace!(removed, "scroll subscribers cleared");
    }
}

/// RAII registration returned by [`ScrollSignal::subscribe`].
///
/// Holds only a weak handle to the signal, so a guard outliving its signal
/// is harmless.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct SignalSubscription {
    id: u64,
    source: Weak<RefCell<SignalInner>>,
}

impl SignalSubscription {
    /// Registration id, unique per signal.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for SignalSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        let Some(source) = self.source.upgrade() else {
            return;
        };
        // The callback is removed outside of any fan-out borrow; emit clones
        // the callback list before invoking it.
        let Ok(mut inner) = source.try_borrow_mut() else {
            return;
        };
        inner.subscribers.retain(|(id, _)| *id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const T0: Duration = Duration::ZERO;

    #[test]
    fn emit_pairs_with_previous_position() {
        let signal = ScrollSignal::new(5);
        let first = signal.emit(40.0, T0);
        assert_eq!(first.previous_position, 5);
        assert_eq!(first.position, 40);
        let second = signal.emit(10.0, Duration::from_millis(16));
        assert_eq!(second.previous_position, 40);
        assert_eq!(signal.last_position(), 10);
        assert_eq!(signal.emitted(), 2);
    }

    #[test]
    fn negative_offsets_are_clamped() {
        let signal = ScrollSignal::new(0);
        let obs = signal.emit(-30.0, T0);
        assert_eq!(obs.position, 0);
    }

    #[test]
    fn all_subscribers_receive_in_order() {
        let signal = ScrollSignal::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = signal.subscribe(move |o| l1.borrow_mut().push(("a", o.position)));
        let l2 = Rc::clone(&log);
        let _b = signal.subscribe(move |o| l2.borrow_mut().push(("b", o.position)));

        signal.emit(12.0, T0);
        assert_eq!(*log.borrow(), vec![("a", 12), ("b", 12)]);
    }

    #[test]
    fn dropping_guard_unsubscribes_immediately() {
        let signal = ScrollSignal::default();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |_| h.set(h.get() + 1));
        assert_eq!(signal.subscriber_count(), 1);

        signal.emit(1.0, T0);
        drop(sub);
        assert_eq!(signal.subscriber_count(), 0);
        signal.emit(2.0, T0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn guard_outliving_signal_is_harmless() {
        let signal = ScrollSignal::default();
        let sub = signal.subscribe(|_| {});
        drop(signal);
        drop(sub);
    }

    #[test]
    fn clear_removes_everyone() {
        let signal = ScrollSignal::default();
        let _a = signal.subscribe(|_| {});
        let _b = signal.subscribe(|_| {});
        signal.clear();
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let signal = ScrollSignal::default();
        let other = signal.clone();
        let _s = other.subscribe(|_| {});
        signal.emit(9.0, T0);
        assert_eq!(other.last_position(), 9);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn subscriber_may_drop_another_during_emit() {
        let signal = ScrollSignal::default();
        let victim: Rc<RefCell<Option<SignalSubscription>>> = Rc::new(RefCell::new(None));
        let v = Rc::clone(&victim);
        let _killer = signal.subscribe(move |_| {
            v.borrow_mut().take();
        });
        *victim.borrow_mut() = Some(signal.subscribe(|_| {}));
        assert_eq!(signal.subscriber_count(), 2);
        signal.emit(3.0, T0);
        assert_eq!(signal.subscriber_count(), 1);
    }
}
