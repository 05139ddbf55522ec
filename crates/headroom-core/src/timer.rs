#![forbid(unsafe_code)]

//! Cancelable, fire-once deferred checks.
//!
//! A [`TimerSlot`] holds at most one pending check. Arming an occupied slot
//! replaces the previous check, so a slot can never accumulate timers. Time is
//! supplied by the caller as a monotonic [`Duration`]; the slot itself never
//! reads a clock, which keeps it usable under a host-driven or simulated clock.

use core::time::Duration;

/// Identity of one armed check, unique within its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Pending<P> {
    id: TimerId,
    deadline: Duration,
    payload: P,
}

/// One timer slot carrying a payload `P` for the check it schedules.
#[derive(Debug, Clone)]
pub struct TimerSlot<P> {
    pending: Option<Pending<P>>,
    next_id: u64,
}

impl<P> Default for TimerSlot<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TimerSlot<P> {
    /// Empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            next_id: 0,
        }
    }

    /// Arm a check due at `now + delay`, clearing any pending one first.
    ///
    /// Returns the new id and the id of the check it replaced, if any.
    pub fn arm(&mut self, now: Duration, delay: Duration, payload: P) -> (TimerId, Option<TimerId>) {
        let replaced = self.cancel();
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending = Some(Pending {
            id,
            deadline: now.saturating_add(delay),
            payload,
        });
        (id, replaced)
    }

    /// Clear the pending check. Returns its id if one was armed.
    pub fn cancel(&mut self) -> Option<TimerId> {
        self.pending.take().map(|p| p.id)
    }

    /// Whether a check is pending.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending check.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Id of the pending check.
    #[must_use]
    pub fn pending_id(&self) -> Option<TimerId> {
        self.pending.as_ref().map(|p| p.id)
    }

    /// Payload of the pending check.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.pending.as_ref().map(|p| &p.payload)
    }

    /// Remove and return the pending check if its deadline is `<= now`.
    pub fn take_due(&mut self, now: Duration) -> Option<(TimerId, Duration, P)> {
        match &self.pending {
            Some(p) if p.deadline <= now => self
                .pending
                .take()
                .map(|p| (p.id, p.deadline, p.payload)),
            _ => None,
        }
    }
}
