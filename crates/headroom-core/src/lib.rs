#![forbid(unsafe_code)]

//! Core: scroll observations, the shared scroll signal, and the threshold
//! primitive.
//!
//! # Role in headroom
//! `headroom-core` is the input layer. It turns raw viewport offsets into
//! [`ScrollObservation`] values, multiplexes them to every consumer through a
//! single [`ScrollSignal`], and provides the [`ThresholdUnit`] hysteresis
//! primitive that every visibility consumer is built on.
//!
//! # Primary responsibilities
//! - **ScrollSignal**: one listener per consumer tree, synchronous fan-out.
//! - **ThresholdUnit**: position/direction to boolean visibility, with a
//!   hysteresis band and a top-of-page override.
//! - **TimerSlot**: one cancelable deferred check per element.
//! - **PageContext**: the route/viewport facts that gate the banner.
//!
//! # How it fits in the system
//! `headroom-runtime` builds the chrome sequencer and standalone consumers on
//! top of these types; `headroom-web` wires them to a host page.

pub mod coalescer;
pub mod context;
pub mod observation;
pub mod signal;
pub mod threshold;
pub mod timer;

pub use coalescer::ScrollCoalescer;
pub use context::{ContextRules, ContextTracker, PageContext};
pub use observation::{Direction, ScrollObservation, clamp_position};
pub use signal::{ScrollSignal, SignalSubscription};
pub use threshold::{ThresholdConfig, ThresholdUnit};
pub use timer::{TimerId, TimerSlot};
