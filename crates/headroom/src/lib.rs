#![forbid(unsafe_code)]

//! headroom public facade.
//!
//! Scroll-driven visibility for page chrome: an announcement banner and a nav
//! bar that retreat and return in a fixed order, plus standalone threshold
//! consumers (back-to-top affordance, compact backdrop, simplified nav bar).
//!
//! This crate re-exports the stable surface of the workspace crates and a
//! prelude for day-to-day usage.
//!
//! ```
//! use headroom::prelude::*;
//! use std::time::Duration;
//!
//! let mut seq = ChromeSequencer::new(SequencingPolicy::default(), PageContext::landing_desktop());
//! let t = seq.observe(&ScrollObservation::new(70, 0, Duration::ZERO));
//! assert_eq!(seq.banner(), BannerState::ScrollHidden);
//! assert_eq!(t.len(), 1);
//! ```

pub mod error;
pub mod logging;

// --- Core primitives ------------------------------------------------------

pub use headroom_core::{
    ContextRules, ContextTracker, Direction, PageContext, ScrollCoalescer, ScrollObservation,
    ScrollSignal, SignalSubscription, ThresholdConfig, ThresholdUnit, clamp_position,
};

// --- Controllers ----------------------------------------------------------

pub use headroom_runtime::{
    BannerState, ChromePolicy, ChromeSequencer, ChromeTransition, ChromeVisibility, NavState,
    PolicyConfigError, ScrollBehavior, ScrollConsumer, ScrollRequest, ScrollToTop,
    ScrolledIndicator, SequencingPolicy, SimpleNavbar,
};

// --- Host driver ----------------------------------------------------------

#[cfg(feature = "web")]
pub use headroom_web::{
    ChromeHost, DeterministicClock, HostClock, HostError, HostInput, HostOutputs, HostSnapshot,
    SystemClock,
};

pub use error::{Error, Result};

/// Load a policy file, choosing the format by extension (`.json`, else TOML),
/// and validate it.
#[cfg(feature = "policy-config")]
pub fn load_policy(path: impl AsRef<std::path::Path>) -> Result<ChromePolicy> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let policy = if is_json {
        ChromePolicy::from_json_file(path)?
    } else {
        ChromePolicy::from_toml_file(path)?
    };
    let policy = policy.validated()?;
    tracing::debug!(path = %path.display(), json = is_json, "policy loaded");
    Ok(policy)
}

/// Mount a host driver after validating `policy`.
#[cfg(feature = "web")]
pub fn mount(policy: ChromePolicy, route: &str, width_px: u32) -> Result<ChromeHost> {
    Ok(ChromeHost::new(policy, route, width_px)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BannerState, ChromePolicy, ChromeSequencer, ChromeTransition, Error, NavState,
        PageContext, Result, ScrollConsumer, ScrollObservation, ScrollSignal, ScrollToTop,
        ScrolledIndicator, SequencingPolicy, SimpleNavbar,
    };

    #[cfg(feature = "web")]
    pub use crate::{ChromeHost, HostInput, HostSnapshot};

    pub use crate::{core, runtime};

    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use headroom_core as core;
pub use headroom_runtime as runtime;
#[cfg(feature = "web")]
pub use headroom_web as web;
