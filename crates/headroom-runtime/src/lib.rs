#![forbid(unsafe_code)]

//! headroom runtime
//!
//! Coordinates the page chrome on top of the `headroom-core` primitives.
//!
//! # Key Components
//!
//! - [`ChromeSequencer`] - banner + nav bar state machine with ordered,
//!   delayed, cancelable transitions
//! - [`SequencingPolicy`] - thresholds and delays the sequencer runs on
//! - [`SimpleNavbar`], [`ScrollToTop`], [`ScrolledIndicator`] - standalone
//!   single-element consumers
//! - [`ChromePolicy`] - policy-as-data configuration for all of the above
//!
//! # Role in headroom
//! The sequencer owns both chrome flags itself. That single ownership is what
//! lets it guarantee that the banner retreats before the nav bar and that the
//! nav bar returns before the banner.

pub mod policy_config;
pub mod sequencer;
pub mod standalone;

pub use policy_config::{ChromePolicy, PolicyConfigError};
pub use sequencer::{
    BannerState, ChromeSequencer, ChromeTransition, ChromeVisibility, NavState, SequencingPolicy,
};
pub use standalone::{
    ScrollBehavior, ScrollConsumer, ScrollRequest, ScrollToTop, ScrolledIndicator, SimpleNavbar,
};
