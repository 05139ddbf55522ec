#![forbid(unsafe_code)]

//! Policy-as-data configuration for the chrome controllers.
//!
//! Captures every tunable threshold and delay as a single [`ChromePolicy`]
//! that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # headroom.toml
//! [sequencing]
//! hide_start_px = 60
//! dependent_hide_px = 120
//! hide_delay_ms = 200
//!
//! [scroll_to_top]
//! threshold_px = 400
//! ```
//!
//! ```rust,ignore
//! let policy = ChromePolicy::from_toml_file("headroom.toml")?;
//! let policy = ChromePolicy::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the controllers use on their own, so
//! `ChromePolicy::default()` behaves exactly like the hardcoded components.
//! Missing keys in a file fall back to those defaults.

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use core::time::Duration;

use headroom_core::ContextRules;

use crate::sequencer::SequencingPolicy;
use crate::standalone::{ScrollToTop, ScrolledIndicator, SimpleNavbar};

// ---------------------------------------------------------------------------
// Top-level ChromePolicy
// ---------------------------------------------------------------------------

/// Top-level policy for every scroll-driven chrome element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ChromePolicy {
    /// Banner + nav bar sequencing.
    pub sequencing: SequencingPolicyConfig,

    /// Nav bar of banner-less pages.
    pub simple_navbar: SimpleNavbarPolicyConfig,

    /// Back-to-top affordance.
    pub scroll_to_top: ScrollToTopPolicyConfig,

    /// Compact nav backdrop.
    pub backdrop: BackdropPolicyConfig,

    /// Route and viewport gating.
    pub context: ContextPolicyConfig,
}

impl ChromePolicy {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn to_toml_string(&self) -> Result<String, PolicyConfigError> {
        toml::to_string_pretty(self).map_err(PolicyConfigError::TomlSer)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the policy is
    /// valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .to_sequencing_policy()
            .validate()
            .into_iter()
            .map(|e| format!("sequencing.{e}"))
            .collect();

        if self.simple_navbar.show_below_px > self.simple_navbar.hide_above_px {
            errors.push(format!(
                "simple_navbar.show_below_px ({}) must be <= hide_above_px ({})",
                self.simple_navbar.show_below_px, self.simple_navbar.hide_above_px
            ));
        }

        if self.scroll_to_top.threshold_px == 0 {
            errors.push("scroll_to_top.threshold_px must be > 0".into());
        }

        if self.context.mobile_breakpoint_px == 0 {
            errors.push("context.mobile_breakpoint_px must be > 0".into());
        }

        if !self.context.landing_route.starts_with('/') {
            errors.push(format!(
                "context.landing_route must start with '/', got {:?}",
                self.context.landing_route
            ));
        }

        errors
    }

    /// Validate, returning the policy or every violation at once.
    pub fn validated(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(violations = errors.len(), "chrome policy rejected");
            Err(PolicyConfigError::Validation(errors))
        }
    }

    // -- conversions --------------------------------------------------------

    /// Sequencer policy.
    #[must_use]
    pub fn to_sequencing_policy(&self) -> SequencingPolicy {
        let s = &self.sequencing;
        SequencingPolicy {
            hide_start_px: s.hide_start_px,
            dependent_hide_px: s.dependent_hide_px,
            reveal_px: s.reveal_px,
            hide_delay: Duration::from_millis(s.hide_delay_ms),
            show_delay: Duration::from_millis(s.show_delay_ms),
            animation_lead: Duration::from_millis(s.animation_lead_ms),
            min_up_delta: s.min_up_delta_px,
        }
    }

    /// Route/viewport rules.
    #[must_use]
    pub fn to_context_rules(&self) -> ContextRules {
        ContextRules {
            landing_route: self.context.landing_route.clone(),
            mobile_breakpoint_px: self.context.mobile_breakpoint_px,
        }
    }

    /// Fresh simplified nav bar.
    #[must_use]
    pub const fn build_simple_navbar(&self) -> SimpleNavbar {
        SimpleNavbar::new(self.simple_navbar.show_below_px, self.simple_navbar.hide_above_px)
    }

    /// Fresh back-to-top affordance.
    #[must_use]
    pub const fn build_scroll_to_top(&self) -> ScrollToTop {
        ScrollToTop::new(self.scroll_to_top.threshold_px)
    }

    /// Fresh backdrop indicator.
    #[must_use]
    pub const fn build_scrolled_indicator(&self) -> ScrolledIndicator {
        ScrolledIndicator::new(self.backdrop.threshold_px)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs (flat, serde-friendly)
// ---------------------------------------------------------------------------

/// Sequencer parameters. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SequencingPolicyConfig {
    /// T1. Default: 60.
    pub hide_start_px: u32,
    /// T2. Default: 120.
    pub dependent_hide_px: u32,
    /// T3. Default: 20.
    pub reveal_px: u32,
    /// D1. Default: 200.
    pub hide_delay_ms: u64,
    /// D2. Default: 100.
    pub show_delay_ms: u64,
    /// Minimum time an animation needs to be visibly underway. Default: 100.
    pub animation_lead_ms: u64,
    /// Jitter floor for upward steps. Default: 0.
    pub min_up_delta_px: u32,
}

impl Default for SequencingPolicyConfig {
    fn default() -> Self {
        let d = SequencingPolicy::default();
        Self {
            hide_start_px: d.hide_start_px,
            dependent_hide_px: d.dependent_hide_px,
            reveal_px: d.reveal_px,
            hide_delay_ms: d.hide_delay.as_millis() as u64,
            show_delay_ms: d.show_delay.as_millis() as u64,
            animation_lead_ms: d.animation_lead.as_millis() as u64,
            min_up_delta_px: d.min_up_delta,
        }
    }
}

/// Simplified nav bar parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SimpleNavbarPolicyConfig {
    /// Default: 0 (only the top of the page or an upward step shows it).
    pub show_below_px: u32,
    /// Default: 100.
    pub hide_above_px: u32,
}

impl Default for SimpleNavbarPolicyConfig {
    fn default() -> Self {
        Self {
            show_below_px: 0,
            hide_above_px: 100,
        }
    }
}

/// Back-to-top parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ScrollToTopPolicyConfig {
    /// Default: 300.
    pub threshold_px: u32,
}

impl Default for ScrollToTopPolicyConfig {
    fn default() -> Self {
        Self { threshold_px: 300 }
    }
}

/// Compact backdrop parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct BackdropPolicyConfig {
    /// Default: 10.
    pub threshold_px: u32,
}

impl Default for BackdropPolicyConfig {
    fn default() -> Self {
        Self { threshold_px: 10 }
    }
}

/// Route and viewport gating.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ContextPolicyConfig {
    /// Default: "/".
    pub landing_route: String,
    /// Default: 768.
    pub mobile_breakpoint_px: u32,
}

impl Default for ContextPolicyConfig {
    fn default() -> Self {
        let d = ContextRules::default();
        Self {
            landing_route: d.landing_route,
            mobile_breakpoint_px: d.mobile_breakpoint_px,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`ChromePolicy`].
#[derive(Debug)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "policy-config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for PolicyConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
