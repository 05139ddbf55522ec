#![forbid(unsafe_code)]

//! Global tracing subscriber setup.
//!
//! The library crates only emit `tracing` events; nothing is printed until an
//! application installs a subscriber. These helpers install a `fmt`
//! subscriber filtered by `RUST_LOG`, falling back to the given directives.
//!
//! | level | what |
//! |-------|------|
//! | INFO  | host mount and teardown |
//! | DEBUG | every chrome transition, route and context changes |
//! | TRACE | timer arm/cancel/fire, subscriber churn, `headroom.emit` spans |
//! | WARN  | rejected policies, replay mismatches |

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Default directives when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "headroom=info";

/// Filter from `RUST_LOG`, or from `fallback` when unset or invalid.
#[must_use]
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install a human-readable subscriber with [`DEFAULT_FILTER`].
pub fn init() -> Result<()> {
    init_with_filter(DEFAULT_FILTER)
}

/// Install a human-readable subscriber with custom fallback directives.
pub fn init_with_filter(fallback: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Install a JSON-lines subscriber.
#[cfg(feature = "tracing-json")]
pub fn init_json(fallback: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(env_filter(fallback))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
