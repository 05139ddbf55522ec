#![forbid(unsafe_code)]

//! headroom error model.
//!
//! # Design Principles
//!
//! 1. **No errors on the scroll path**: observing, advancing and dismissing
//!    never fail. Errors only come from mounting, loading configuration,
//!    parsing host messages, replaying traces and installing logging.
//! 2. **Domain-specific errors**: each crate owns its typed error; [`Error`]
//!    wraps them so applications can use a single `?`.

use std::fmt;

use headroom_runtime::PolicyConfigError;
#[cfg(feature = "input-parser")]
use headroom_web::input_parser::InputParseError;
#[cfg(feature = "web")]
use headroom_web::{HostError, session_record::ReplayError};

/// Top-level error type for headroom integrations.
#[derive(Debug)]
pub enum Error {
    /// Policy could not be loaded or failed validation.
    Policy(PolicyConfigError),
    /// Host driver could not be mounted.
    #[cfg(feature = "web")]
    Host(HostError),
    /// Session trace could not be replayed.
    #[cfg(feature = "web")]
    Replay(ReplayError),
    /// Host message could not be parsed.
    #[cfg(feature = "input-parser")]
    Input(InputParseError),
    /// A global tracing subscriber was already installed.
    Logging(String),
}

impl Error {
    /// Validation violations carried by this error, if any.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Policy(PolicyConfigError::Validation(v)) => v,
            #[cfg(feature = "web")]
            Self::Host(HostError::InvalidPolicy(v)) => v,
            #[cfg(feature = "web")]
            Self::Replay(ReplayError::Host(HostError::InvalidPolicy(v))) => v,
            _ => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy(e) => write!(f, "policy: {e}"),
            #[cfg(feature = "web")]
            Self::Host(e) => write!(f, "host: {e}"),
            #[cfg(feature = "web")]
            Self::Replay(e) => write!(f, "replay: {e}"),
            #[cfg(feature = "input-parser")]
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Logging(msg) => write!(f, "logging: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Policy(e) => Some(e),
            #[cfg(feature = "web")]
            Self::Host(e) => Some(e),
            #[cfg(feature = "web")]
            Self::Replay(e) => Some(e),
            #[cfg(feature = "input-parser")]
            Self::Input(e) => Some(e),
            Self::Logging(_) => None,
        }
    }
}

impl From<PolicyConfigError> for Error {
    fn from(e: PolicyConfigError) -> Self {
        Self::Policy(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Policy(PolicyConfigError::Io(e))
    }
}

#[cfg(feature = "web")]
impl From<HostError> for Error {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

#[cfg(feature = "web")]
impl From<ReplayError> for Error {
    fn from(e: ReplayError) -> Self {
        Self::Replay(e)
    }
}

#[cfg(feature = "input-parser")]
impl From<InputParseError> for Error {
    fn from(e: InputParseError) -> Self {
        Self::Input(e)
    }
}

/// Standard result type for headroom APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn policy_violations_are_reachable() {
        let err = Error::from(PolicyConfigError::Validation(vec!["x".into()]));
        assert_eq!(err.violations(), ["x".to_string()]);
        assert_eq!(err.to_string(), "policy: validation errors: x");
        assert!(err.source().is_some());
    }

    #[test]
    fn io_maps_to_policy() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::Policy(PolicyConfigError::Io(_))));
        assert!(err.violations().is_empty());
    }

    #[cfg(feature = "web")]
    #[test]
    fn host_and_replay_errors_wrap() {
        let err = Error::from(HostError::InvalidPolicy(vec!["a".into(), "b".into()]));
        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.to_string(), "host: invalid policy: a; b");

        let err = Error::from(ReplayError::MissingHeader);
        assert_eq!(err.to_string(), "replay: trace missing header record");
    }

    #[test]
    fn logging_has_no_source() {
        let err = Error::Logging("already set".into());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "logging: already set");
    }
}
