//! Error types for the Volterra simulation engine.
//!
//! Organized by boundary: config validation (inbound payloads), command
//! routing (transport events), and stepping (integration halts).

use std::error::Error;
use std::fmt;

use crate::command::ConfigField;

/// Errors from validating a config update.
///
/// Checks run fail-fast in a fixed order, so the variant returned for a
/// payload with several problems is always the first one encountered.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigUpdateError {
    /// The top-level payload is not a key/value mapping.
    MalformedInput,
    /// A required field is absent.
    MissingField {
        /// The absent field.
        field: ConfigField,
    },
    /// A field is present but not a number.
    InvalidType {
        /// The offending field.
        field: ConfigField,
    },
    /// A field is NaN or infinite.
    NonFinite {
        /// The offending field.
        field: ConfigField,
    },
    /// `step` or `max` is zero or negative.
    NonPositive {
        /// Either [`ConfigField::Step`] or [`ConfigField::Max`].
        field: ConfigField,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "invalid config data: expected a key/value mapping"),
            Self::MissingField { field } => write!(f, "missing required field: {field}"),
            Self::InvalidType { field } => {
                write!(f, "invalid value for {field}: expected number")
            }
            Self::NonFinite { field } => {
                write!(f, "invalid value for {field}: must be a finite number")
            }
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
        }
    }
}

impl Error for ConfigUpdateError {}

/// Errors from mapping a transport event onto a typed command.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandError {
    /// The event name does not correspond to any command.
    UnknownEvent {
        /// The unrecognized event name.
        name: String,
    },
    /// The event requires a payload but none was supplied.
    MissingPayload {
        /// The event that needed a payload.
        event: String,
    },
    /// The config payload failed validation.
    Config(ConfigUpdateError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEvent { name } => write!(f, "unknown event '{name}'"),
            Self::MissingPayload { event } => write!(f, "event '{event}' requires a payload"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigUpdateError> for CommandError {
    fn from(e: ConfigUpdateError) -> Self {
        Self::Config(e)
    }
}

/// Reasons the stepping loop halts a run on its own.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// An RK4 step produced NaN or an infinity. The step was not committed;
    /// the carried values are the rejected results.
    NonFiniteState {
        /// Simulated time the rejected step would have reached.
        t: f64,
        /// Rejected prey value.
        x: f64,
        /// Rejected predator value.
        y: f64,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteState { t, x, y } => {
                write!(f, "non-finite state at t={t}: x={x}, y={y}")
            }
        }
    }
}

impl Error for StepError {}
