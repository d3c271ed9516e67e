//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] controls how the stepping thread is run, not what it
//! simulates: model parameters arrive through
//! [`Controller::update_config()`](crate::Controller::update_config).

use std::error::Error;
use std::fmt;

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration for a [`Controller`](crate::Controller).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Wall-clock seconds of pacing delay per simulated second. Default: 1.0,
    /// so the delay after each step equals `dt` seconds. `0.0` disables
    /// pacing entirely (batch runs, tests).
    pub time_scale: f64,
    /// Name given to the stepping thread. Default: `"volterra-step"`.
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            thread_name: "volterra-step".into(),
        }
    }
}

impl EngineConfig {
    /// Config with pacing disabled. Runs go as fast as the CPU allows.
    pub fn unpaced() -> Self {
        Self {
            time_scale: 0.0,
            ..Self::default()
        }
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. time_scale must be finite and non-negative.
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::InvalidTimeScale {
                value: self.time_scale,
            });
        }
        // 2. thread name must be accepted by the OS thread builder.
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(ConfigError::InvalidThreadName);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EngineConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// time_scale is NaN, infinite, or negative.
    InvalidTimeScale {
        /// The invalid value.
        value: f64,
    },
    /// Thread name is empty or contains a NUL byte.
    InvalidThreadName,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeScale { value } => {
                write!(f, "time_scale must be finite and non-negative, got {value}")
            }
            Self::InvalidThreadName => {
                write!(f, "thread_name must be non-empty and free of NUL bytes")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::unpaced().validate().is_ok());
    }

    #[test]
    fn rejects_bad_time_scale() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let cfg = EngineConfig {
                time_scale: bad,
                ..EngineConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidTimeScale { .. })
            ));
        }
    }

    #[test]
    fn rejects_bad_thread_name() {
        for bad in ["", "step\0thread"] {
            let cfg = EngineConfig {
                thread_name: bad.into(),
                ..EngineConfig::default()
            };
            assert_eq!(cfg.validate(), Err(ConfigError::InvalidThreadName));
        }
    }
}
