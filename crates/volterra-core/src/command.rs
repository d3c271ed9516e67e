//! Inbound command types: the config bundle and the control commands.
//!
//! Transport payloads arrive loosely typed (a JSON-like mapping). They are
//! validated once, here, into a [`ConfigUpdate`]; nothing past this module
//! sees an unchecked value.

use std::fmt;

use serde_json::Value;

use crate::error::{CommandError, ConfigUpdateError};
use crate::model::{Coefficients, PhasePoint};
use crate::state::SimulationState;

/// One of the eight fields of a config bundle.
///
/// Declaration order is validation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// `a` → alpha.
    Alpha,
    /// `b` → beta.
    Beta,
    /// `d` → delta.
    Delta,
    /// `g` → gamma.
    Gamma,
    /// `x` → prey.
    X,
    /// `y` → predator.
    Y,
    /// `max` → horizon.
    Max,
    /// `step` → integration step.
    Step,
}

impl ConfigField {
    /// All fields, in validation order.
    pub const ALL: [ConfigField; 8] = [
        Self::Alpha,
        Self::Beta,
        Self::Delta,
        Self::Gamma,
        Self::X,
        Self::Y,
        Self::Max,
        Self::Step,
    ];

    /// Wire key used by the inbound payload.
    pub fn key(self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::Delta => "d",
            Self::Gamma => "g",
            Self::X => "x",
            Self::Y => "y",
            Self::Max => "max",
            Self::Step => "step",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A complete, strongly typed config bundle.
///
/// Field names follow the wire keys. Construct directly and call
/// [`validate`](Self::validate), or parse a loose payload with
/// [`from_value`](Self::from_value), which validates as well.
///
/// # Examples
///
/// ```
/// use volterra_core::{ConfigField, ConfigUpdate, ConfigUpdateError};
///
/// let update = ConfigUpdate { step: 0.0, ..ConfigUpdate::default() };
/// assert!(matches!(
///     update.validate(),
///     Err(ConfigUpdateError::NonPositive { field: ConfigField::Step, .. })
/// ));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfigUpdate {
    /// alpha.
    pub a: f64,
    /// beta.
    pub b: f64,
    /// delta.
    pub d: f64,
    /// gamma.
    pub g: f64,
    /// Initial prey.
    pub x: f64,
    /// Initial predator.
    pub y: f64,
    /// Horizon `t_end`.
    pub max: f64,
    /// Step `dt`.
    pub step: f64,
}

impl Default for ConfigUpdate {
    /// The bundle equal to the simulation defaults.
    fn default() -> Self {
        let s = SimulationState::default();
        let c = s.coefficients;
        Self {
            a: c.alpha,
            b: c.beta,
            d: c.delta,
            g: c.gamma,
            x: s.x,
            y: s.y,
            max: s.t_end,
            step: s.dt,
        }
    }
}

impl ConfigUpdate {
    /// Value of one field.
    pub fn get(&self, field: ConfigField) -> f64 {
        match field {
            ConfigField::Alpha => self.a,
            ConfigField::Beta => self.b,
            ConfigField::Delta => self.d,
            ConfigField::Gamma => self.g,
            ConfigField::X => self.x,
            ConfigField::Y => self.y,
            ConfigField::Max => self.max,
            ConfigField::Step => self.step,
        }
    }

    fn set(&mut self, field: ConfigField, value: f64) {
        match field {
            ConfigField::Alpha => self.a = value,
            ConfigField::Beta => self.b = value,
            ConfigField::Delta => self.d = value,
            ConfigField::Gamma => self.g = value,
            ConfigField::X => self.x = value,
            ConfigField::Y => self.y = value,
            ConfigField::Max => self.max = value,
            ConfigField::Step => self.step = value,
        }
    }

    /// Coefficients carried by this bundle.
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            alpha: self.a,
            beta: self.b,
            delta: self.d,
            gamma: self.g,
        }
    }

    /// Initial phase point carried by this bundle.
    pub fn point(&self) -> PhasePoint {
        PhasePoint {
            x: self.x,
            y: self.y,
        }
    }

    /// Check finiteness of every field (in [`ConfigField::ALL`] order),
    /// then `step > 0`, then `max > 0`.
    pub fn validate(&self) -> Result<(), ConfigUpdateError> {
        for field in ConfigField::ALL {
            if !self.get(field).is_finite() {
                return Err(ConfigUpdateError::NonFinite { field });
            }
        }
        self.check_positive()
    }

    fn check_positive(&self) -> Result<(), ConfigUpdateError> {
        if self.step <= 0.0 {
            return Err(ConfigUpdateError::NonPositive {
                field: ConfigField::Step,
                value: self.step,
            });
        }
        if self.max <= 0.0 {
            return Err(ConfigUpdateError::NonPositive {
                field: ConfigField::Max,
                value: self.max,
            });
        }
        Ok(())
    }

    /// Parse and validate a loosely typed payload.
    ///
    /// Per field, in order: present, numeric, finite. Then the positivity
    /// checks. Keys outside the eight are ignored.
    pub fn from_value(payload: &Value) -> Result<Self, ConfigUpdateError> {
        let map = payload
            .as_object()
            .ok_or(ConfigUpdateError::MalformedInput)?;

        let mut update = Self::default();
        for field in ConfigField::ALL {
            let raw = map
                .get(field.key())
                .ok_or(ConfigUpdateError::MissingField { field })?;
            let value = raw
                .as_f64()
                .ok_or(ConfigUpdateError::InvalidType { field })?;
            if !value.is_finite() {
                return Err(ConfigUpdateError::NonFinite { field });
            }
            update.set(field, value);
        }
        update.check_positive()?;
        Ok(update)
    }

    /// Parse and validate a JSON text payload.
    ///
    /// Text that is not JSON at all is reported as
    /// [`ConfigUpdateError::MalformedInput`].
    pub fn from_json(text: &str) -> Result<Self, ConfigUpdateError> {
        let value: Value =
            serde_json::from_str(text).map_err(|_| ConfigUpdateError::MalformedInput)?;
        Self::from_value(&value)
    }
}

/// A typed control command.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCommand {
    /// Begin or resume a run.
    Start,
    /// Suspend integration without ending the run.
    Pause,
    /// End the run.
    Stop,
    /// Restore every field to its default and stop. Emits nothing.
    Reset,
    /// Re-emit the current status.
    GetStatus,
    /// Apply a validated config bundle.
    UpdateConfig(ConfigUpdate),
}

/// A transport event mapped onto the engine's vocabulary.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// A control command for the controller.
    Control(ControlCommand),
    /// An external termination request.
    Shutdown,
}

impl Inbound {
    /// Event carrying the config bundle.
    pub const SEND_EVENT: &'static str = "Send";
    /// Event raised when the host window closes.
    pub const CLOSE_EVENT: &'static str = "window:close";

    /// Map a named transport event and its optional payload to a command.
    ///
    /// # Examples
    ///
    /// ```
    /// use volterra_core::{ControlCommand, Inbound};
    ///
    /// let cmd = Inbound::from_event("Pause", None).unwrap();
    /// assert_eq!(cmd, Inbound::Control(ControlCommand::Pause));
    /// ```
    pub fn from_event(name: &str, payload: Option<&Value>) -> Result<Self, CommandError> {
        let cmd = match name {
            "Start" => ControlCommand::Start,
            "Pause" => ControlCommand::Pause,
            "Stop" => ControlCommand::Stop,
            "Reset" => ControlCommand::Reset,
            "GetStatus" => ControlCommand::GetStatus,
            Self::SEND_EVENT => {
                let payload = payload.ok_or_else(|| CommandError::MissingPayload {
                    event: name.to_string(),
                })?;
                ControlCommand::UpdateConfig(ConfigUpdate::from_value(payload)?)
            }
            Self::CLOSE_EVENT => return Ok(Self::Shutdown),
            other => {
                return Err(CommandError::UnknownEvent {
                    name: other.to_string(),
                })
            }
        };
        Ok(Self::Control(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({"a": 1, "b": 0.1, "d": 0.075, "g": 1.5, "x": 10, "y": 5, "max": 10, "step": 1})
    }

    #[test]
    fn full_payload_parses_to_defaults() {
        let update = ConfigUpdate::from_value(&full_payload()).unwrap();
        assert_eq!(update, ConfigUpdate::default());
    }

    #[test]
    fn each_missing_key_is_named() {
        for field in ConfigField::ALL {
            let mut payload = full_payload();
            payload.as_object_mut().unwrap().remove(field.key());
            assert_eq!(
                ConfigUpdate::from_value(&payload),
                Err(ConfigUpdateError::MissingField { field }),
                "removing {field}"
            );
        }
    }

    #[test]
    fn non_mapping_is_malformed() {
        for payload in [json!([1, 2, 3]), json!(4.0), json!("a"), Value::Null] {
            assert_eq!(
                ConfigUpdate::from_value(&payload),
                Err(ConfigUpdateError::MalformedInput)
            );
        }
        assert_eq!(
            ConfigUpdate::from_json("{not json"),
            Err(ConfigUpdateError::MalformedInput)
        );
    }

    #[test]
    fn non_numeric_is_invalid_type() {
        let mut payload = full_payload();
        payload["g"] = json!("1.5");
        assert_eq!(
            ConfigUpdate::from_value(&payload),
            Err(ConfigUpdateError::InvalidType {
                field: ConfigField::Gamma
            })
        );

        payload["g"] = Value::Null;
        assert_eq!(
            ConfigUpdate::from_value(&payload),
            Err(ConfigUpdateError::InvalidType {
                field: ConfigField::Gamma
            })
        );
    }

    #[test]
    fn nan_is_non_finite() {
        let update = ConfigUpdate {
            x: f64::NAN,
            ..ConfigUpdate::default()
        };
        assert_eq!(
            update.validate(),
            Err(ConfigUpdateError::NonFinite {
                field: ConfigField::X
            })
        );

        let update = ConfigUpdate {
            max: f64::NEG_INFINITY,
            ..ConfigUpdate::default()
        };
        assert_eq!(
            update.validate(),
            Err(ConfigUpdateError::NonFinite {
                field: ConfigField::Max
            })
        );
    }

    #[test]
    fn zero_step_is_non_positive() {
        let mut payload = full_payload();
        payload["step"] = json!(0);
        assert_eq!(
            ConfigUpdate::from_value(&payload),
            Err(ConfigUpdateError::NonPositive {
                field: ConfigField::Step,
                value: 0.0
            })
        );
    }

    #[test]
    fn step_checked_before_max() {
        let mut payload = full_payload();
        payload["step"] = json!(-1);
        payload["max"] = json!(-1);
        assert!(matches!(
            ConfigUpdate::from_value(&payload),
            Err(ConfigUpdateError::NonPositive {
                field: ConfigField::Step,
                ..
            })
        ));

        payload["step"] = json!(0.5);
        assert!(matches!(
            ConfigUpdate::from_value(&payload),
            Err(ConfigUpdateError::NonPositive {
                field: ConfigField::Max,
                ..
            })
        ));
    }

    #[test]
    fn earlier_field_wins() {
        // `b` is wrongly typed and `step` is missing: `b` comes first.
        let payload = json!({"a": 1, "b": true, "d": 0.075, "g": 1.5, "x": 10, "y": 5, "max": 10});
        assert_eq!(
            ConfigUpdate::from_value(&payload),
            Err(ConfigUpdateError::InvalidType {
                field: ConfigField::Beta
            })
        );
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut payload = full_payload();
        payload["comment"] = json!("ignored");
        assert!(ConfigUpdate::from_value(&payload).is_ok());
    }

    #[test]
    fn events_route_to_commands() {
        assert_eq!(
            Inbound::from_event("Start", None),
            Ok(Inbound::Control(ControlCommand::Start))
        );
        assert_eq!(
            Inbound::from_event("GetStatus", None),
            Ok(Inbound::Control(ControlCommand::GetStatus))
        );
        assert_eq!(
            Inbound::from_event("window:close", None),
            Ok(Inbound::Shutdown)
        );
        assert_eq!(
            Inbound::from_event("Send", Some(&full_payload())),
            Ok(Inbound::Control(ControlCommand::UpdateConfig(
                ConfigUpdate::default()
            )))
        );
        assert_eq!(
            Inbound::from_event("Send", None),
            Err(CommandError::MissingPayload {
                event: "Send".into()
            })
        );
        assert!(matches!(
            Inbound::from_event("Jump", None),
            Err(CommandError::UnknownEvent { .. })
        ));
        assert!(matches!(
            Inbound::from_event("Send", Some(&json!([]))),
            Err(CommandError::Config(ConfigUpdateError::MalformedInput))
        ));
    }

    proptest! {
        #[test]
        fn finite_positive_bundles_validate(
            a in -1e6f64..1e6, b in -1e6f64..1e6, d in -1e6f64..1e6, g in -1e6f64..1e6,
            x in -1e6f64..1e6, y in -1e6f64..1e6,
            max in 1e-6f64..1e6, step in 1e-6f64..1e6,
        ) {
            let update = ConfigUpdate { a, b, d, g, x, y, max, step };
            prop_assert!(update.validate().is_ok());
            let payload = serde_json::json!({
                "a": a, "b": b, "d": d, "g": g, "x": x, "y": y, "max": max, "step": step
            });
            prop_assert_eq!(ConfigUpdate::from_value(&payload), Ok(update));
        }
    }
}
