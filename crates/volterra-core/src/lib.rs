//! Core types for the Volterra simulation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! simulation record and its phase machine, the Lotka-Volterra model with its
//! fixed-step RK4 integrator, the typed config command, notification types,
//! and the error enums shared by the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod model;
pub mod notify;
pub mod state;

pub use command::{ConfigField, ConfigUpdate, ControlCommand, Inbound};
pub use error::{CommandError, ConfigUpdateError, StepError};
pub use model::{rk4_step, Coefficients, PhasePoint};
pub use notify::{Notification, NotificationSink, Status, StatusEvent, UpdateEvent};
pub use state::{Advance, Phase, SimulationState, StartOutcome};
