//! Volterra: a realtime Lotka-Volterra predator-prey simulation engine.
//!
//! This is the top-level facade crate that re-exports the public API from the
//! Volterra sub-crates. Adding `volterra` as a single dependency is enough
//! for embedding the engine behind any transport.
//!
//! # Quick start
//!
//! ```rust
//! use volterra::prelude::*;
//!
//! let (sink, events) = ChannelSink::new();
//! let mut controller = Controller::with_config(sink, EngineConfig::unpaced()).unwrap();
//!
//! controller
//!     .update_config(ConfigUpdate { max: 3.0, ..ConfigUpdate::default() })
//!     .unwrap();
//! controller.start();
//!
//! // Run, three updates, Stop.
//! let seen: Vec<Notification> = events.iter().take(5).collect();
//! assert_eq!(seen[0], Notification::status(Status::Run));
//! assert_eq!(seen[4], Notification::status(Status::Stop));
//!
//! controller.shutdown();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `volterra-core` | Model, state record, commands, notifications, errors |
//! | [`engine`] | `volterra-engine` | Controller, stepping thread, sinks, engine config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Model and protocol types (`volterra-core`).
///
/// Contains the RK4 integrator ([`types::rk4_step`]), the
/// [`types::SimulationState`] record, the inbound command vocabulary, and
/// the outbound [`types::Notification`] shapes.
pub use volterra_core as types;

/// Simulation engine (`volterra-engine`).
///
/// [`engine::Controller`] owns the state and its background stepping thread.
pub use volterra_engine as engine;

/// Common imports for typical Volterra usage.
///
/// ```rust
/// use volterra::prelude::*;
/// ```
pub mod prelude {
    // Model
    pub use volterra_core::{Coefficients, PhasePoint};

    // Commands and notifications
    pub use volterra_core::{
        ConfigUpdate, ControlCommand, Inbound, Notification, NotificationSink, Status,
    };

    // Errors
    pub use volterra_core::{CommandError, ConfigUpdateError, StepError};

    // State
    pub use volterra_core::{Phase, SimulationState};

    // Engine
    pub use volterra_engine::{
        ChannelSink, ConfigError, Controller, EngineConfig, LogSink, ShutdownReport,
    };
}
