//! Controller and background stepping thread for Volterra simulations.
//!
//! [`Controller`] is the control surface: start, pause, stop, reset,
//! status and live config updates. A run is driven by one background
//! stepping thread that integrates the model, emits an update per step and
//! paces itself in real time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod sink;
mod stepper;

pub use config::{ConfigError, EngineConfig};
pub use controller::{Controller, ShutdownReport};
pub use sink::{ChannelSink, LogSink};
