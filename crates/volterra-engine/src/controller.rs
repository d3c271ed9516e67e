//! User-facing [`Controller`] API and shutdown sequence.
//!
//! The controller is the control surface of the simulation. It owns the
//! shared state cell and at most one background stepping thread.
//!
//! # Architecture
//!
//! ```text
//! Caller Thread                         Stepping Thread
//!     |                                      |
//!     |--start()--> lock, Stopped->Running   |
//!     |             emit status, spawn ----->| loop:
//!     |                                      |   cancelled? -> Stopped, exit
//!     |--update_config()--> lock, apply      |   lock
//!     |                                      |   generation changed? -> exit
//!     |--pause()/stop()--> lock, emit        |   advance(): RK4 step, emit update
//!     |                                      |   unlock
//!     |--shutdown()--> cancel, stop(),       |   park_timeout(dt * time_scale)
//!     |                unpark, join <--------|
//! ```
//!
//! Every notification is emitted with the state lock held, so observers
//! see status and update events in one consistent order.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde_json::Value;
use volterra_core::{
    ConfigUpdate, ConfigUpdateError, ControlCommand, NotificationSink, SimulationState,
    StartOutcome, Status, StepError,
};

use crate::config::{ConfigError, EngineConfig};
use crate::stepper::{Shared, StepperThreadState};

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`Controller::shutdown()`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Whether the stepping thread was joined cleanly (or none existed).
    pub task_joined: bool,
    /// Whether this call performed the shutdown (false on repeat calls).
    pub first_call: bool,
}

// ── Controller ───────────────────────────────────────────────────

/// Control surface for one simulation.
///
/// Start/Pause/Stop/Reset/GetStatus are total: they never fail. Only config
/// updates can be rejected. Control methods take `&self`; a single caller
/// thread is expected, but concurrent use is memory-safe.
///
/// # Example
///
/// ```no_run
/// use volterra_engine::{ChannelSink, Controller};
///
/// let (sink, events) = ChannelSink::new();
/// let mut controller = Controller::new(sink);
/// controller.start();
/// for event in events.iter().take(3) {
///     println!("{}", serde_json::to_string(&event).unwrap());
/// }
/// controller.shutdown();
/// ```
pub struct Controller {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
    config: EngineConfig,
    shut_down: bool,
}

impl Controller {
    /// Create a controller with the default [`EngineConfig`].
    pub fn new(sink: impl NotificationSink + 'static) -> Self {
        Self::build(Arc::new(sink), EngineConfig::default())
    }

    /// Create a controller with an explicit engine configuration.
    pub fn with_config(
        sink: impl NotificationSink + 'static,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(Arc::new(sink), config))
    }

    /// Create a controller around an already shared sink.
    pub fn with_shared_sink(
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(sink, config))
    }

    fn build(sink: Arc<dyn NotificationSink>, config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(sink)),
            task: Mutex::new(None),
            config,
            shut_down: false,
        }
    }

    /// Begin a run, or resume a paused one.
    ///
    /// Running: no-op, nothing emitted. Stopped: time resets to zero and a
    /// new stepping thread is spawned. Paused: the existing thread resumes.
    pub fn start(&self) {
        if self.shared.is_cancelled() {
            log::warn!("start() ignored: controller is shut down");
            return;
        }

        let outcome = {
            let mut state = self.shared.lock();
            let outcome = state.start();
            match outcome {
                StartOutcome::AlreadyRunning => return,
                StartOutcome::Resumed => {
                    log::debug!("resuming run {}", state.generation());
                }
                StartOutcome::Spawn { .. } => {
                    self.shared.sync_generation(&state);
                    self.shared.set_last_error(None);
                }
            }
            self.shared.emit_status(&state);
            outcome
        };

        match outcome {
            StartOutcome::Spawn { generation } => self.spawn_task(generation),
            _ => self.wake_task(),
        }
    }

    /// Unpark the stepping thread, if any. An unpaced paused run is parked
    /// until the state it waits on changes. Never called with the state
    /// lock held: `spawn_task` takes the task lock first.
    fn wake_task(&self) {
        let slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.as_ref() {
            handle.thread().unpark();
        }
    }

    /// Retire the previous stepping thread, then spawn one for `generation`.
    fn spawn_task(&self, generation: u64) {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);

        // The old thread sees the generation change and exits within one
        // iteration; unpark cuts its pacing delay short.
        if let Some(old) = slot.take() {
            old.thread().unpark();
            if old.join().is_err() {
                log::error!("previous stepping thread panicked");
            }
        }

        let shared = Arc::clone(&self.shared);
        let time_scale = self.config.time_scale;
        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || StepperThreadState::new(shared, generation, time_scale).run());

        match spawned {
            Ok(handle) => *slot = Some(handle),
            Err(e) => {
                log::error!("failed to spawn stepping thread: {e}");
                let mut state = self.shared.lock();
                if state.generation() == generation {
                    state.stop();
                    self.shared.emit_status(&state);
                }
            }
        }
    }

    /// Suspend integration. The stepping thread keeps idling.
    pub fn pause(&self) {
        let mut state = self.shared.lock();
        state.pause();
        self.shared.emit_status(&state);
    }

    /// End the run. The stepping thread notices on its next iteration.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            state.stop();
            self.shared.emit_status(&state);
        }
        self.wake_task();
    }

    /// Restore every field to its default and stop. Emits nothing.
    pub fn reset(&self) {
        self.shared.lock().reset();
        self.wake_task();
        log::debug!("simulation reset to defaults");
    }

    /// Emit the current status without changing anything.
    pub fn get_status(&self) {
        let state = self.shared.lock();
        self.shared.emit_status(&state);
    }

    /// Current status, without emitting.
    pub fn status(&self) -> Status {
        self.shared.lock().status()
    }

    /// Copy of the current simulation record.
    pub fn snapshot(&self) -> SimulationState {
        self.shared.lock().clone()
    }

    /// Why the stepping thread last halted a run on its own, if it did.
    /// Cleared when a new run starts.
    pub fn last_error(&self) -> Option<StepError> {
        self.shared.last_error()
    }

    /// Validate and apply a config bundle, in any phase.
    ///
    /// All eight fields are written under one lock acquisition, so the
    /// stepping thread never integrates with a mix of old and new values.
    /// On error nothing changes and nothing is emitted.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<(), ConfigUpdateError> {
        if let Err(e) = update.validate() {
            log::warn!("rejected config update: {e}");
            return Err(e);
        }
        self.apply(&update);
        Ok(())
    }

    /// Validate and apply a loosely typed config payload.
    pub fn update_config_value(&self, payload: &Value) -> Result<(), ConfigUpdateError> {
        match ConfigUpdate::from_value(payload) {
            Ok(update) => {
                self.apply(&update);
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected config update: {e}");
                Err(e)
            }
        }
    }

    /// Validate and apply a JSON text config payload.
    pub fn update_config_json(&self, text: &str) -> Result<(), ConfigUpdateError> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.update_config_value(&value),
            Err(_) => {
                log::warn!("rejected config update: payload is not JSON");
                Err(ConfigUpdateError::MalformedInput)
            }
        }
    }

    fn apply(&self, update: &ConfigUpdate) {
        self.shared.lock().apply(update);
        self.wake_task();
        log::info!(
            "updated config: alpha={}, beta={}, delta={}, gamma={}, x={}, y={}, t_end={}, dt={}",
            update.a,
            update.b,
            update.d,
            update.g,
            update.x,
            update.y,
            update.max,
            update.step
        );
    }

    /// Route a typed command to the matching method.
    pub fn dispatch(&self, command: ControlCommand) -> Result<(), ConfigUpdateError> {
        match command {
            ControlCommand::Start => self.start(),
            ControlCommand::Pause => self.pause(),
            ControlCommand::Stop => self.stop(),
            ControlCommand::Reset => self.reset(),
            ControlCommand::GetStatus => self.get_status(),
            ControlCommand::UpdateConfig(update) => return self.update_config(update),
        }
        Ok(())
    }

    /// Whether a stepping thread is currently alive.
    pub fn has_live_task(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Shut down: cancel, stop, wait for the stepping thread to exit.
    ///
    /// 1. Set the cancellation flag so the thread exits without reporting.
    /// 2. [`stop()`](Self::stop), emitting a final `Stop` status.
    /// 3. Unpark the thread (ends its pacing delay) and join it.
    /// 4. Close the sink: nothing is emitted after this returns.
    ///
    /// Repeat calls return immediately.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.shut_down {
            return ShutdownReport {
                total_ms: 0,
                task_joined: true,
                first_call: false,
            };
        }
        log::info!("shutting down simulation controller");
        let start = Instant::now();

        self.shared.cancel();
        self.stop();

        let handle = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let task_joined = match handle {
            Some(handle) => {
                handle.thread().unpark();
                handle.join().is_ok()
            }
            None => true,
        };

        self.shared.close();
        self.shut_down = true;

        ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            task_joined,
            first_call: true,
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if !self.shut_down {
            self.shutdown();
        }
    }
}
