//! Stepping loop, shared state cell, and interruptible pacing.
//!
//! The stepping thread and the controller share one [`Shared`] cell. All
//! state reads and writes happen under its mutex, and notifications are
//! emitted while that mutex is held, which gives observers a single total
//! order of status and update events.
//!
//! The loop's only suspension point is the pacing delay. It is a
//! `park_timeout` loop, so `unpark()` plus the cancellation flag or a
//! generation change wakes it immediately. An unpaced run that is paused
//! has no delay to sleep, so it parks until the controller wakes it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use volterra_core::state::Advance;
use volterra_core::{Notification, NotificationSink, SimulationState, StepError};

/// State shared between the controller and the stepping thread.
pub(crate) struct Shared {
    state: Mutex<SimulationState>,
    sink: Arc<dyn NotificationSink>,
    /// Set once at shutdown. Checked at the top of every iteration.
    cancelled: AtomicBool,
    /// Set after the stepping thread is joined; suppresses all emission.
    closed: AtomicBool,
    /// Lock-free mirror of the state's run generation, for the pacing loop.
    generation: AtomicU64,
    /// Loop iterations across all runs.
    iterations: AtomicU64,
    last_error: Mutex<Option<StepError>>,
}

impl Shared {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            state: Mutex::new(SimulationState::default()),
            sink,
            cancelled: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            iterations: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Lock the simulation state. A panic in a sink while the lock was held
    /// leaves the record itself consistent, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emit one notification unless the controller has been shut down.
    /// Callers hold the state lock.
    pub fn emit(&self, notification: Notification) {
        if !self.closed.load(Ordering::Acquire) {
            self.sink.notify(notification);
        }
    }

    /// Emit the status derived from `state`.
    pub fn emit_status(&self, state: &SimulationState) {
        self.emit(Notification::status(state.status()));
    }

    /// Publish the state's generation to the lock-free mirror.
    pub fn sync_generation(&self, state: &SimulationState) {
        self.generation.store(state.generation(), Ordering::Release);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<StepError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_last_error(&self, error: Option<StepError>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }
}

/// State held by the stepping thread's main loop.
pub(crate) struct StepperThreadState {
    shared: Arc<Shared>,
    generation: u64,
    time_scale: f64,
}

impl StepperThreadState {
    pub fn new(shared: Arc<Shared>, generation: u64, time_scale: f64) -> Self {
        Self {
            shared,
            generation,
            time_scale,
        }
    }

    /// Main stepping loop. Runs until the run ends, the controller is shut
    /// down, or a newer run takes over.
    pub fn run(self) {
        log::debug!("stepping thread for run {} started", self.generation);
        loop {
            // 1. Cancellation: stop without reporting.
            if self.shared.is_cancelled() {
                let mut state = self.shared.lock();
                if state.generation() == self.generation {
                    state.stop();
                }
                log::info!("simulation stopped due to cancellation");
                break;
            }

            // 2. One iteration under the lock.
            self.shared.iterations.fetch_add(1, Ordering::Relaxed);
            let (delay, idle) = {
                let mut state = self.shared.lock();
                if state.generation() != self.generation {
                    log::debug!("run {} superseded", self.generation);
                    break;
                }
                match state.advance() {
                    Advance::Stepped { t, point } => {
                        log::debug!("t: {t}, x: {}, y: {}", point.x, point.y);
                        self.shared.emit(Notification::update(t, point.x, point.y));
                        (state.dt, false)
                    }
                    Advance::Idle => (state.dt, true),
                    Advance::Diverged { t, point } => {
                        let err = StepError::NonFiniteState {
                            t,
                            x: point.x,
                            y: point.y,
                        };
                        log::error!("halting run {}: {err}", self.generation);
                        self.shared.set_last_error(Some(err));
                        state.stop();
                        self.shared.emit_status(&state);
                        break;
                    }
                    Advance::Finished => {
                        state.stop();
                        self.shared.emit_status(&state);
                        log::debug!("run {} finished at t={}", self.generation, state.t);
                        break;
                    }
                }
            };

            // 3. Pace: the only suspension point.
            if idle && !self.is_paced(delay) {
                self.park_while_idle();
            } else {
                self.pace(delay);
            }
        }
        log::debug!(
            "stepping thread for run {} exited ({} iterations total)",
            self.generation,
            self.shared.iterations()
        );
    }

    fn is_paced(&self, sim_seconds: f64) -> bool {
        sim_seconds * self.time_scale > 0.0
    }

    /// Sleep `sim_seconds * time_scale` of wall time, returning early if
    /// the controller is cancelled or a newer run starts.
    fn pace(&self, sim_seconds: f64) {
        if !self.is_paced(sim_seconds) {
            return;
        }
        let wall = sim_seconds * self.time_scale;
        let deadline = Duration::try_from_secs_f64(wall)
            .ok()
            .and_then(|d| Instant::now().checked_add(d));

        while !self.interrupted() {
            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    thread::park_timeout(deadline - now);
                }
                // Delay too long to represent: wait for an interruption.
                None => thread::park(),
            }
        }
    }

    /// Block while the run stays paused before its horizon. The controller
    /// unparks this thread after every state change that can end the idle.
    fn park_while_idle(&self) {
        while !self.interrupted() && self.shared.lock().is_idle() {
            thread::park();
        }
    }

    fn interrupted(&self) -> bool {
        self.shared.is_cancelled()
            || self.shared.generation.load(Ordering::Acquire) != self.generation
    }
}
