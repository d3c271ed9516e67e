//! The simulation record and its phase machine.
//!
//! [`SimulationState`] holds the coefficients, the current phase-space
//! position, simulated time, and the run [`Phase`]. Transition methods are
//! pure; they report what the caller has to do (spawn, resume, nothing)
//! through their return values and never perform I/O.

use crate::command::ConfigUpdate;
use crate::model::{rk4_step, Coefficients, PhasePoint};
use crate::notify::Status;

/// Run mode. One enum, so contradictory mode combinations cannot exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No run in progress.
    #[default]
    Stopped,
    /// A run is integrating.
    Running,
    /// A run exists but is not integrating.
    Paused,
}

/// Result of [`SimulationState::start()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Already running; nothing changed.
    AlreadyRunning,
    /// A new run began. The caller must spawn a stepping task tagged with
    /// `generation`.
    Spawn {
        /// Generation the new stepping task belongs to.
        generation: u64,
    },
    /// A paused run was resumed; its stepping task is still alive.
    Resumed,
}

/// Result of one call to [`SimulationState::advance()`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// A step was committed.
    Stepped {
        /// Time after the step.
        t: f64,
        /// Position after the step.
        point: PhasePoint,
    },
    /// The step produced a non-finite value and was discarded.
    Diverged {
        /// Time the step would have reached.
        t: f64,
        /// The rejected position.
        point: PhasePoint,
    },
    /// Paused before the horizon: nothing to do this iteration.
    Idle,
    /// Stopped, or the horizon was reached: the run is over.
    Finished,
}

/// Mutable record of model coefficients, position, time and run mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    phase: Phase,
    /// Elapsed simulated time.
    pub t: f64,
    /// Prey population.
    pub x: f64,
    /// Predator population.
    pub y: f64,
    /// Model coefficients.
    pub coefficients: Coefficients,
    /// Fixed integration step, also the real-time pacing delay in seconds.
    pub dt: f64,
    /// Horizon at which a run ends itself.
    pub t_end: f64,
    generation: u64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            phase: Phase::Stopped,
            t: 0.0,
            x: 10.0,
            y: 5.0,
            coefficients: Coefficients::DEFAULT,
            dt: 1.0,
            t_end: 10.0,
            generation: 0,
        }
    }
}

impl SimulationState {
    /// Current run mode.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generation of the current (or most recent) run.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current position.
    pub fn point(&self) -> PhasePoint {
        PhasePoint {
            x: self.x,
            y: self.y,
        }
    }

    /// Status as reported to observers. `Stop` is checked first.
    pub fn status(&self) -> Status {
        match self.phase {
            Phase::Stopped => Status::Stop,
            Phase::Paused => Status::Pause,
            Phase::Running => Status::Run,
        }
    }

    /// Whether the run is paused before its horizon, so that
    /// [`advance()`](Self::advance) would idle.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Paused && self.t < self.t_end
    }

    /// Begin or resume a run.
    pub fn start(&mut self) -> StartOutcome {
        match self.phase {
            Phase::Running => StartOutcome::AlreadyRunning,
            Phase::Paused => {
                self.phase = Phase::Running;
                StartOutcome::Resumed
            }
            Phase::Stopped => {
                self.t = 0.0;
                self.phase = Phase::Running;
                self.generation += 1;
                StartOutcome::Spawn {
                    generation: self.generation,
                }
            }
        }
    }

    /// Suspend the run. A stopped simulation stays stopped: there is no run
    /// to suspend.
    pub fn pause(&mut self) {
        if self.phase != Phase::Stopped {
            self.phase = Phase::Paused;
        }
    }

    /// End the run.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }

    /// Restore every field to its default and stop.
    ///
    /// The generation is kept: a stepping task from the current run sees
    /// `Stopped` on its next iteration and ends the run as after
    /// [`stop()`](Self::stop).
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation,
            ..Self::default()
        };
    }

    /// Overwrite all eight configurable fields. The caller validates first.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        self.coefficients = update.coefficients();
        self.x = update.x;
        self.y = update.y;
        self.t_end = update.max;
        self.dt = update.step;
    }

    /// One stepping-loop iteration's worth of state change.
    ///
    /// Running before the horizon integrates one step; a non-finite result
    /// is not committed. Paused before the horizon idles. Anything else
    /// (stopped, or the horizon reached in any mode) finishes the run.
    pub fn advance(&mut self) -> Advance {
        match self.phase {
            Phase::Running if self.t < self.t_end => {
                let next = rk4_step(&self.coefficients, self.point(), self.dt);
                let t = self.t + self.dt;
                if !next.is_finite() {
                    return Advance::Diverged { t, point: next };
                }
                self.x = next.x;
                self.y = next.y;
                self.t = t;
                Advance::Stepped { t, point: next }
            }
            Phase::Paused if self.t < self.t_end => Advance::Idle,
            _ => Advance::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults() {
        let s = SimulationState::default();
        assert_eq!(s.phase(), Phase::Stopped);
        assert_eq!(s.status(), Status::Stop);
        assert_eq!((s.t, s.x, s.y), (0.0, 10.0, 5.0));
        assert_eq!(s.coefficients, Coefficients::DEFAULT);
        assert_eq!((s.dt, s.t_end), (1.0, 10.0));
    }

    #[test]
    fn start_from_stopped_spawns_once() {
        let mut s = SimulationState::default();
        s.t = 4.0;
        assert_eq!(s.start(), StartOutcome::Spawn { generation: 1 });
        assert_eq!(s.t, 0.0);
        s.t = 2.0;
        assert_eq!(s.start(), StartOutcome::AlreadyRunning);
        assert_eq!(s.t, 2.0, "second start must not reset time");
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn pause_then_start_resumes() {
        let mut s = SimulationState::default();
        s.start();
        s.advance();
        let before = s.clone();
        s.pause();
        assert_eq!(s.status(), Status::Pause);
        assert_eq!(s.start(), StartOutcome::Resumed);
        assert_eq!(s, before);
    }

    #[test]
    fn pause_while_stopped_stays_stopped() {
        let mut s = SimulationState::default();
        s.pause();
        assert_eq!(s.phase(), Phase::Stopped);
        assert_eq!(s.status(), Status::Stop);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut s = SimulationState::default();
        s.apply(&ConfigUpdate {
            a: 2.0,
            max: 50.0,
            ..ConfigUpdate::default()
        });
        s.start();
        s.advance();
        s.reset();
        assert_eq!(s.generation(), 1);
        let mut expected = SimulationState::default();
        expected.generation = 1;
        assert_eq!(s, expected);
    }

    #[test]
    fn default_bundle_matches_default_state() {
        let mut s = SimulationState::default();
        s.apply(&ConfigUpdate {
            a: 3.0,
            x: 1.0,
            y: 2.0,
            max: 4.0,
            step: 0.5,
            ..ConfigUpdate::default()
        });
        s.apply(&ConfigUpdate::default());
        assert_eq!(s, SimulationState::default());
    }

    #[test]
    fn apply_writes_every_field() {
        let update = ConfigUpdate {
            a: 1.1,
            b: 0.2,
            d: 0.3,
            g: 0.4,
            x: 7.0,
            y: 8.0,
            max: 9.0,
            step: 0.25,
        };
        let mut s = SimulationState::default();
        s.apply(&update);
        assert_eq!(s.coefficients, update.coefficients());
        assert_eq!(s.point(), update.point());
        assert_eq!((s.t_end, s.dt), (9.0, 0.25));
        assert_eq!(s.phase(), Phase::Stopped);
    }

    #[test]
    fn advance_runs_to_horizon() {
        let mut s = SimulationState::default();
        s.apply(&ConfigUpdate {
            max: 3.0,
            ..ConfigUpdate::default()
        });
        s.start();
        let mut times = Vec::new();
        loop {
            match s.advance() {
                Advance::Stepped { t, .. } => times.push(t),
                Advance::Finished => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn paused_idles_until_horizon() {
        let mut s = SimulationState::default();
        s.start();
        s.pause();
        assert!(s.is_idle());
        assert_eq!(s.advance(), Advance::Idle);
        s.t = s.t_end;
        assert!(!s.is_idle());
        assert_eq!(s.advance(), Advance::Finished);
    }

    #[test]
    fn stopped_finishes() {
        let mut s = SimulationState::default();
        assert_eq!(s.advance(), Advance::Finished);
    }

    #[test]
    fn divergent_step_is_not_committed() {
        let mut s = SimulationState::default();
        s.coefficients.alpha = 1e300;
        s.x = 1e300;
        s.dt = 1e10;
        s.start();
        let before = s.clone();
        assert!(matches!(s.advance(), Advance::Diverged { .. }));
        assert_eq!(s, before);
    }

    #[derive(Clone, Copy, Debug)]
    enum Op {
        Start,
        Pause,
        Stop,
        Reset,
        Advance,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Start),
            Just(Op::Pause),
            Just(Op::Stop),
            Just(Op::Reset),
            Just(Op::Advance),
        ]
    }

    proptest! {
        #[test]
        fn status_always_matches_phase(ops in prop::collection::vec(arb_op(), 0..64)) {
            let mut s = SimulationState::default();
            let mut spawns = 0u64;
            for op in ops {
                match op {
                    Op::Start => {
                        if let StartOutcome::Spawn { .. } = s.start() {
                            spawns += 1;
                        }
                    }
                    Op::Pause => s.pause(),
                    Op::Stop => s.stop(),
                    Op::Reset => s.reset(),
                    Op::Advance => {
                        if s.advance() == Advance::Finished {
                            s.stop();
                        }
                    }
                }
                let expected = match s.phase() {
                    Phase::Stopped => Status::Stop,
                    Phase::Paused => Status::Pause,
                    Phase::Running => Status::Run,
                };
                prop_assert_eq!(s.status(), expected);
                prop_assert!(s.t >= 0.0);
                prop_assert!(s.generation() >= spawns);
            }
        }
    }
}
