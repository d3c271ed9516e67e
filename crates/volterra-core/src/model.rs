//! Lotka-Volterra model and its fixed-step RK4 integrator.
//!
//! ```text
//! dx/dt = αx − βxy
//! dy/dt = δxy − γy
//! ```
//!
//! The integrator is pure: it takes one coefficient snapshot and one phase
//! point and returns the next point. Callers decide whether to commit it.

/// The four model coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// Prey growth rate.
    pub alpha: f64,
    /// Predation rate.
    pub beta: f64,
    /// Predator growth per prey consumed.
    pub delta: f64,
    /// Predator death rate.
    pub gamma: f64,
}

impl Coefficients {
    /// Coefficients the simulation starts with.
    pub const DEFAULT: Self = Self {
        alpha: 1.0,
        beta: 0.1,
        delta: 0.075,
        gamma: 1.5,
    };

    /// Time derivative `(dx/dt, dy/dt)` at `p`.
    #[inline]
    pub fn derivative(&self, p: PhasePoint) -> (f64, f64) {
        (
            self.alpha * p.x - self.beta * p.x * p.y,
            self.delta * p.x * p.y - self.gamma * p.y,
        )
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A position in phase space: prey `x`, predator `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhasePoint {
    /// Prey population.
    pub x: f64,
    /// Predator population.
    pub y: f64,
}

impl PhasePoint {
    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Advance `p` by one classic RK4 step of size `dt`.
///
/// Every stage uses the same `coeffs`; a coefficient change can only take
/// effect on the next call. Stage increments are pre-multiplied by `dt`.
/// No clamping or finiteness check is done here.
pub fn rk4_step(coeffs: &Coefficients, p: PhasePoint, dt: f64) -> PhasePoint {
    let slope = |q: PhasePoint| {
        let (fx, fy) = coeffs.derivative(q);
        (dt * fx, dt * fy)
    };

    let (k1x, k1y) = slope(p);
    let (k2x, k2y) = slope(p.offset(k1x / 2.0, k1y / 2.0));
    let (k3x, k3y) = slope(p.offset(k2x / 2.0, k2y / 2.0));
    let (k4x, k4y) = slope(p.offset(k3x, k3y));

    p.offset(
        (k1x + 2.0 * k2x + 2.0 * k3x + k4x) / 6.0,
        (k1y + 2.0 * k2y + 2.0 * k3y + k4y) / 6.0,
    )
}
