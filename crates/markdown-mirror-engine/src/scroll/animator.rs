//! Smooth scrolling driven by a one-dimensional physical model.
//!
//! A motion from `x1` to `x2` follows
//!
//! ```text
//! x(t) = x2 + A (cos(ω (t - D)) - 1)
//! v(t) = A ω sin(ω (D - t))
//! ```
//!
//! for `t` in `0..D`. Starting at rest, `ωD = π` and the pane eases in and
//! out over the nominal duration. Starting with a velocity, `ω` and `D` are
//! chosen so that `v(0)` continues the current movement, which keeps a
//! re-targeted scroll free of jerks.

use std::f64::consts::PI;

/// Nominal duration of one smooth scroll, in milliseconds.
pub const DEFAULT_ANIMATION_MS: f64 = 200.0;

/// Below this speed (px/ms) a pane counts as resting.
const REST_VELOCITY: f64 = 0.00001;

/// Below this distance there is nothing to animate.
const MIN_DISTANCE: f64 = 1e-9;

/// A position and velocity at some instant of a motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: f64,
    pub velocity: f64,
}

/// The closed-form motion towards one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    from: f64,
    target: f64,
    amplitude: f64,
    omega: f64,
    duration: f64,
}

impl Motion {
    /// Plans a motion from `position`, currently moving at `velocity`, to
    /// `target`.
    pub fn new(target: f64, position: f64, velocity: f64, nominal_duration: f64) -> Self {
        let distance = target - position;
        if distance.abs() < MIN_DISTANCE || nominal_duration <= 0.0 {
            return Self::arrived(position, target);
        }

        if velocity.abs() < REST_VELOCITY {
            return Self::from_rest(target, position, nominal_duration);
        }

        let alpha = distance / velocity / nominal_duration;
        // Approximates the root of `alpha * k = tan(k / 2)` with
        // `0.5 / alpha = 1 - (k / pi)^2`.
        let k = if !(0.0..=0.5).contains(&alpha) {
            PI * (1.0 - 0.5 / alpha).sqrt()
        } else {
            0.1
        };
        let alpha1 = (1.0 - k.cos()) / k / k.sin();
        let duration = distance / alpha1 / velocity;

        if !duration.is_finite() || duration <= 0.0 {
            return Self::from_rest(target, position, nominal_duration);
        }

        Self {
            from: position,
            target,
            amplitude: distance / (1.0 - k.cos()),
            omega: k / duration,
            duration,
        }
    }

    fn from_rest(target: f64, position: f64, duration: f64) -> Self {
        Self {
            from: position,
            target,
            amplitude: (target - position) / 2.0,
            omega: PI / duration,
            duration,
        }
    }

    fn arrived(position: f64, target: f64) -> Self {
        Self {
            from: position,
            target,
            amplitude: 0.0,
            omega: 0.0,
            duration: 0.0,
        }
    }

    pub fn start(&self) -> f64 {
        self.from
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// How long the motion takes, in milliseconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }

    /// State `elapsed` milliseconds into the motion. Past the end the motion
    /// rests on the target.
    pub fn sample(&self, elapsed: f64) -> Sample {
        if self.is_finished(elapsed) {
            return Sample {
                position: self.target,
                velocity: 0.0,
            };
        }
        let t = elapsed.max(0.0);
        Sample {
            position: self.target
                + self.amplitude * ((self.omega * (t - self.duration)).cos() - 1.0),
            velocity: self.amplitude * self.omega * (self.omega * (self.duration - t)).sin(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Planned, waiting for the first frame to start the clock.
    Scheduled(Motion),
    Running { motion: Motion, started_at: f64 },
}

/// Drives one pane's scroll position towards a target, one frame at a time.
///
/// The animator never touches the pane itself: the caller reads the current
/// position for [`set_target`](Self::set_target) and applies what
/// [`frame`](Self::frame) returns.
#[derive(Debug, Clone)]
pub struct Animator {
    nominal_duration: f64,
    phase: Phase,
    velocity: f64,
    pending: Option<f64>,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_MS)
    }
}

impl Animator {
    pub fn new(nominal_duration: f64) -> Self {
        Self {
            nominal_duration,
            phase: Phase::Idle,
            velocity: 0.0,
            pending: None,
        }
    }

    /// Starts moving towards `target`.
    ///
    /// While a motion is running the new target is remembered and the motion
    /// is re-planned from its live position and velocity on the next frame.
    pub fn set_target(&mut self, target: f64, current_position: f64) {
        match self.phase {
            Phase::Running { .. } => self.pending = Some(target),
            Phase::Idle | Phase::Scheduled(_) => {
                self.phase = Phase::Scheduled(Motion::new(
                    target,
                    current_position,
                    self.velocity,
                    self.nominal_duration,
                ));
            }
        }
    }

    /// Advances to `timestamp` (milliseconds) and returns the position to
    /// apply, or `None` when idle.
    pub fn frame(&mut self, timestamp: f64) -> Option<f64> {
        let (motion, started_at) = match self.phase {
            Phase::Idle => return None,
            Phase::Scheduled(motion) => (motion, timestamp),
            Phase::Running { motion, started_at } => (motion, started_at),
        };

        let elapsed = timestamp - started_at;
        if motion.is_finished(elapsed) {
            match self.pending.take() {
                Some(target) => {
                    self.velocity = 0.0;
                    self.phase = Phase::Running {
                        motion: Motion::new(
                            target,
                            motion.target(),
                            0.0,
                            self.nominal_duration,
                        ),
                        started_at: timestamp,
                    };
                }
                None => self.finish(),
            }
            return Some(motion.target());
        }

        let Sample { position, velocity } = motion.sample(elapsed);
        self.velocity = velocity;
        self.phase = match self.pending.take() {
            Some(target) => Phase::Running {
                motion: Motion::new(target, position, velocity, self.nominal_duration),
                started_at: timestamp,
            },
            None => Phase::Running { motion, started_at },
        };
        Some(position)
    }

    /// Cancels any motion and drops the velocity.
    pub fn stop(&mut self) {
        self.finish();
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// The target currently steered towards, including a pending re-target.
    pub fn target(&self) -> Option<f64> {
        match self.phase {
            Phase::Idle => None,
            Phase::Scheduled(motion) | Phase::Running { motion, .. } => {
                Some(self.pending.unwrap_or(motion.target()))
            }
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.velocity = 0.0;
        self.pending = None;
    }
}
