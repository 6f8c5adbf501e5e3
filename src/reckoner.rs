use nalgebra::Vector3;
use thiserror::Error;

use crate::traits::Sample;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ReckonError {
    /// The supplied clock reading is earlier than the last one. A
    /// negative interval would corrupt the integral, so the step is
    /// rejected and the state left untouched.
    #[error("non-monotonic timestamp: now={now} is earlier than last={last}")]
    InvalidTimestamp { last: f64, now: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ReckonerParams {
    /// Accumulate `v += a * dt` each step. Off by default: with a raw,
    /// un-debiased accelerometer the velocity term compounds bias into
    /// unbounded drift much faster than the position term alone.
    pub integrate_velocity: bool,
}

/// Running dead-reckoning estimate.
///
/// `last_timestamp` never decreases across updates; `position` and
/// `velocity` change only through [`DeadReckoner::step`] and
/// [`DeadReckoner::reset`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReckonerState {
    /// Monotonic clock reading of the last accepted sample, seconds.
    pub last_timestamp: f64,
    /// Estimated velocity, m/s.
    pub velocity: Vector3<f64>,
    /// Estimated position, m.
    pub position: Vector3<f64>,
}

/// Integrates timestamped acceleration samples into a position
/// estimate using constant-acceleration kinematics per interval.
///
/// No clamping or saturation is applied; drift is unbounded by design
/// and the caller manages it with periodic [`reset`](Self::reset).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DeadReckoner {
    params: ReckonerParams,
    state: ReckonerState,
}

impl DeadReckoner {
    /// Fresh estimate at the origin, stamped with the caller's current
    /// monotonic clock reading in seconds.
    #[must_use]
    pub fn new(now: f64) -> Self {
        DeadReckoner::new_with_params(now, ReckonerParams::default())
    }

    #[must_use]
    pub fn new_with_params(now: f64, params: ReckonerParams) -> Self {
        DeadReckoner {
            params,
            state: ReckonerState {
                last_timestamp: now,
                velocity: Vector3::zeros(),
                position: Vector3::zeros(),
            },
        }
    }

    /// Advances the estimate by one acceleration sample.
    ///
    /// `now` must come from the same monotonic clock as the timestamp
    /// given at construction. A reading earlier than the previous one
    /// yields [`ReckonError::InvalidTimestamp`] and leaves the state
    /// unchanged; the caller decides whether to skip the sample or
    /// [`reset`](Self::reset). A `now` equal to the previous reading
    /// is valid and is a no-op (the squared interval vanishes).
    pub fn step(&mut self, accel: Sample, now: f64) -> Result<ReckonerState, ReckonError> {
        let last = self.state.last_timestamp;
        if now < last {
            return Err(ReckonError::InvalidTimestamp { last, now });
        }

        let dt = now - last;
        self.state.position += accel * (0.5 * dt * dt);
        if self.params.integrate_velocity {
            self.state.velocity += accel * dt;
        }
        self.state.last_timestamp = now;
        Ok(self.state)
    }

    /// Zeroes position and velocity and restamps the clock. Clears
    /// whatever drift has accumulated since the last reset.
    pub fn reset(&mut self, now: f64) {
        self.state.velocity = Vector3::zeros();
        self.state.position = Vector3::zeros();
        self.state.last_timestamp = now;
    }

    #[must_use]
    pub fn state(&self) -> ReckonerState {
        self.state
    }

    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        self.state.position
    }

    #[must_use]
    pub fn velocity(&self) -> Vector3<f64> {
        self.state.velocity
    }
}
