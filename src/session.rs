use nalgebra::Vector3;

use crate::reckoner::{DeadReckoner, ReckonerParams};
use crate::traits::ImuSensor;

/// Immutable copy of the estimate at one instant.
///
/// This is the only thing a session hands out, so concurrent readers
/// in a wider system see a consistent position/velocity pair instead
/// of a half-updated state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl Snapshot {
    /// Straight-line distance from the session origin, m.
    #[must_use]
    pub fn distance_from_origin(&self) -> f64 {
        libm::sqrt(self.position.dot(&self.position))
    }

    /// Speed, m/s. Zero unless velocity integration is enabled.
    #[must_use]
    pub fn speed(&self) -> f64 {
        libm::sqrt(self.velocity.dot(&self.velocity))
    }

    /// Heading of the position vector in the XY plane, radians in
    /// (-pi, pi], measured counter-clockwise from +X.
    #[must_use]
    pub fn bearing_xy(&self) -> f64 {
        libm::atan2(self.position.y, self.position.x)
    }
}

/// One sensor, one reckoner, one polling loop.
///
/// Owns all mutable estimator state explicitly instead of leaving it
/// in ambient globals. A session is single-threaded; a system polling
/// several sensors gives each its own session and shares only
/// [`Snapshot`]s between tasks.
#[derive(Debug)]
pub struct Session<S> {
    sensor: S,
    reckoner: DeadReckoner,
    skipped_samples: u32,
}

impl<S: ImuSensor> Session<S> {
    pub fn new(sensor: S, now: f64) -> Self {
        Session::with_params(sensor, ReckonerParams::default(), now)
    }

    pub fn with_params(sensor: S, params: ReckonerParams, now: f64) -> Self {
        Session {
            sensor,
            reckoner: DeadReckoner::new_with_params(now, params),
            skipped_samples: 0,
        }
    }

    /// Reads one acceleration sample and advances the estimate.
    ///
    /// A non-monotonic clock reading drops that sample (with a
    /// warning) rather than ending the session; one bad reading must
    /// not be fatal to a long-running estimator. The returned snapshot
    /// reflects the estimate after the poll either way.
    pub fn poll(&mut self, now: f64) -> Snapshot {
        let accel = self.sensor.read_acceleration();
        if let Err(err) = self.reckoner.step(accel, now) {
            self.skipped_samples += 1;
            log::warn!("dropping sample: {err}");
        }
        self.snapshot()
    }

    /// Clears accumulated drift and restamps the clock.
    pub fn reset(&mut self, now: f64) {
        self.reckoner.reset(now);
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = self.reckoner.state();
        Snapshot {
            timestamp: state.last_timestamp,
            position: state.position,
            velocity: state.velocity,
        }
    }

    /// Samples dropped so far because the clock went backwards.
    #[must_use]
    pub fn skipped_samples(&self) -> u32 {
        self.skipped_samples
    }

    /// Access to the underlying sensor, e.g. to change ranges or read
    /// the gyro alongside the position estimate.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}
