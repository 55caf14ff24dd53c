//! Speed-adaptive low-pass filtering (One Euro filter).
//!
//! Raw landmark coordinates jitter at rest and must not lag during fast
//! motion, two demands a fixed-cutoff low-pass filter cannot satisfy at once.
//! The One Euro filter resolves the trade-off by raising its cutoff frequency
//! with the estimated signal speed:
//!
//! - a first exponential low-pass smooths the derivative estimate at a fixed
//!   `d_cutoff`,
//! - the value filter's cutoff is then `min_cutoff + beta * |velocity|`,
//! - the cutoff converts to a smoothing coefficient via
//!   `alpha = 1 / (1 + tau / te)` with `tau = 1/(2π·cutoff)` and
//!   `te = 1/frequency`, applied as `y = alpha·x + (1 - alpha)·y_prev`.
//!
//! The sampling frequency is re-estimated every call from consecutive
//! timestamps. Landmark sources deliver frames at irregular intervals, so a
//! non-positive or implausibly large delta is rejected and the last accepted
//! frequency is reused instead.
//!
//! One filter instance smooths one scalar channel. Vector and landmark-array
//! variants run one scalar filter per coordinate. [`OneEuroFilter::reset`]
//! must be called whenever the tracked entity disappears and reappears,
//! otherwise the velocity estimate mixes pre- and post-gap motion and the
//! filtered value snaps visibly.

use crate::hand::{Landmark, LANDMARK_COUNT};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Sampling frequency assumed until two valid timestamps have been seen.
const NOMINAL_FREQ_HZ: f32 = 60.0;

/// Frame deltas at or above this are treated as tracking stalls.
const MAX_DT_MS: f64 = 1000.0;

/// Tuning of one filter channel class.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilterProfile {
    /// Cutoff frequency at zero speed (Hz). Lower means smoother at rest.
    pub min_cutoff: f32,
    /// Speed coefficient. Higher means less lag during fast motion.
    pub beta: f32,
    /// Cutoff for the derivative low-pass (Hz).
    pub d_cutoff: f32,
}

impl FilterProfile {
    /// Raw landmark coordinates: favour positional stability.
    pub fn landmark() -> Self {
        Self {
            min_cutoff: 0.8,
            beta: 0.005,
            d_cutoff: 1.0,
        }
    }

    /// Derived pointer position driving the target picker.
    pub fn pointer() -> Self {
        Self {
            min_cutoff: 1.2,
            beta: 0.02,
            d_cutoff: 1.0,
        }
    }

    /// Fast-changing gesture-strength scalars (pinch, grab).
    pub fn strength() -> Self {
        Self {
            min_cutoff: 2.5,
            beta: 0.1,
            d_cutoff: 1.0,
        }
    }
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self::landmark()
    }
}

/// Adaptive low-pass filter over a single scalar channel.
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    profile: FilterProfile,
    freq: f32,
    x_prev: f32,
    dx_prev: f32,
    t_prev_ms: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(profile: FilterProfile) -> Self {
        Self {
            profile,
            freq: NOMINAL_FREQ_HZ,
            x_prev: 0.0,
            dx_prev: 0.0,
            t_prev_ms: 0.0,
            initialized: false,
        }
    }

    /// `alpha = 1 / (1 + tau/te)` with `tau = 1/(2π·cutoff)`.
    fn smoothing_factor(cutoff: f32, freq: f32) -> f32 {
        let tau = 1.0 / (2.0 * PI * cutoff.max(f32::EPSILON));
        let te = 1.0 / freq.max(f32::EPSILON);
        1.0 / (1.0 + tau / te)
    }

    /// Filters one sample taken at `timestamp_ms` (monotonic milliseconds).
    /// The first sample after construction or [`reset`](Self::reset) passes
    /// through unchanged.
    pub fn filter(&mut self, timestamp_ms: f64, x: f32) -> f32 {
        if !self.initialized {
            self.x_prev = x;
            self.dx_prev = 0.0;
            self.t_prev_ms = timestamp_ms;
            self.initialized = true;
            return x;
        }

        let dt_ms = timestamp_ms - self.t_prev_ms;
        if dt_ms > 0.0 && dt_ms < MAX_DT_MS {
            self.freq = (1000.0 / dt_ms) as f32;
        }
        self.t_prev_ms = timestamp_ms;

        let a_d = Self::smoothing_factor(self.profile.d_cutoff, self.freq);
        let dx = (x - self.x_prev) * self.freq;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;

        let cutoff = self.profile.min_cutoff + self.profile.beta * dx_hat.abs();
        let a = Self::smoothing_factor(cutoff, self.freq);
        let x_hat = a * x + (1.0 - a) * self.x_prev;

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;
        x_hat
    }

    /// Discards all history. The next sample passes through unfiltered.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.freq = NOMINAL_FREQ_HZ;
        self.x_prev = 0.0;
        self.dx_prev = 0.0;
        self.t_prev_ms = 0.0;
    }
}

/// Pair of scalar filters for a 2D point.
#[derive(Clone, Debug)]
pub struct OneEuroPoint2 {
    x: OneEuroFilter,
    y: OneEuroFilter,
}

impl OneEuroPoint2 {
    pub fn new(profile: FilterProfile) -> Self {
        Self {
            x: OneEuroFilter::new(profile),
            y: OneEuroFilter::new(profile),
        }
    }

    pub fn filter(&mut self, timestamp_ms: f64, p: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(
            self.x.filter(timestamp_ms, p.x),
            self.y.filter(timestamp_ms, p.y),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

/// Triple of scalar filters for a 3D point.
#[derive(Clone, Debug)]
pub struct OneEuroPoint3 {
    x: OneEuroFilter,
    y: OneEuroFilter,
    z: OneEuroFilter,
}

impl OneEuroPoint3 {
    pub fn new(profile: FilterProfile) -> Self {
        Self {
            x: OneEuroFilter::new(profile),
            y: OneEuroFilter::new(profile),
            z: OneEuroFilter::new(profile),
        }
    }

    pub fn filter(&mut self, timestamp_ms: f64, p: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.x.filter(timestamp_ms, p.x),
            self.y.filter(timestamp_ms, p.y),
            self.z.filter(timestamp_ms, p.z),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}

/// One 3D filter per landmark of a hand, smoothing a full 21-point set
/// in place. Visibility scores pass through untouched.
#[derive(Clone, Debug)]
pub struct LandmarkArrayFilter {
    points: Vec<OneEuroPoint3>,
}

impl LandmarkArrayFilter {
    pub fn new(profile: FilterProfile) -> Self {
        Self {
            points: (0..LANDMARK_COUNT)
                .map(|_| OneEuroPoint3::new(profile))
                .collect(),
        }
    }

    pub fn filter(&mut self, timestamp_ms: f64, landmarks: &mut [Landmark; LANDMARK_COUNT]) {
        for (filter, landmark) in self.points.iter_mut().zip(landmarks.iter_mut()) {
            landmark.pos = filter.filter(timestamp_ms, landmark.pos);
        }
    }

    pub fn reset(&mut self) {
        for filter in &mut self.points {
            filter.reset();
        }
    }
}
