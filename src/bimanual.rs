//! Bimanual (two-hand) transform estimation.
//!
//! When both hands hold a pinch, the segment joining the two pinch points
//! becomes a manipulation handle: moving its midpoint pans, changing its
//! length zooms, and rotating it spins the scene about Z.
//!
//! The estimator is anchor-based. The first frame on which both pinches
//! qualify snapshots the segment (distance, orientation, midpoint); every
//! later qualifying frame measures displacement against that snapshot:
//!
//! - zoom is the logarithm of the distance ratio, so pinch-in and pinch-out
//!   feel symmetric,
//! - orientation lives in the canonical half-turn range (see
//!   [`crate::angle`]), so swapping which hand leads never jumps the
//!   rotation by ±π,
//! - the displacement targets are approached through an exponential
//!   follower, and the per-frame output is the follower's increment, which
//!   keeps the transform continuous without making the anchor model
//!   velocity-based.
//!
//! The instant either hand drops its pinch the anchor is discarded.
//! Re-entry starts from a fresh snapshot; no zoom or rotation baseline
//! carries across the gap.

use crate::angle::{half_turn_delta, segment_orientation};
use crate::types::ManipulationDeltas;
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Gains and gates for the bimanual estimator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BimanualParams {
    /// Minimum pinch strength for either hand to qualify.
    pub pinch_floor: f32,
    /// Screen-to-world gain for midpoint pan.
    pub pan_speed: f32,
    /// Gain on the log distance ratio.
    pub zoom_speed: f32,
    /// Gain on the normalized segment-angle difference.
    pub rotate_speed: f32,
    /// Per-frame fraction of the remaining distance to the target.
    pub follow_alpha: f32,
    /// Minimum pinch-point separation used in the distance ratio.
    pub min_distance: f32,
}

impl Default for BimanualParams {
    fn default() -> Self {
        Self {
            pinch_floor: 0.6,
            pan_speed: 1.8,
            zoom_speed: 1.0,
            rotate_speed: 1.0,
            follow_alpha: 0.35,
            min_distance: 1e-3,
        }
    }
}

/// Snapshot taken on the first qualifying frame.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BimanualAnchor {
    pub pinch_distance: f32,
    pub segment_angle: f32,
    pub screen_center: Vector2<f32>,
}

/// Smoothed progress toward the anchor-relative targets.
#[derive(Clone, Copy, Debug, Default)]
struct Follower {
    pan: Vector2<f32>,
    zoom: f32,
    rot: f32,
}

struct ActiveGrip {
    anchor: BimanualAnchor,
    follower: Follower,
}

/// One hand's pinch input for a frame.
#[derive(Clone, Copy, Debug)]
pub struct PinchObservation {
    pub point: Vector2<f32>,
    pub strength: f32,
}

/// Smoothed follower state, exposed for diagnostics.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct BimanualFollower {
    pub pan: [f32; 2],
    pub zoom: f32,
    pub rot: f32,
}

pub struct BimanualEstimator {
    params: BimanualParams,
    grip: Option<ActiveGrip>,
}

impl BimanualEstimator {
    pub fn new(params: BimanualParams) -> Self {
        Self { params, grip: None }
    }

    pub fn set_params(&mut self, params: BimanualParams) {
        self.params = params;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.grip.is_some()
    }

    pub fn anchor(&self) -> Option<&BimanualAnchor> {
        self.grip.as_ref().map(|g| &g.anchor)
    }

    /// Current smoothed progress toward the anchor-relative targets, for
    /// the diagnostics trace.
    pub fn follower(&self) -> BimanualFollower {
        match &self.grip {
            Some(grip) => BimanualFollower {
                pan: [grip.follower.pan.x, grip.follower.pan.y],
                zoom: grip.follower.zoom,
                rot: grip.follower.rot,
            },
            None => BimanualFollower::default(),
        }
    }

    /// Drops the anchor outright (tracking teardown).
    pub fn reset(&mut self) {
        self.grip = None;
    }

    /// Advances one frame. Returns deltas while both pinches qualify,
    /// `None` otherwise (the anchor is discarded on the spot).
    pub fn advance(
        &mut self,
        left: Option<&PinchObservation>,
        right: Option<&PinchObservation>,
    ) -> Option<ManipulationDeltas> {
        let qualified = match (left, right) {
            (Some(l), Some(r))
                if l.strength >= self.params.pinch_floor
                    && r.strength >= self.params.pinch_floor =>
            {
                Some((l.point, r.point))
            }
            _ => None,
        };

        let Some((a, b)) = qualified else {
            if self.grip.take().is_some() {
                debug!("BimanualEstimator anchor discarded (pinch dropped)");
            }
            return None;
        };

        let distance = (b - a).norm().max(self.params.min_distance);
        let angle = segment_orientation(&[a.x, a.y], &[b.x, b.y]);
        let center = Vector2::new(0.5 * (a.x + b.x), 0.5 * (a.y + b.y));

        let grip = match &mut self.grip {
            Some(grip) => grip,
            None => {
                debug!(
                    "BimanualEstimator anchor set distance={:.4} angle={:.3}",
                    distance, angle
                );
                self.grip.insert(ActiveGrip {
                    anchor: BimanualAnchor {
                        pinch_distance: distance,
                        segment_angle: angle,
                        screen_center: center,
                    },
                    follower: Follower::default(),
                })
            }
        };

        let anchor = &grip.anchor;
        let target_pan = (center - anchor.screen_center) * self.params.pan_speed;
        let ratio = distance / anchor.pinch_distance.max(self.params.min_distance);
        let target_zoom = ratio.ln() * self.params.zoom_speed;
        let target_rot =
            half_turn_delta(angle, anchor.segment_angle) * self.params.rotate_speed;

        let alpha = self.params.follow_alpha.clamp(0.0, 1.0);
        let follower = &mut grip.follower;
        let pan_step = (target_pan - follower.pan) * alpha;
        let zoom_step = (target_zoom - follower.zoom) * alpha;
        let rot_step = (target_rot - follower.rot) * alpha;
        follower.pan += pan_step;
        follower.zoom += zoom_step;
        follower.rot += rot_step;

        Some(ManipulationDeltas {
            pan_x: pan_step.x,
            // Screen Y grows downward, world Y up.
            pan_y: -pan_step.y,
            pan_z: 0.0,
            zoom: zoom_step,
            rot_z: rot_step,
            grab_started: false,
        })
    }
}
