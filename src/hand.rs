//! Hand landmark model shared by every pipeline stage.
//!
//! A hand is an ordered set of 21 landmarks in the MediaPipe layout: wrist,
//! four thumb joints, then four joints for each of the index, middle, ring
//! and pinky fingers. Coordinates live in whatever consistent space the
//! landmark source provides (normalized image space for webcams, metric for
//! depth cameras); the engine never converts between spaces.
//!
//! Incomplete input never reaches the downstream stages: [`HandFrame`]
//! construction validates the 21-point requirement and callers treat a
//! failed construction as "hand absent this frame".

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Fingertip indices of the four non-thumb fingers.
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Knuckle indices of the four non-thumb fingers, aligned with [`FINGERTIPS`].
pub const KNUCKLES: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Which hand an observation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A single 3D landmark, with the source's visibility score when available.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Landmark {
    pub pos: Vector3<f32>,
    #[serde(default)]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vector3::new(x, y, z),
            visibility: None,
        }
    }

    /// Projection onto the image plane.
    #[inline]
    pub fn screen(&self) -> Vector2<f32> {
        Vector2::new(self.pos.x, self.pos.y)
    }
}

/// Unit convention of a depth reading, reported by the source rather than
/// guessed from magnitudes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthUnit {
    /// Unitless relative depth (webcam pose models).
    #[default]
    Normalized,
    /// Metres (LiDAR / depth cameras).
    Metric,
}

/// Optional pinch-ray shortcut some sources supply alongside the landmarks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RayHint {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub strength: f32,
    pub valid: bool,
    #[serde(default)]
    pub depth_unit: DepthUnit,
}

/// One hand's worth of landmarks for a single frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
    #[serde(default)]
    pub grab_strength: Option<f32>,
    #[serde(default)]
    pub ray: Option<RayHint>,
}

impl HandFrame {
    /// Builds a frame from exactly [`LANDMARK_COUNT`] points. Returns `None`
    /// for incomplete or non-finite input; the hand is then absent for the
    /// frame and downstream state machines degrade on their own terms.
    pub fn from_points(points: &[Landmark]) -> Option<Self> {
        if points.len() != LANDMARK_COUNT {
            return None;
        }
        if points
            .iter()
            .any(|l| !l.pos.x.is_finite() || !l.pos.y.is_finite() || !l.pos.z.is_finite())
        {
            return None;
        }
        let mut landmarks = [Landmark::new(0.0, 0.0, 0.0); LANDMARK_COUNT];
        landmarks.copy_from_slice(points);
        Some(Self {
            landmarks,
            grab_strength: None,
            ray: None,
        })
    }

    pub fn with_grab_strength(mut self, strength: f32) -> Self {
        self.grab_strength = Some(strength);
        self
    }

    pub fn with_ray(mut self, ray: RayHint) -> Self {
        self.ray = Some(ray);
        self
    }

    #[inline]
    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    #[inline]
    pub fn landmarks_mut(&mut self) -> &mut [Landmark; LANDMARK_COUNT] {
        &mut self.landmarks
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vector3<f32> {
        self.landmarks[index].pos
    }

    /// Pinch point used by the bimanual estimator: a valid source ray is
    /// taken as a shortcut, otherwise the thumb/index tip midpoint.
    pub fn pinch_point(&self) -> Vector2<f32> {
        if let Some(ray) = &self.ray {
            if ray.valid {
                return Vector2::new(ray.origin.x, ray.origin.y);
            }
        }
        let thumb = self.point(THUMB_TIP);
        let index = self.point(INDEX_TIP);
        Vector2::new(0.5 * (thumb.x + index.x), 0.5 * (thumb.y + index.y))
    }
}
