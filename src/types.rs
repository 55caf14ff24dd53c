use crate::metrics::PoseMetrics;
use serde::{Deserialize, Serialize};

/// High-level control mode for UI affordances ("acquiring", "locked", …).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    Idle,
    Acquiring,
    Locked,
    Grabbed,
    Bimanual,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Locked => "locked",
            Self::Grabbed => "grabbed",
            Self::Bimanual => "bimanual",
        }
    }
}

/// Per-frame manipulation output, consumed immediately by the scene
/// transform and never persisted.
///
/// In grabbed single-hand mode the pan/zoom fields are cumulative offsets
/// from the grab anchor; `grab_started` marks the frame on which the
/// consumer should snapshot the world-space position those offsets apply
/// to. In bimanual mode the fields are per-frame increments of the smoothed
/// follower and are applied additively each frame. `rot_z` is only ever
/// produced by the bimanual estimator.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ManipulationDeltas {
    pub pan_x: f32,
    pub pan_y: f32,
    pub pan_z: f32,
    pub zoom: f32,
    pub rot_z: f32,
    pub grab_started: bool,
}

/// Fire-once selection event emitted by the target picker.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SelectionEvent {
    pub target_id: u64,
    pub timestamp_ms: f64,
}

/// Compact per-frame engine output.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ControlResult {
    pub mode: ControlMode,
    pub deltas: ManipulationDeltas,
    pub hover: Option<u64>,
    pub selection: Option<SelectionEvent>,
    pub left_metrics: Option<PoseMetrics>,
    pub right_metrics: Option<PoseMetrics>,
    /// Confidence of the hand currently driving the control session.
    pub confidence: f32,
    pub latency_ms: f64,
}
