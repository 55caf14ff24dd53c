//! Per-frame diagnostics emitted alongside the compact control result.
//!
//! Every stage of the pipeline reports a small serializable descriptor, and
//! stage latencies are collected into a [`TimingBreakdown`]. The replay tool
//! serializes whole [`ControlReport`] sequences to JSON for offline tuning.

use crate::bimanual::BimanualFollower;
use crate::metrics::PoseMetrics;
use crate::types::ControlResult;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct StageTiming {
    pub name: &'static str,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &'static str, elapsed_ms: f64) {
        self.stages.push(StageTiming { name, elapsed_ms });
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InputDescriptor {
    pub timestamp_ms: f64,
    pub left_present: bool,
    pub right_present: bool,
    pub targets: usize,
}

/// One tracked hand's post-filter view.
#[derive(Clone, Debug, Serialize)]
pub struct HandStage {
    pub hand: &'static str,
    pub metrics: PoseMetrics,
    /// Whether this frame re-initialised the hand's filter bank after a
    /// tracking gap.
    pub filters_reset: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct LockStage {
    pub state: &'static str,
    pub consecutive_frames: u32,
    pub locked_hand: Option<&'static str>,
    pub grabbed: bool,
    pub ms_since_lock: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BimanualStage {
    pub active: bool,
    pub anchor_distance: Option<f32>,
    pub anchor_angle: Option<f32>,
    pub follower: BimanualFollower,
}

#[derive(Clone, Debug, Serialize)]
pub struct PickerStage {
    pub hover: Option<u64>,
    pub hover_distance: Option<f32>,
    pub debounce_remaining_ms: f64,
}

/// Full structured trace for one frame.
#[derive(Clone, Debug, Serialize)]
pub struct FrameTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub hands: Vec<HandStage>,
    pub lock: LockStage,
    pub bimanual: BimanualStage,
    pub picker: PickerStage,
}

/// Compact result plus its trace.
#[derive(Clone, Debug, Serialize)]
pub struct ControlReport {
    pub control: ControlResult,
    pub trace: FrameTrace,
}
