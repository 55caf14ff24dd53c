//! Engine pipeline driving gesture control end-to-end.
//!
//! [`GestureEngine`] exposes a simple API: feed one frame of landmark data
//! and get manipulation deltas plus selection state, with optional detailed
//! diagnostics. Internally it coordinates the per-hand filter banks, metrics
//! extraction, the bimanual estimator, the lock/grab machine and the target
//! picker.
//!
//! Typical usage:
//! ```no_run
//! use gesture_engine::{FrameInput, GestureEngine, EngineParams};
//! # fn example(frame: FrameInput) {
//! let mut engine = GestureEngine::new(EngineParams::default());
//! let result = engine.process(frame);
//! if result.deltas.grab_started {
//!     // snapshot the manipulated object's world position here
//! }
//! # }
//! ```
use super::params::EngineParams;
use super::workspace::{EngineWorkspace, SmoothedHand};
use crate::bimanual::{BimanualEstimator, BimanualParams, PinchObservation};
use crate::diagnostics::{
    BimanualStage, ControlReport, FrameTrace, HandStage, InputDescriptor, LockStage, PickerStage,
    TimingBreakdown,
};
use crate::hand::{Hand, HandFrame, WRIST};
use crate::lock::{HandObservation, LockMachine, LockParams, LockState};
use crate::metrics::{self, MetricsParams, PoseMetrics};
use crate::picker::{PickerParams, TargetPicker, TargetPoint};
use crate::types::{ControlMode, ControlResult};
use log::debug;
use std::time::Instant;

/// One frame of input from the landmark source.
///
/// `timestamp_ms` must be monotonic; the target slice is borrowed and only
/// read during the call.
pub struct FrameInput<'a> {
    pub timestamp_ms: f64,
    pub left: Option<HandFrame>,
    pub right: Option<HandFrame>,
    pub targets: &'a [TargetPoint],
}

/// Gesture engine orchestrating filtering, metrics extraction, lock/grab
/// control, bimanual manipulation and target picking.
pub struct GestureEngine {
    params: EngineParams,
    workspace: EngineWorkspace,
    lock: LockMachine,
    bimanual: BimanualEstimator,
    picker: TargetPicker,
}

struct TrackedHand {
    smoothed: SmoothedHand,
    metrics: PoseMetrics,
    observation: HandObservation,
    filters_reset: bool,
}

impl GestureEngine {
    /// Create an engine with the supplied parameters.
    pub fn new(params: EngineParams) -> Self {
        Self {
            workspace: EngineWorkspace::new(&params.filters),
            lock: LockMachine::new(params.lock),
            bimanual: BimanualEstimator::new(params.bimanual),
            picker: TargetPicker::new(params.picker),
            params,
        }
    }

    /// Run one frame, returning the compact result.
    pub fn process(&mut self, input: FrameInput) -> ControlResult {
        self.process_with_diagnostics(input).control
    }

    /// Run one frame and return both the result and a detailed trace.
    pub fn process_with_diagnostics(&mut self, input: FrameInput) -> ControlReport {
        let now_ms = input.timestamp_ms;
        debug!(
            "GestureEngine::process start t={:.1} left={} right={} targets={}",
            now_ms,
            input.left.is_some(),
            input.right.is_some(),
            input.targets.len()
        );
        let total_start = Instant::now();

        let descriptor = InputDescriptor {
            timestamp_ms: now_ms,
            left_present: input.left.is_some(),
            right_present: input.right.is_some(),
            targets: input.targets.len(),
        };

        let filter_start = Instant::now();
        let (left_smoothed, left_reset) = self.workspace.left.apply(now_ms, input.left);
        let (right_smoothed, right_reset) = self.workspace.right.apply(now_ms, input.right);
        let filter_ms = filter_start.elapsed().as_secs_f64() * 1000.0;

        let metrics_start = Instant::now();
        let left = self.track_hand(Hand::Left, left_smoothed, left_reset);
        let right = self.track_hand(Hand::Right, right_smoothed, right_reset);
        let metrics_ms = metrics_start.elapsed().as_secs_f64() * 1000.0;

        let bimanual_start = Instant::now();
        let left_pinch = left.as_ref().map(pinch_observation);
        let right_pinch = right.as_ref().map(pinch_observation);
        let bimanual_deltas = self
            .bimanual
            .advance(left_pinch.as_ref(), right_pinch.as_ref());
        let bimanual_ms = bimanual_start.elapsed().as_secs_f64() * 1000.0;

        let lock_start = Instant::now();
        let lock_update = self.lock.advance(
            now_ms,
            left.as_ref().map(|h| &h.observation),
            right.as_ref().map(|h| &h.observation),
        );
        let lock_ms = lock_start.elapsed().as_secs_f64() * 1000.0;

        // Two-hand manipulation owns the frame outright: single-hand deltas
        // are discarded and the picker sees no anchor.
        let bimanual_active = bimanual_deltas.is_some();
        let deltas = bimanual_deltas.unwrap_or(lock_update.deltas);
        let pointer = if bimanual_active {
            None
        } else {
            lock_update.pointer
        };

        let picker_start = Instant::now();
        let activation = self.locked_hand_pinch(&left, &right);
        let picker_update = self
            .picker
            .advance(now_ms, pointer, activation, input.targets);
        let picker_ms = picker_start.elapsed().as_secs_f64() * 1000.0;

        let mode = if bimanual_active {
            ControlMode::Bimanual
        } else {
            match self.lock.state() {
                LockState::Idle => ControlMode::Idle,
                LockState::Candidate { .. } => ControlMode::Acquiring,
                LockState::Locked(l) if l.grabbed() => ControlMode::Grabbed,
                LockState::Locked(_) => ControlMode::Locked,
            }
        };
        let confidence = self.session_confidence(bimanual_active, &left, &right);

        let latency = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "GestureEngine::process done mode={} hover={:?} latency_ms={:.3}",
            mode.as_str(),
            picker_update.hover,
            latency
        );

        let control = ControlResult {
            mode,
            deltas,
            hover: picker_update.hover,
            selection: picker_update.selection,
            left_metrics: left.as_ref().map(|h| h.metrics),
            right_metrics: right.as_ref().map(|h| h.metrics),
            confidence,
            latency_ms: latency,
        };

        let mut timings = TimingBreakdown::with_total(latency);
        timings.push("filter", filter_ms);
        timings.push("metrics", metrics_ms);
        timings.push("bimanual", bimanual_ms);
        timings.push("lock", lock_ms);
        timings.push("picker", picker_ms);

        let mut hands = Vec::new();
        for tracked in [&left, &right].into_iter().flatten() {
            hands.push(HandStage {
                hand: tracked.observation.hand.as_str(),
                metrics: tracked.metrics,
                filters_reset: tracked.filters_reset,
            });
        }

        let trace = FrameTrace {
            input: descriptor,
            timings,
            hands,
            lock: lock_stage(self.lock.state(), now_ms),
            bimanual: BimanualStage {
                active: bimanual_active,
                anchor_distance: self.bimanual.anchor().map(|a| a.pinch_distance),
                anchor_angle: self.bimanual.anchor().map(|a| a.segment_angle),
                follower: self.bimanual.follower(),
            },
            picker: PickerStage {
                hover: picker_update.hover,
                hover_distance: picker_update.hover_distance,
                debounce_remaining_ms: self.picker.debounce_remaining_ms(now_ms),
            },
        };

        ControlReport { control, trace }
    }

    /// Drops all session state: filter histories, lock, anchor, debounce.
    pub fn reset(&mut self) {
        self.workspace.reset();
        self.lock.reset();
        self.bimanual.reset();
        self.picker.reset();
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Replace the filter profiles. Discards all filter histories.
    pub fn set_filter_params(&mut self, params: super::params::FilterBankParams) {
        self.params.filters = params;
        self.workspace = EngineWorkspace::new(&self.params.filters);
    }

    pub fn set_metrics_params(&mut self, params: MetricsParams) {
        self.params.metrics = params;
    }

    pub fn set_lock_params(&mut self, params: LockParams) {
        self.params.lock = params;
        self.lock.set_params(params);
    }

    pub fn set_bimanual_params(&mut self, params: BimanualParams) {
        self.params.bimanual = params;
        self.bimanual.set_params(params);
    }

    pub fn set_picker_params(&mut self, params: PickerParams) {
        self.params.picker = params;
        self.picker.set_params(params);
    }

    fn track_hand(
        &self,
        hand: Hand,
        smoothed: Option<SmoothedHand>,
        filters_reset: bool,
    ) -> Option<TrackedHand> {
        let smoothed = smoothed?;
        let metrics = metrics::extract(&smoothed.frame, &self.params.metrics);
        let observation = HandObservation {
            hand,
            metrics,
            wrist_screen: smoothed.frame.landmarks()[WRIST].screen(),
            pointer: smoothed.pointer,
        };
        Some(TrackedHand {
            smoothed,
            metrics,
            observation,
            filters_reset,
        })
    }

    /// Pinch strength of the hand holding the lock, the picker's activation
    /// signal. Zero during tracking dropout.
    fn locked_hand_pinch(&self, left: &Option<TrackedHand>, right: &Option<TrackedHand>) -> f32 {
        let LockState::Locked(locked) = self.lock.state() else {
            return 0.0;
        };
        let tracked = match locked.hand {
            Hand::Left => left,
            Hand::Right => right,
        };
        tracked.as_ref().map_or(0.0, |h| h.metrics.pinch)
    }

    fn session_confidence(
        &self,
        bimanual_active: bool,
        left: &Option<TrackedHand>,
        right: &Option<TrackedHand>,
    ) -> f32 {
        if bimanual_active {
            let l = left.as_ref().map_or(0.0, |h| h.metrics.confidence);
            let r = right.as_ref().map_or(0.0, |h| h.metrics.confidence);
            return l.min(r);
        }
        match self.lock.state() {
            LockState::Candidate { metrics, .. } => metrics.confidence,
            LockState::Locked(l) => l.metrics.confidence,
            LockState::Idle => {
                let l = left.as_ref().map_or(0.0, |h| h.metrics.confidence);
                let r = right.as_ref().map_or(0.0, |h| h.metrics.confidence);
                l.max(r)
            }
        }
    }
}

fn pinch_observation(tracked: &TrackedHand) -> PinchObservation {
    PinchObservation {
        point: tracked.smoothed.frame.pinch_point(),
        strength: tracked.metrics.pinch,
    }
}

fn lock_stage(state: &LockState, now_ms: f64) -> LockStage {
    match state {
        LockState::Idle => LockStage {
            state: "idle",
            consecutive_frames: 0,
            locked_hand: None,
            grabbed: false,
            ms_since_lock: None,
        },
        LockState::Candidate {
            consecutive_frames, ..
        } => LockStage {
            state: "candidate",
            consecutive_frames: *consecutive_frames,
            locked_hand: None,
            grabbed: false,
            ms_since_lock: None,
        },
        LockState::Locked(locked) => LockStage {
            state: "locked",
            consecutive_frames: 0,
            locked_hand: Some(locked.hand.as_str()),
            grabbed: locked.grabbed(),
            ms_since_lock: Some(now_ms - locked.locked_at_ms),
        },
    }
}
